//! Diary entry model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::util::normalize_text_option;
use crate::{Error, Result};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_MOOD_CHARS: usize = 50;
pub const MAX_WEATHER_CHARS: usize = 50;

/// Server-assigned identifier of a diary entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiaryId(i64);

impl DiaryId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for DiaryId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DiaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DiaryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A diary entry as returned by the server.
///
/// The client only ever holds a cached copy; the server owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: DiaryId,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default, rename = "diaryDate", alias = "entryDate")]
    pub entry_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DiaryEntry {
    /// Title if present, otherwise the first content line, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let source = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| self.content.lines().next().unwrap_or("").trim());
        source.chars().take(max_len).collect()
    }

    /// Date shown to users: the diary date, or the creation day.
    #[must_use]
    pub fn display_date(&self) -> NaiveDate {
        self.entry_date.unwrap_or_else(|| self.created_at.date())
    }
}

/// Payload for creating or fully replacing a diary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(
        default,
        rename = "diaryDate",
        alias = "entryDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_date: Option<NaiveDate>,
}

impl DiaryRequest {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    #[must_use]
    pub fn with_weather(mut self, weather: impl Into<String>) -> Self {
        self.weather = Some(weather.into());
        self
    }

    #[must_use]
    pub const fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    /// Trim text fields and drop empty optional ones.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            title: normalize_text_option(self.title),
            content: self.content.trim().to_string(),
            mood: normalize_text_option(self.mood),
            weather: normalize_text_option(self.weather),
            entry_date: self.entry_date,
        }
    }

    /// Check the constraints the server enforces on diary payloads.
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::InvalidInput("Content is required".to_string()));
        }
        check_length(self.title.as_deref(), MAX_TITLE_CHARS, "Title")?;
        check_length(self.mood.as_deref(), MAX_MOOD_CHARS, "Mood")?;
        check_length(self.weather.as_deref(), MAX_WEATHER_CHARS, "Weather")?;
        Ok(())
    }
}

impl From<&DiaryEntry> for DiaryRequest {
    fn from(entry: &DiaryEntry) -> Self {
        Self {
            title: entry.title.clone(),
            content: entry.content.clone(),
            mood: entry.mood.clone(),
            weather: entry.weather.clone(),
            entry_date: entry.entry_date,
        }
    }
}

fn check_length(value: Option<&str>, max_chars: usize, field: &str) -> Result<()> {
    match value {
        Some(value) if value.chars().count() > max_chars => Err(Error::InvalidInput(format!(
            "{field} must not exceed {max_chars} characters"
        ))),
        _ => Ok(()),
    }
}
