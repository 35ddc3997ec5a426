use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use journal_core::{DiaryEntry, DiaryId, DiaryPage, DiaryRequest, DiaryStore};
use serde::Serialize;

use crate::cli::{EntryFieldArgs, PagingArgs};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct DiaryListItem {
    pub id: i64,
    pub date: NaiveDate,
    pub preview: String,
    pub mood: Option<String>,
    pub weather: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DiaryListOutput {
    pub items: Vec<DiaryListItem>,
    pub page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
}

pub fn entry_to_list_item(entry: &DiaryEntry) -> DiaryListItem {
    DiaryListItem {
        id: entry.id.get(),
        date: entry.display_date(),
        preview: entry_preview(entry, 80),
        mood: entry.mood.clone(),
        weather: entry.weather.clone(),
    }
}

pub fn entry_preview(entry: &DiaryEntry, max_chars: usize) -> String {
    let collapsed = entry
        .title_preview(usize::MAX)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_entry_lines(entries: &[DiaryEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let id = entry.id.to_string();
            let preview = entry_preview(entry, 40);
            let labels = render_labels(entry);

            if labels.is_empty() {
                format!("{id:>6}  {}  {preview}", entry.display_date())
            } else {
                format!("{id:>6}  {}  {preview:<40}  {labels}", entry.display_date())
            }
        })
        .collect()
}

fn render_labels(entry: &DiaryEntry) -> String {
    [entry.mood.as_deref(), entry.weather.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .collect::<Vec<_>>()
        .join(" · ")
}

pub fn format_entry_detail(entry: &DiaryEntry) -> String {
    let mut lines = vec![format!("#{}  {}", entry.id, entry.display_date())];
    if let Some(title) = entry.title.as_deref().filter(|title| !title.trim().is_empty()) {
        lines.push(title.trim().to_string());
    }
    let labels = render_labels(entry);
    if !labels.is_empty() {
        lines.push(labels);
    }
    lines.push(String::new());
    lines.push(entry.content.clone());
    lines.push(String::new());
    lines.push(format!(
        "created {}  updated {}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.updated_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

pub fn format_page_footer(page: &DiaryPage) -> String {
    format!(
        "page {} of {} ({} entries)",
        page.page_index + 1,
        page.total_pages.max(1),
        page.total_elements
    )
}

/// Print the store's cached entries, or a JSON envelope.
pub fn print_entries(
    diaries: &DiaryStore,
    last_page: &DiaryPage,
    as_json: bool,
) -> Result<(), CliError> {
    let entries = diaries.diaries();
    if as_json {
        let output = DiaryListOutput {
            items: entries.iter().map(entry_to_list_item).collect(),
            page: diaries.current_page(),
            total_pages: diaries.total_pages(),
            total_elements: diaries.total_elements(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No diary entries.");
        return Ok(());
    }
    for line in format_entry_lines(&entries) {
        println!("{line}");
    }
    println!("{}", format_page_footer(last_page));
    Ok(())
}

/// The first page to request and whether to keep going.
pub const fn paging_plan(paging: PagingArgs) -> (u32, bool) {
    if paging.all {
        (0, true)
    } else {
        (paging.page, false)
    }
}

pub fn parse_diary_id(raw: &str) -> Result<DiaryId, CliError> {
    raw.parse::<DiaryId>()
        .map_err(|_| CliError::InvalidDiaryId(raw.trim().to_string()))
}

pub fn parse_entry_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidDate(raw.trim().to_string()))
}

/// Overlay optional field flags on `request`.
pub fn apply_entry_fields(
    mut request: DiaryRequest,
    fields: &EntryFieldArgs,
) -> Result<DiaryRequest, CliError> {
    if let Some(title) = &fields.title {
        request.title = Some(title.clone());
    }
    if let Some(mood) = &fields.mood {
        request.mood = Some(mood.clone());
    }
    if let Some(weather) = &fields.weather {
        request.weather = Some(weather.clone());
    }
    if let Some(date) = &fields.date {
        request.entry_date = Some(parse_entry_date(date)?);
    }
    Ok(request)
}

pub fn resolve_entry_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_entry_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let entry_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&entry_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_entry_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("journal-entry-{}-{now}.md", std::process::id()))
}

/// Download directory, falling back to the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}
