//! Data models for Journal

mod diary;
mod page;

pub use diary::{
    DiaryEntry, DiaryId, DiaryRequest, MAX_MOOD_CHARS, MAX_TITLE_CHARS, MAX_WEATHER_CHARS,
};
pub use page::DiaryPage;
