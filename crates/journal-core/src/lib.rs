//! journal-core - Core library for Journal
//!
//! This crate contains the API client, session handling, client-side stores,
//! and view routing shared by Journal interfaces.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod router;
pub mod stores;
pub mod util;

pub use api::{ApiClient, UnauthorizedHandler};
pub use auth::{AuthSession, AuthUser, SessionHandle, SessionPersistence};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{DiaryEntry, DiaryId, DiaryPage, DiaryRequest};
pub use router::{Navigation, RouteName, Router};
pub use stores::{AuthStore, DiaryStore};
