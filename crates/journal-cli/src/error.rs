use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(journal_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No diary content provided")]
    EmptyContent,
    #[error("Edited diary content cannot be empty")]
    EmptyEditedContent,
    #[error("Search keyword cannot be empty")]
    EmptySearchQuery,
    #[error("Invalid diary id: {0}")]
    InvalidDiaryId(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No view for path {0}")]
    RouteNotFound(String),
    #[error("Not signed in. Run `journal auth login` to continue to {return_to}")]
    NotSignedIn { return_to: String },
    #[error("Session expired. Run `journal auth login` to sign in again.")]
    SessionExpired,
}

impl From<journal_core::Error> for CliError {
    fn from(error: journal_core::Error) -> Self {
        if error.is_unauthorized() {
            Self::SessionExpired
        } else {
            Self::Core(error)
        }
    }
}
