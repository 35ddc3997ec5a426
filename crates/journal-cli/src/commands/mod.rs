pub mod auth_cmd;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod new;
pub mod search;
pub mod show;
