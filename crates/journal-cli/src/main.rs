//! Journal CLI - write and browse a personal diary from the terminal
//!
//! Every command talks to the diary service through `journal-core` stores.

mod app;
mod cli;
mod commands;
mod config_profiles;
mod error;
mod session_store;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::{Cli, Commands, GlobalArgs};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::search::run_search;
use crate::commands::show::run_show;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "journal_core=warn,journal_cli=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    dispatch(cli.command, &cli.global).await
}

/// Config and completions run without a session; every other command opens
/// the app for the resolved profile first.
async fn dispatch(command: Commands, global: &GlobalArgs) -> Result<(), CliError> {
    match command {
        Commands::Config { command } => run_config(command, global),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Auth { command } => run_auth(command, &App::open(global)?).await,
        Commands::List { paging } => run_list(paging, &App::open(global)?).await,
        Commands::Show { id, json } => run_show(&id, json, &App::open(global)?).await,
        Commands::New { content, fields } => run_new(&content, &fields, &App::open(global)?).await,
        Commands::Edit { id, fields } => run_edit(&id, &fields, &App::open(global)?).await,
        Commands::Delete { id } => run_delete(&id, &App::open(global)?).await,
        Commands::Search { keyword, paging } => {
            run_search(&keyword, paging, &App::open(global)?).await
        }
        Commands::Export { dir } => run_export(dir.as_deref(), &App::open(global)?).await,
    }
}
