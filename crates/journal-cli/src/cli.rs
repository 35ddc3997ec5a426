use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Write and browse your diary from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// CLI profile name
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Diary service base URL (overrides JOURNAL_API_URL and the profile)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Keep the session in this JSON file instead of the system keychain
    #[arg(long, global = true, value_name = "PATH")]
    pub session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in, check, or clear the stored session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// List diary entries, newest first
    List {
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Show one diary entry
    Show {
        /// Diary id
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a new diary entry
    #[command(alias = "add")]
    New {
        /// Entry content (read from stdin or $EDITOR when omitted)
        content: Vec<String>,
        #[command(flatten)]
        fields: EntryFieldArgs,
    },
    /// Edit an existing diary entry in $EDITOR
    Edit {
        /// Diary id
        id: String,
        #[command(flatten)]
        fields: EntryFieldArgs,
    },
    /// Delete a diary entry
    Delete {
        /// Diary id
        id: String,
    },
    /// Search entries by keyword
    Search {
        /// Search keyword
        keyword: String,
        #[command(flatten)]
        paging: PagingArgs,
    },
    /// Download all entries as a JSON file
    Export {
        /// Target directory (defaults to the download directory)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PagingArgs {
    /// Zero-based page to show
    #[arg(long, default_value = "0")]
    pub page: u32,
    /// Keep fetching until the last page
    #[arg(long, conflicts_with = "page")]
    pub all: bool,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EntryFieldArgs {
    /// Entry title
    #[arg(long)]
    pub title: Option<String>,
    /// Mood label
    #[arg(long)]
    pub mood: Option<String>,
    /// Weather label
    #[arg(long)]
    pub weather: Option<String>,
    /// Diary date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub date: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Store `--api-url` in the profile selected by `--profile`
    Init {
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
    /// Print the resolved configuration
    Show,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in and store the session
    Login {
        /// Account username
        #[arg(long, value_name = "NAME")]
        username: String,
        /// Account password (read from stdin when omitted)
        #[arg(long, value_name = "PASSWORD")]
        password: Option<String>,
    },
    /// Show who is signed in
    Status,
    /// Clear the stored session
    Logout,
}
