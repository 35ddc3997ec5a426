use chrono::NaiveDate;
use clap::CommandFactory;
use journal_core::{ClientConfig, DiaryEntry, DiaryId, DiaryRequest, SessionHandle};
use pretty_assertions::assert_eq;

use crate::app::App;
use crate::cli::{Cli, Commands, CompletionShell, EntryFieldArgs, GlobalArgs, PagingArgs};
use crate::commands::common::{
    apply_entry_fields, default_editor, entry_preview, entry_to_list_item, format_entry_detail,
    format_entry_lines, normalize_content, normalize_search_query, paging_plan, parse_diary_id,
    parse_entry_date,
};
use crate::commands::completions::render_completions;
use crate::commands::config::update_profile;
use crate::commands::list::run_list;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

fn entry(id: i64, title: Option<&str>, content: &str) -> DiaryEntry {
    let at = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    DiaryEntry {
        id: DiaryId::new(id),
        title: title.map(ToString::to_string),
        content: content.to_string(),
        mood: Some("calm".to_string()),
        weather: None,
        entry_date: NaiveDate::from_ymd_opt(2024, 2, 29),
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn normalize_content_keeps_multiline_text() {
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn normalize_search_query_rejects_blank() {
    assert_eq!(normalize_search_query(" rain ").unwrap(), "rain");
    assert!(matches!(
        normalize_search_query("   "),
        Err(CliError::EmptySearchQuery)
    ));
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn parse_diary_id_accepts_numbers_only() {
    assert_eq!(parse_diary_id(" 12 ").unwrap(), DiaryId::new(12));
    assert!(matches!(
        parse_diary_id("abc"),
        Err(CliError::InvalidDiaryId(ref raw)) if raw == "abc"
    ));
}

#[test]
fn parse_entry_date_requires_iso_format() {
    assert_eq!(
        parse_entry_date("2024-02-29").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert!(matches!(
        parse_entry_date("29/02/2024"),
        Err(CliError::InvalidDate(_))
    ));
}

#[test]
fn apply_entry_fields_overrides_only_given_flags() {
    let existing = entry(3, Some("Old title"), "body");
    let fields = EntryFieldArgs {
        title: Some("New title".to_string()),
        date: Some("2024-03-05".to_string()),
        ..EntryFieldArgs::default()
    };

    let request = apply_entry_fields(DiaryRequest::from(&existing), &fields).unwrap();

    assert_eq!(request.title.as_deref(), Some("New title"));
    assert_eq!(request.mood.as_deref(), Some("calm"));
    assert_eq!(request.content, "body");
    assert_eq!(request.entry_date, NaiveDate::from_ymd_opt(2024, 3, 5));
}

#[test]
fn entry_preview_falls_back_to_first_content_line() {
    let untitled = entry(1, None, "  first   line \nsecond line");
    assert_eq!(entry_preview(&untitled, 40), "first line");

    let long = entry(2, Some(&"x".repeat(60)), "body");
    let preview = entry_preview(&long, 20);
    assert_eq!(preview.chars().count(), 20);
    assert!(preview.ends_with("..."));
}

#[test]
fn format_entry_lines_show_id_date_and_labels() {
    let lines = format_entry_lines(&[entry(7, Some("Walk"), "body")]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("     7  2024-02-29  Walk"));
    assert!(lines[0].ends_with("calm"));
}

#[test]
fn format_entry_detail_includes_content() {
    let detail = format_entry_detail(&entry(7, Some("Walk"), "Long walk by the river"));
    assert!(detail.starts_with("#7  2024-02-29\nWalk\ncalm\n"));
    assert!(detail.contains("Long walk by the river"));
}

#[test]
fn list_item_uses_display_date() {
    let item = entry_to_list_item(&entry(4, None, "text"));
    assert_eq!(item.id, 4);
    assert_eq!(item.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
}

#[test]
fn paging_plan_starts_at_zero_for_all() {
    let all = PagingArgs {
        page: 0,
        all: true,
        json: false,
    };
    assert_eq!(paging_plan(all), (0, true));
    let third = PagingArgs {
        page: 2,
        ..PagingArgs::default()
    };
    assert_eq!(paging_plan(third), (2, false));
}

#[test]
fn unauthorized_core_error_reads_as_session_expired() {
    let error = CliError::from(journal_core::Error::Unauthorized("expired".to_string()));
    assert!(matches!(error, CliError::SessionExpired));

    let error = CliError::from(journal_core::Error::Api {
        status: 404,
        message: "Diary not found".to_string(),
    });
    assert_eq!(error.to_string(), "Diary not found");
}

#[test]
fn completions_use_binary_name() {
    let rendered = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(rendered.contains("journal"));
    assert!(rendered.contains("export"));
}

#[test]
fn config_init_requires_api_url() {
    let mut config = CliProfilesConfig::default();
    let error = update_profile(&mut config, &GlobalArgs::default(), false).unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
}

#[test]
fn config_init_activates_profile_unless_asked_not_to() {
    let mut config = CliProfilesConfig::default();
    let work = GlobalArgs {
        profile: Some("work".to_string()),
        api_url: Some("https://work.example.com/api/".to_string()),
        session_file: None,
    };
    let home = GlobalArgs {
        profile: Some("home".to_string()),
        api_url: Some("http://localhost:8080/api".to_string()),
        session_file: None,
    };

    assert_eq!(update_profile(&mut config, &work, true).unwrap(), "work");
    assert_eq!(config.active_profile.as_deref(), Some("work"));

    update_profile(&mut config, &home, true).unwrap();
    assert_eq!(config.active_profile.as_deref(), Some("work"));
    assert_eq!(
        config.profile("work").unwrap().api_base_url.as_deref(),
        Some("https://work.example.com/api")
    );

    update_profile(&mut config, &home, false).unwrap();
    assert_eq!(config.active_profile.as_deref(), Some("home"));
}

#[tokio::test]
async fn list_without_session_asks_for_login() {
    let config = ClientConfig::new("http://127.0.0.1:9/api").unwrap();
    let app = App::with_session("default".to_string(), config, SessionHandle::in_memory()).unwrap();

    let error = run_list(PagingArgs::default(), &app).await.unwrap_err();

    assert!(matches!(error, CliError::NotSignedIn { ref return_to } if return_to == "/"));
    assert!(app.diaries.diaries().is_empty());
}

#[tokio::test]
async fn completions_run_without_opening_the_app() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("journal.bash");
    let global = GlobalArgs {
        api_url: Some("ftp://not-a-diary-service".to_string()),
        ..GlobalArgs::default()
    };

    crate::dispatch(
        Commands::Completions {
            shell: CompletionShell::Bash,
            output: Some(output.clone()),
        },
        &global,
    )
    .await
    .unwrap();

    let rendered = std::fs::read_to_string(output).unwrap();
    assert!(rendered.contains("journal"));
}
