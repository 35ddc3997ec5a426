use journal_core::DiaryRequest;

use crate::app::App;
use crate::cli::EntryFieldArgs;
use crate::commands::common::{apply_entry_fields, resolve_entry_content};
use crate::error::CliError;

pub async fn run_new(
    content_parts: &[String],
    fields: &EntryFieldArgs,
    app: &App,
) -> Result<(), CliError> {
    app.enter("/diary/new")?;
    let request = apply_entry_fields(DiaryRequest::default(), fields)?;

    let content = resolve_entry_content(content_parts)?;
    let request = DiaryRequest { content, ..request };
    let entry = app.diaries.create_diary(&request).await?;

    println!("{}", entry.id);
    Ok(())
}
