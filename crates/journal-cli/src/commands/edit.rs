use journal_core::DiaryRequest;

use crate::app::App;
use crate::cli::EntryFieldArgs;
use crate::commands::common::{
    apply_entry_fields, capture_editor_input_with_initial, parse_diary_id,
};
use crate::error::CliError;

pub async fn run_edit(id: &str, fields: &EntryFieldArgs, app: &App) -> Result<(), CliError> {
    let id = parse_diary_id(id)?;
    app.enter(&format!("/diary/{id}/edit"))?;

    let entry = app.diaries.fetch_diary_by_id(id).await?;
    let request = apply_entry_fields(DiaryRequest::from(&entry), fields)?;

    let Some(edited_content) = capture_editor_input_with_initial(&entry.content)? else {
        return Err(CliError::EmptyEditedContent);
    };

    let request = DiaryRequest {
        content: edited_content,
        ..request
    };
    if request == DiaryRequest::from(&entry) {
        println!("{}", entry.id);
        return Ok(());
    }

    let updated = app.diaries.update_diary(id, &request).await?;
    println!("{}", updated.id);
    Ok(())
}
