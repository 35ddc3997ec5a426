use crate::app::App;
use crate::commands::common::{format_entry_detail, parse_diary_id};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, app: &App) -> Result<(), CliError> {
    let id = parse_diary_id(id)?;
    app.enter(&format!("/diary/{id}"))?;

    let entry = app.diaries.fetch_diary_by_id(id).await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("{}", format_entry_detail(&entry));
    }
    Ok(())
}
