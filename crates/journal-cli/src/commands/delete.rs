use crate::app::App;
use crate::commands::common::parse_diary_id;
use crate::error::CliError;

pub async fn run_delete(id: &str, app: &App) -> Result<(), CliError> {
    let id = parse_diary_id(id)?;
    app.enter(&format!("/diary/{id}"))?;

    app.diaries.delete_diary(id).await?;
    app.router.navigate("/");
    println!("Deleted diary {id}");
    Ok(())
}
