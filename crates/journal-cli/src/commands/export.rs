use std::path::Path;

use crate::app::App;
use crate::commands::common::default_export_dir;
use crate::error::CliError;

pub async fn run_export(dir: Option<&Path>, app: &App) -> Result<(), CliError> {
    app.enter("/")?;

    let target_dir = dir.map_or_else(default_export_dir, Path::to_path_buf);
    let path = app.diaries.export_diaries(&target_dir).await?;
    println!("{}", path.display());
    Ok(())
}
