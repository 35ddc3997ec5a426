use crate::app::App;
use crate::cli::PagingArgs;
use crate::commands::common::{paging_plan, print_entries};
use crate::error::CliError;

pub async fn run_list(paging: PagingArgs, app: &App) -> Result<(), CliError> {
    app.enter("/")?;

    let (first_page, fetch_all) = paging_plan(paging);
    let mut page = app.diaries.fetch_diaries(first_page, true).await?;
    while fetch_all {
        let Some(next) = page.next_page_index() else {
            break;
        };
        page = app.diaries.fetch_diaries(next, false).await?;
    }

    print_entries(&app.diaries, &page, paging.json)
}
