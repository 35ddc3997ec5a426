use crate::app::App;
use crate::cli::PagingArgs;
use crate::commands::common::{normalize_search_query, paging_plan, print_entries};
use crate::error::CliError;

pub async fn run_search(keyword: &str, paging: PagingArgs, app: &App) -> Result<(), CliError> {
    let keyword = normalize_search_query(keyword)?;
    app.enter("/")?;

    let (first_page, fetch_all) = paging_plan(paging);
    let mut page = app.diaries.search_diaries(&keyword, first_page).await?;
    while fetch_all {
        let Some(next) = page.next_page_index() else {
            break;
        };
        page = app.diaries.search_diaries(&keyword, next).await?;
    }

    print_entries(&app.diaries, &page, paging.json)
}
