//! Diary store: cached entries, pagination cursors, and the selected entry.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{EntryCache, LoadingTracker};
use crate::api::ApiClient;
use crate::export::{default_export_file_name, filename_from_content_disposition, save_export};
use crate::models::{DiaryEntry, DiaryId, DiaryPage, DiaryRequest};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct DiaryState {
    cache: EntryCache,
    current: Option<DiaryEntry>,
    total_elements: u64,
    total_pages: u32,
    current_page: u32,
    error: Option<String>,
}

/// Point-in-time copy of the store for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiarySnapshot {
    pub diaries: Vec<DiaryEntry>,
    pub current_diary: Option<DiaryEntry>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub loading: bool,
    pub error: Option<String>,
}

/// How a fetched page merges into the cache.
#[derive(Debug, Clone, Copy)]
enum PageMerge {
    Replace,
    Append,
}

impl PageMerge {
    const fn for_request(page_index: u32, reset: bool) -> Self {
        if reset || page_index == 0 {
            Self::Replace
        } else {
            Self::Append
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiaryStore {
    api: ApiClient,
    state: Arc<Mutex<DiaryState>>,
    loading: LoadingTracker,
    list_generation: Arc<AtomicU64>,
    selection_generation: Arc<AtomicU64>,
    /// Bumped only by [`DiaryStore::reset`]; guards create/update/delete results.
    reset_generation: Arc<AtomicU64>,
}

impl DiaryStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(DiaryState::default())),
            loading: LoadingTracker::default(),
            list_generation: Arc::new(AtomicU64::new(0)),
            selection_generation: Arc::new(AtomicU64::new(0)),
            reset_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Load one page of entries. Page 0 (or `reset`) replaces the cache,
    /// later pages are merged after it.
    pub async fn fetch_diaries(&self, page_index: u32, reset: bool) -> Result<DiaryPage> {
        self.run("Failed to load diaries", async {
            let generation = bump(&self.list_generation);
            let page = self
                .api
                .list_diaries(page_index, self.api.page_size())
                .await?;
            self.apply_page(generation, &page, PageMerge::for_request(page_index, reset));
            Ok(page)
        })
        .await
    }

    pub async fn fetch_diary_by_id(&self, id: DiaryId) -> Result<DiaryEntry> {
        self.run("Failed to load diary", async {
            let generation = bump(&self.selection_generation);
            let entry = self.api.get_diary(id).await?;
            self.apply_selection(generation, &entry);
            Ok(entry)
        })
        .await
    }

    pub async fn create_diary(&self, data: &DiaryRequest) -> Result<DiaryEntry> {
        self.run("Failed to create diary", async {
            let request = data.clone().normalized();
            request.validate()?;
            let epoch = self.reset_generation.load(Ordering::SeqCst);
            let entry = self.api.create_diary(&request).await?;
            self.apply_created(epoch, &entry);
            Ok(entry)
        })
        .await
    }

    pub async fn update_diary(&self, id: DiaryId, data: &DiaryRequest) -> Result<DiaryEntry> {
        self.run("Failed to update diary", async {
            let request = data.clone().normalized();
            request.validate()?;
            let epoch = self.reset_generation.load(Ordering::SeqCst);
            let entry = self.api.update_diary(id, &request).await?;
            self.apply_updated(epoch, id, &entry);
            Ok(entry)
        })
        .await
    }

    pub async fn delete_diary(&self, id: DiaryId) -> Result<()> {
        self.run("Failed to delete diary", async {
            let epoch = self.reset_generation.load(Ordering::SeqCst);
            self.api.delete_diary(id).await?;
            self.apply_deleted(epoch, id);
            Ok(())
        })
        .await
    }

    /// Keyword search with the same page merge rule as [`Self::fetch_diaries`].
    pub async fn search_diaries(&self, keyword: &str, page_index: u32) -> Result<DiaryPage> {
        self.run("Search failed", async {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(Error::InvalidInput(
                    "Search keyword cannot be empty".to_string(),
                ));
            }
            let generation = bump(&self.list_generation);
            let page = self
                .api
                .search_diaries(keyword, page_index, self.api.page_size())
                .await?;
            self.apply_page(generation, &page, PageMerge::for_request(page_index, false));
            Ok(page)
        })
        .await
    }

    /// Download the bulk export into `target_dir` and return the written file.
    ///
    /// Leaves cached entries, selection, and totals untouched.
    pub async fn export_diaries(&self, target_dir: &Path) -> Result<PathBuf> {
        self.run("Export failed", async {
            let payload = self.api.export_diaries().await?;
            let file_name = payload
                .content_disposition
                .as_deref()
                .and_then(filename_from_content_disposition)
                .unwrap_or_else(|| default_export_file_name(chrono::Local::now().date_naive()));
            let path = save_export(target_dir, &file_name, &payload.bytes)?;
            tracing::info!("Exported {} bytes to {}", payload.bytes.len(), path.display());
            Ok(path)
        })
        .await
    }

    pub fn clear_current_diary(&self) {
        bump(&self.selection_generation);
        self.state().current = None;
    }

    /// Restore every field to its initial value. Responses of requests still
    /// in flight, including creates, updates, and deletes, are discarded when
    /// they arrive; their callers still receive them.
    pub fn reset(&self) {
        bump(&self.reset_generation);
        bump(&self.list_generation);
        bump(&self.selection_generation);
        *self.state() = DiaryState::default();
    }

    pub fn diaries(&self) -> Vec<DiaryEntry> {
        self.state().cache.to_vec()
    }

    pub fn current_diary(&self) -> Option<DiaryEntry> {
        self.state().current.clone()
    }

    pub fn total_elements(&self) -> u64 {
        self.state().total_elements
    }

    pub fn total_pages(&self) -> u32 {
        self.state().total_pages
    }

    pub fn current_page(&self) -> u32 {
        self.state().current_page
    }

    /// Whether the server reported pages after the current one.
    pub fn has_more(&self) -> bool {
        let state = self.state();
        state.current_page.saturating_add(1) < state.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn snapshot(&self) -> DiarySnapshot {
        let loading = self.is_loading();
        let state = self.state();
        DiarySnapshot {
            diaries: state.cache.to_vec(),
            current_diary: state.current.clone(),
            total_elements: state.total_elements,
            total_pages: state.total_pages,
            current_page: state.current_page,
            loading,
            error: state.error.clone(),
        }
    }

    async fn run<T, F>(&self, fallback: &str, action: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _loading = self.loading.begin();
        self.state().error = None;

        let result = action.await;
        if let Err(error) = &result {
            tracing::debug!("Diary action failed: {}", error);
            self.state().error = Some(error.user_message(fallback));
        }
        result
    }

    fn apply_page(&self, generation: u64, page: &DiaryPage, merge: PageMerge) {
        if is_superseded(&self.list_generation, generation) {
            tracing::debug!("Discarding superseded page {}", page.page_index);
            return;
        }

        let mut state = self.state();
        match merge {
            PageMerge::Replace => state.cache.replace_all(page.items.clone()),
            PageMerge::Append => state.cache.append(page.items.clone()),
        }
        state.total_elements = page.total_elements;
        state.total_pages = page.total_pages;
        state.current_page = page.page_index;
    }

    fn apply_selection(&self, generation: u64, entry: &DiaryEntry) {
        if is_superseded(&self.selection_generation, generation) {
            tracing::debug!("Discarding superseded diary {}", entry.id);
            return;
        }
        self.state().current = Some(entry.clone());
    }

    fn apply_created(&self, epoch: u64, entry: &DiaryEntry) {
        if is_superseded(&self.reset_generation, epoch) {
            tracing::debug!("Store was reset; not caching created diary {}", entry.id);
            return;
        }
        let mut state = self.state();
        state.cache.prepend(entry.clone());
        state.total_elements += 1;
    }

    fn apply_updated(&self, epoch: u64, id: DiaryId, entry: &DiaryEntry) {
        if is_superseded(&self.reset_generation, epoch) {
            tracing::debug!("Store was reset; not caching updated diary {}", id);
            return;
        }
        let mut state = self.state();
        state.cache.replace(entry.clone());
        if state.current.as_ref().is_some_and(|current| current.id == id) {
            state.current = Some(entry.clone());
        }
    }

    fn apply_deleted(&self, epoch: u64, id: DiaryId) {
        if is_superseded(&self.reset_generation, epoch) {
            tracing::debug!("Store was reset; not applying delete of diary {}", id);
            return;
        }
        let mut state = self.state();
        state.cache.remove(id);
        if state.current.as_ref().is_some_and(|current| current.id == id) {
            state.current = None;
        }
        state.total_elements = state.total_elements.saturating_sub(1);
    }

    fn state(&self) -> MutexGuard<'_, DiaryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bump(generation: &AtomicU64) -> u64 {
    generation.fetch_add(1, Ordering::SeqCst) + 1
}

fn is_superseded(generation: &AtomicU64, observed: u64) -> bool {
    generation.load(Ordering::SeqCst) != observed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionHandle;
    use crate::config::ClientConfig;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn offline_store() -> DiaryStore {
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        DiaryStore::new(ApiClient::new(&config, SessionHandle::in_memory()).unwrap())
    }

    fn entry(id: i64) -> DiaryEntry {
        let at = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        DiaryEntry {
            id: DiaryId::new(id),
            title: None,
            content: format!("entry {id}"),
            mood: None,
            weather: None,
            entry_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn page(ids: &[i64], index: u32) -> DiaryPage {
        DiaryPage {
            items: ids.iter().copied().map(entry).collect(),
            total_elements: 50,
            total_pages: 3,
            page_size: 20,
            page_index: index,
            is_first: index == 0,
            is_last: index == 2,
        }
    }

    #[test]
    fn superseded_page_is_not_applied() {
        let store = offline_store();
        let stale = bump(&store.list_generation);
        let fresh = bump(&store.list_generation);

        store.apply_page(fresh, &page(&[1, 2], 0), PageMerge::Replace);
        store.apply_page(stale, &page(&[9], 0), PageMerge::Replace);

        let ids: Vec<i64> = store.diaries().iter().map(|entry| entry.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn reset_discards_in_flight_selection() {
        let store = offline_store();
        let in_flight = bump(&store.selection_generation);

        store.reset();
        store.apply_selection(in_flight, &entry(5));

        assert_eq!(store.current_diary(), None);
    }

    #[test]
    fn clear_current_diary_discards_in_flight_selection() {
        let store = offline_store();
        let first = bump(&store.selection_generation);
        store.apply_selection(first, &entry(1));

        let in_flight = bump(&store.selection_generation);
        store.clear_current_diary();
        store.apply_selection(in_flight, &entry(2));

        assert_eq!(store.current_diary(), None);
    }

    #[test]
    fn has_more_follows_page_cursor() {
        let store = offline_store();
        let generation = bump(&store.list_generation);
        store.apply_page(generation, &page(&[1], 1), PageMerge::Append);
        assert!(store.has_more());

        let generation = bump(&store.list_generation);
        store.apply_page(generation, &page(&[2], 2), PageMerge::Append);
        assert!(!store.has_more());
        assert_eq!(store.current_page(), 2);
    }

    #[test]
    fn delete_never_underflows_total() {
        let store = offline_store();
        store.apply_deleted(0, DiaryId::new(1));
        assert_eq!(store.total_elements(), 0);
    }

    #[test]
    fn mutations_started_before_reset_are_not_applied() {
        let store = offline_store();
        let generation = bump(&store.list_generation);
        store.apply_page(generation, &page(&[1, 2], 0), PageMerge::Replace);
        let epoch = store.reset_generation.load(Ordering::SeqCst);

        store.reset();
        store.apply_created(epoch, &entry(42));
        store.apply_updated(epoch, DiaryId::new(1), &entry(1));
        store.apply_deleted(epoch, DiaryId::new(2));

        assert_eq!(store.snapshot(), DiarySnapshot::default());
    }

    #[test]
    fn mutations_after_reset_are_applied() {
        let store = offline_store();
        store.reset();
        let epoch = store.reset_generation.load(Ordering::SeqCst);

        store.apply_created(epoch, &entry(42));

        assert_eq!(store.total_elements(), 1);
        assert_eq!(store.diaries()[0].id, DiaryId::new(42));
    }

    #[tokio::test]
    async fn create_rejects_blank_content_before_request() {
        let store = offline_store();

        let error = store.create_diary(&DiaryRequest::new("  ")).await.unwrap_err();

        assert!(matches!(error, Error::InvalidInput(_)));
        let snapshot = store.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.error.as_deref(), Some("Invalid input: Content is required"));
        assert_eq!(snapshot.total_elements, 0);
    }

    #[tokio::test]
    async fn search_rejects_blank_keyword() {
        let store = offline_store();
        let error = store.search_diaries(" ", 0).await.unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(!store.is_loading());
    }
}
