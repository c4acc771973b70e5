//! Browsing view: paging, filtering, debounced search and quick status toggles.

use std::sync::Arc;
use std::time::Duration;

use stagehand_common::dto::UpdateUrlRequest;
use stagehand_common::models::{Category, Url, UrlStatus};
use stagehand_common::{DEFAULT_PAGE_SIZE, SEARCH_DEBOUNCE_MS, UNCATEGORIZED_CATEGORY_ID};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::store::StateStore;
use crate::api::{SortOrder, UrlQuery};
use crate::repository::{CategoryRepository, UrlRepository};

/// The one list filter that can be active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFilter {
    #[default]
    None,
    Category(i32),
    Status(UrlStatus),
    Uncategorized,
}

impl ListFilter {
    /// `category_id` as the API expects it: uncategorized travels as id `0`.
    pub fn category_id_param(&self) -> Option<i32> {
        match self {
            ListFilter::Category(id) => Some(*id),
            ListFilter::Uncategorized => Some(UNCATEGORIZED_CATEGORY_ID),
            ListFilter::None | ListFilter::Status(_) => None,
        }
    }

    pub fn status_param(&self) -> Option<UrlStatus> {
        match self {
            ListFilter::Status(status) => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub offset: u32,
    pub page_size: u32,
    pub has_more: bool,
    pub total_count: u32,
}

impl Paging {
    fn new(page_size: u32) -> Self {
        Self {
            offset: 0,
            page_size,
            has_more: true,
            total_count: 0,
        }
    }

    fn advance(&mut self, received: usize, total: u32) {
        self.offset += received as u32;
        self.total_count = total;
        self.has_more = received > 0 && self.offset < total;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingFlags {
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_loading_more: bool,
}

impl LoadingFlags {
    /// A load that will replace `items` is in flight.
    pub fn is_replacing(&self) -> bool {
        self.is_loading || self.is_refreshing
    }

    pub fn any(&self) -> bool {
        self.is_replacing() || self.is_loading_more
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub items: Vec<Url>,
    /// Chips for the category filter; empty when they could not be loaded.
    pub categories: Vec<Category>,
    pub filter: ListFilter,
    /// Committed query, the one sent with fetches.
    pub search_query: String,
    /// Latest text typed into the search box.
    pub search_input: String,
    pub paging: Paging,
    pub loading: LoadingFlags,
    pub error: Option<String>,
    generation: u64,
    /// Bumped by every keystroke and by clearing; a debounced commit only lands
    /// if it still holds the latest value.
    search_token: u64,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            categories: Vec::new(),
            filter: ListFilter::None,
            search_query: String::new(),
            search_input: String::new(),
            paging: Paging::new(page_size),
            loading: LoadingFlags::default(),
            error: None,
            generation: 0,
            search_token: 0,
        }
    }

    pub fn selected_category_id(&self) -> Option<i32> {
        match self.filter {
            ListFilter::Category(id) => Some(id),
            _ => None,
        }
    }

    pub fn selected_status(&self) -> Option<UrlStatus> {
        self.filter.status_param()
    }

    pub fn show_uncategorized(&self) -> bool {
        self.filter == ListFilter::Uncategorized
    }

    pub fn has_active_filters(&self) -> bool {
        self.filter != ListFilter::None || !self.search_query.trim().is_empty()
    }

    fn can_load_more(&self) -> bool {
        self.paging.has_more && !self.loading.is_loading_more && !self.loading.is_replacing()
    }
}

#[derive(Debug, Clone)]
pub struct ListConfig {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub sort: SortOrder,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            sort: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    /// Initial or explicit full load.
    Load,
    /// Pull-to-refresh.
    Refresh,
    LoadMore,
    Search(String),
    FilterByCategory(Option<i32>),
    FilterByStatus(Option<UrlStatus>),
    ToggleUncategorized,
    ClearFilters,
    ToggleItemStatus {
        id: i32,
        current_status: Option<UrlStatus>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReloadKind {
    Load,
    Refresh,
}

struct Inner {
    urls: UrlRepository,
    categories: CategoryRepository,
    store: StateStore<ListState>,
    search_debouncer: Debouncer,
    config: ListConfig,
}

#[derive(Clone)]
pub struct ListController {
    inner: Arc<Inner>,
}

impl ListController {
    pub fn new(urls: UrlRepository, categories: CategoryRepository, config: ListConfig) -> Self {
        let page_size = config.page_size.max(1);
        Self {
            inner: Arc::new(Inner {
                urls,
                categories,
                store: StateStore::new(ListState::new(page_size)),
                search_debouncer: Debouncer::new(config.search_debounce),
                config: ListConfig { page_size, ..config },
            }),
        }
    }

    pub fn state(&self) -> ListState {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.store.subscribe()
    }

    /// Loads filter categories and the first page side by side.
    pub fn start(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::join!(this.load_categories(), this.reload(ReloadKind::Load));
        })
    }

    pub fn dispatch(&self, intent: ListIntent) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle(intent).await })
    }

    /// Runs an intent until its network work, if any, has been folded into the state.
    /// `Search` returns right away; its fetch happens once the debounce window settles.
    pub async fn handle(&self, intent: ListIntent) {
        debug!(intent = ?intent, "Handling list intent.");
        match intent {
            ListIntent::Load => self.reload(ReloadKind::Load).await,
            ListIntent::Refresh => self.reload(ReloadKind::Refresh).await,
            ListIntent::LoadMore => self.load_more().await,
            ListIntent::Search(text) => self.search(text),
            ListIntent::FilterByCategory(category_id) => {
                let filter = category_id.map_or(ListFilter::None, ListFilter::Category);
                self.reload_with(ReloadKind::Load, move |s| {
                    s.filter = filter;
                    true
                })
                .await
            }
            ListIntent::FilterByStatus(status) => {
                let filter = status.map_or(ListFilter::None, ListFilter::Status);
                self.reload_with(ReloadKind::Load, move |s| {
                    s.filter = filter;
                    true
                })
                .await
            }
            ListIntent::ToggleUncategorized => {
                self.reload_with(ReloadKind::Load, |s| {
                    s.filter = if s.filter == ListFilter::Uncategorized {
                        ListFilter::None
                    } else {
                        ListFilter::Uncategorized
                    };
                    true
                })
                .await
            }
            ListIntent::ClearFilters => {
                self.inner.search_debouncer.cancel();
                self.reload_with(ReloadKind::Load, |s| {
                    s.filter = ListFilter::None;
                    s.search_query.clear();
                    s.search_input.clear();
                    s.search_token += 1;
                    true
                })
                .await
            }
            ListIntent::ToggleItemStatus { id, current_status } => {
                self.toggle_item_status(id, current_status).await
            }
        }
    }

    async fn load_categories(&self) {
        match self.inner.categories.get_categories().await {
            Ok(categories) => {
                debug!(count = categories.len(), "Loaded filter categories.");
                self.inner.store.update(|s| s.categories = categories);
            }
            Err(e) => {
                // Chips are optional; browsing carries on without them.
                warn!(error = %e, "Failed to load categories for filters.");
            }
        }
    }

    fn query_for(&self, state: &ListState, offset: u32) -> UrlQuery {
        UrlQuery {
            limit: self.inner.config.page_size,
            offset,
            category_id: state.filter.category_id_param(),
            status: state.filter.status_param(),
            search: Some(state.search_query.trim().to_string()).filter(|s| !s.is_empty()),
            sort: self.inner.config.sort,
            ..UrlQuery::default()
        }
    }

    async fn reload(&self, kind: ReloadKind) {
        self.reload_with(kind, |_| true).await
    }

    /// Applies `prepare` and, if it agrees, starts a load that replaces the list.
    /// Any list response started before this one is ignored when it arrives.
    async fn reload_with(&self, kind: ReloadKind, prepare: impl FnOnce(&mut ListState) -> bool) {
        let started = self.inner.store.update(|s| {
            if !prepare(s) {
                return None;
            }
            s.generation += 1;
            s.items.clear();
            s.paging.offset = 0;
            s.loading.is_loading = kind == ReloadKind::Load;
            s.loading.is_refreshing = kind == ReloadKind::Refresh;
            Some((s.generation, self.query_for(s, 0)))
        });
        let Some((generation, query)) = started else {
            return;
        };

        debug!(
            generation,
            kind = ?kind,
            category_id = ?query.category_id,
            status = ?query.status,
            search = ?query.search,
            "Reloading URL list."
        );
        let result = self.inner.urls.get_urls(&query).await;

        self.inner.store.update(|s| {
            if s.generation != generation {
                debug!(generation, current = s.generation, "Discarding superseded list response.");
                return;
            }
            s.loading.is_loading = false;
            s.loading.is_refreshing = false;
            match result {
                Ok(page) => {
                    let received = page.urls.len();
                    s.items = page.urls;
                    s.paging.offset = 0;
                    s.paging.advance(received, page.total);
                    s.error = None;
                    info!(received, total = page.total, "URL list loaded.");
                }
                Err(e) => {
                    s.paging.has_more = false;
                    s.paging.total_count = 0;
                    s.error = Some(e.message);
                }
            }
        });
    }

    async fn load_more(&self) {
        let started = self.inner.store.update(|s| {
            if !s.can_load_more() {
                return None;
            }
            s.loading.is_loading_more = true;
            Some((s.generation, self.query_for(s, s.paging.offset)))
        });
        let Some((generation, query)) = started else {
            debug!("Load more skipped: nothing more to load or a load is already running.");
            return;
        };

        let result = self.inner.urls.get_urls(&query).await;

        self.inner.store.update(|s| {
            s.loading.is_loading_more = false;
            if s.generation != generation {
                debug!(generation, current = s.generation, "Discarding page for a superseded list.");
                return;
            }
            match result {
                Ok(page) => {
                    let received = page.urls.len();
                    s.items.extend(page.urls);
                    s.paging.advance(received, page.total);
                    s.error = None;
                    debug!(offset = s.paging.offset, has_more = s.paging.has_more, "Appended page.");
                }
                Err(e) => {
                    s.error = Some(e.message);
                }
            }
        });
    }

    fn search(&self, text: String) {
        let token = self.inner.store.update(|s| {
            s.search_input = text.clone();
            s.search_token += 1;
            s.search_token
        });
        let this = self.clone();
        self.inner.search_debouncer.schedule(move || {
            tokio::spawn(async move { this.commit_search(text, token).await });
        });
    }

    /// Commits `query` unless newer input or a clear arrived since it was typed.
    /// Queries are compared trimmed, the way they go out on the wire.
    async fn commit_search(&self, query: String, token: u64) {
        let mut changed = false;
        self.reload_with(ReloadKind::Load, |s| {
            if s.search_token != token || s.search_query.trim() == query.trim() {
                return false;
            }
            s.search_query = query.clone();
            changed = true;
            true
        })
        .await;
        if !changed {
            debug!(query = %query, token, "Search commit skipped.");
        }
    }

    async fn toggle_item_status(&self, id: i32, current_status: Option<UrlStatus>) {
        if !self.inner.store.read(|s| s.items.iter().any(|u| u.id == id)) {
            warn!(url_id = id, "Ignoring status toggle for a URL that is not in the list.");
            return;
        }

        let proposed = UrlStatus::toggled(current_status);
        info!(url_id = id, from = ?current_status, to = ?proposed, "Toggling URL status.");
        let request = UpdateUrlRequest::default().with_status(proposed);

        match self.inner.urls.update_url(id, &request).await {
            Ok(updated) => self.inner.store.update(|s| {
                if let Some(slot) = s.items.iter_mut().find(|u| u.id == id) {
                    *slot = updated;
                }
                s.error = None;
            }),
            Err(e) => self.inner.store.update(|s| {
                s.error = Some(format!("Failed to update status: {}", e.message));
            }),
        }
    }
}
