use std::sync::Arc;

use stagehand_common::dto::UpdateUrlRequest;
use stagehand_common::models::{Category, LinkPreview, Url, UrlStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::StateStore;
use crate::repository::{CategoryRepository, UrlRepository};

/// Single URL being inspected and edited.
///
/// `selected_category_id` and `selected_status` hold the proposed edits; they are
/// seeded from the loaded item and only reach the server on `SaveChanges`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailState {
    pub url: Option<Url>,
    pub link_preview: Option<LinkPreview>,
    pub categories: Vec<Category>,
    pub selected_category_id: Option<i32>,
    pub selected_status: Option<UrlStatus>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub is_loading_preview: bool,
    pub saved: bool,
    pub error: Option<String>,
}

impl DetailState {
    /// Whether the proposed edits differ from the loaded item.
    pub fn has_changes(&self) -> bool {
        self.url.as_ref().is_some_and(|url| {
            url.category_id != self.selected_category_id || url.status != self.selected_status
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailIntent {
    Load,
    LoadLinkPreview,
    SelectCategory(Option<i32>),
    SelectStatus(Option<UrlStatus>),
    SaveChanges,
}

struct Inner {
    url_id: i32,
    urls: UrlRepository,
    categories: CategoryRepository,
    store: StateStore<DetailState>,
}

#[derive(Clone)]
pub struct DetailController {
    inner: Arc<Inner>,
}

impl DetailController {
    pub fn new(url_id: i32, urls: UrlRepository, categories: CategoryRepository) -> Self {
        Self {
            inner: Arc::new(Inner {
                url_id,
                urls,
                categories,
                store: StateStore::new(DetailState::default()),
            }),
        }
    }

    pub fn state(&self) -> DetailState {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.inner.store.subscribe()
    }

    /// Loads the item and the category choices independently.
    pub fn start(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::join!(this.load_categories(), this.load());
        })
    }

    pub fn dispatch(&self, intent: DetailIntent) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle(intent).await })
    }

    pub async fn handle(&self, intent: DetailIntent) {
        debug!(url_id = self.inner.url_id, intent = ?intent, "Handling detail intent.");
        match intent {
            DetailIntent::Load => self.load().await,
            DetailIntent::LoadLinkPreview => {
                let source_url = self
                    .inner
                    .store
                    .read(|s| s.url.as_ref().map(|u| u.source_url.clone()));
                if let Some(source_url) = source_url {
                    self.load_preview(&source_url).await;
                }
            }
            DetailIntent::SelectCategory(category_id) => self.inner.store.update(|s| {
                s.selected_category_id = category_id;
                s.saved = false;
            }),
            DetailIntent::SelectStatus(status) => self.inner.store.update(|s| {
                s.selected_status = status;
                s.saved = false;
            }),
            DetailIntent::SaveChanges => self.save().await,
        }
    }

    async fn load_categories(&self) {
        match self.inner.categories.get_categories().await {
            Ok(categories) => self.inner.store.update(|s| s.categories = categories),
            Err(e) => warn!(error = %e, "Failed to load categories for the detail view."),
        }
    }

    async fn load(&self) {
        let id = self.inner.url_id;
        self.inner.store.update(|s| {
            s.is_loading = true;
            s.error = None;
        });

        match self.inner.urls.get_url(id).await {
            Ok(url) => {
                let source_url = url.source_url.clone();
                self.inner.store.update(|s| {
                    s.is_loading = false;
                    s.selected_category_id = url.category_id;
                    s.selected_status = url.status;
                    s.url = Some(url);
                    s.saved = false;
                });
                self.load_preview(&source_url).await;
            }
            Err(e) => self.inner.store.update(|s| {
                s.is_loading = false;
                s.error = Some(e.message);
            }),
        }
    }

    async fn load_preview(&self, source_url: &str) {
        self.inner.store.update(|s| s.is_loading_preview = true);
        let result = self.inner.urls.get_link_preview(source_url).await;
        self.inner.store.update(|s| {
            s.is_loading_preview = false;
            match result {
                Ok(preview) => s.link_preview = Some(preview),
                Err(e) => {
                    warn!(url_id = self.inner.url_id, error = %e, "Link preview unavailable.");
                    s.link_preview = None;
                }
            }
        });
    }

    async fn save(&self) {
        let id = self.inner.url_id;
        let request = self.inner.store.update(|s| {
            if s.url.is_none() || s.is_saving {
                return None;
            }
            s.is_saving = true;
            s.saved = false;
            s.error = None;
            Some(
                UpdateUrlRequest::default()
                    .with_category(s.selected_category_id)
                    .with_status(s.selected_status),
            )
        });
        let Some(request) = request else {
            debug!(url_id = id, "Nothing loaded or a save is already running.");
            return;
        };

        match self.inner.urls.update_url(id, &request).await {
            Ok(url) => {
                info!(url_id = id, category_id = ?url.category_id, status = ?url.status, "URL saved.");
                self.inner.store.update(|s| {
                    s.is_saving = false;
                    s.selected_category_id = url.category_id;
                    s.selected_status = url.status;
                    s.url = Some(url);
                    s.saved = true;
                });
            }
            Err(e) => self.inner.store.update(|s| {
                s.is_saving = false;
                s.error = Some(e.message);
            }),
        }
    }
}
