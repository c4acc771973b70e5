use std::sync::Arc;

use stagehand_common::models::Category;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::store::StateStore;
use crate::error::RepoResult;
use crate::repository::CategoryRepository;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryDialog {
    #[default]
    Closed,
    Create,
    Edit(Category),
    Delete(Category),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoriesState {
    /// Sorted by name, ignoring case.
    pub categories: Vec<Category>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub is_deleting: bool,
    pub error: Option<String>,
    pub dialog: CategoryDialog,
}

impl CategoriesState {
    pub fn can_submit(name: &str) -> bool {
        !name.trim().is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_deleting
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoriesIntent {
    Load,
    ShowCreateDialog,
    ShowEditDialog(Category),
    ShowDeleteDialog(Category),
    DismissDialog,
    Create { name: String, color: String },
    Update { id: i32, name: String, color: String },
    Delete(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Save,
    Delete,
}

struct Inner {
    repository: CategoryRepository,
    store: StateStore<CategoriesState>,
}

#[derive(Clone)]
pub struct CategoriesController {
    inner: Arc<Inner>,
}

impl CategoriesController {
    pub fn new(repository: CategoryRepository) -> Self {
        Self {
            inner: Arc::new(Inner {
                repository,
                store: StateStore::new(CategoriesState::default()),
            }),
        }
    }

    pub fn state(&self) -> CategoriesState {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<CategoriesState> {
        self.inner.store.subscribe()
    }

    pub fn dispatch(&self, intent: CategoriesIntent) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle(intent).await })
    }

    pub async fn handle(&self, intent: CategoriesIntent) {
        debug!(intent = ?intent, "Handling categories intent.");
        match intent {
            CategoriesIntent::Load => self.load().await,
            CategoriesIntent::ShowCreateDialog => self.open(CategoryDialog::Create),
            CategoriesIntent::ShowEditDialog(category) => self.open(CategoryDialog::Edit(category)),
            CategoriesIntent::ShowDeleteDialog(category) => {
                self.open(CategoryDialog::Delete(category))
            }
            CategoriesIntent::DismissDialog => self.inner.store.update(|s| {
                s.dialog = CategoryDialog::Closed;
                s.error = None;
            }),
            CategoriesIntent::Create { name, color } => {
                if !self.accept_name(&name) {
                    return;
                }
                let repository = self.inner.repository.clone();
                self.mutate(Mutation::Save, async move {
                    repository.create_category(&name, &color).await.map(drop)
                })
                .await
            }
            CategoriesIntent::Update { id, name, color } => {
                if !self.accept_name(&name) {
                    return;
                }
                let repository = self.inner.repository.clone();
                self.mutate(Mutation::Save, async move {
                    repository.update_category(id, &name, &color).await.map(drop)
                })
                .await
            }
            CategoriesIntent::Delete(id) => {
                let repository = self.inner.repository.clone();
                self.mutate(Mutation::Delete, async move { repository.delete_category(id).await })
                    .await
            }
        }
    }

    fn open(&self, dialog: CategoryDialog) {
        self.inner.store.update(|s| {
            s.dialog = dialog;
            s.error = None;
        });
    }

    fn accept_name(&self, name: &str) -> bool {
        if CategoriesState::can_submit(name) {
            return true;
        }
        self.inner
            .store
            .update(|s| s.error = Some("Category name is required".to_string()));
        false
    }

    async fn load(&self) {
        self.inner.store.update(|s| s.is_loading = true);
        let result = self.inner.repository.get_categories().await;
        self.inner.store.update(|s| {
            s.is_loading = false;
            match result {
                Ok(categories) => {
                    s.categories = sorted(categories);
                    s.error = None;
                }
                Err(e) => s.error = Some(e.message),
            }
        });
    }

    /// Runs one create/update/delete. Success closes the dialog and reloads the list.
    async fn mutate(
        &self,
        kind: Mutation,
        call: impl std::future::Future<Output = RepoResult<()>>,
    ) {
        let started = self.inner.store.update(|s| {
            if s.is_busy() {
                return false;
            }
            match kind {
                Mutation::Save => s.is_saving = true,
                Mutation::Delete => s.is_deleting = true,
            }
            s.error = None;
            true
        });
        if !started {
            warn!(kind = ?kind, "Another category change is still running.");
            return;
        }

        let result = call.await;
        let succeeded = result.is_ok();
        self.inner.store.update(|s| {
            s.is_saving = false;
            s.is_deleting = false;
            match result {
                Ok(()) => s.dialog = CategoryDialog::Closed,
                Err(e) => s.error = Some(e.message),
            }
        });

        if succeeded {
            info!(kind = ?kind, "Category change applied; reloading.");
            self.load().await;
        }
    }
}

fn sorted(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by_cached_key(|c| c.name.to_lowercase());
    categories
}
