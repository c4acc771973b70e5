use std::sync::Arc;

use stagehand_common::dto::CategoryRequest;
use stagehand_common::models::Category;
use tracing::{error, info};

use crate::api::StagehandApi;
use crate::error::{RepoResult, RepositoryError};

#[derive(Clone)]
pub struct CategoryRepository {
    api: Arc<dyn StagehandApi>,
}

impl CategoryRepository {
    pub fn new(api: Arc<dyn StagehandApi>) -> Self {
        Self { api }
    }

    /// Categories in server order.
    pub async fn get_categories(&self) -> RepoResult<Vec<Category>> {
        match self.api.get_categories().await {
            Ok(dtos) => Ok(dtos.into_iter().map(Category::from).collect()),
            Err(e) => {
                error!(error = %e, "Failed to fetch categories.");
                Err(e.into())
            }
        }
    }

    pub async fn get_category(&self, id: i32) -> RepoResult<Category> {
        self.api
            .get_category(id)
            .await
            .map(Category::from)
            .map_err(RepositoryError::from)
    }

    pub async fn create_category(&self, name: &str, color: &str) -> RepoResult<Category> {
        let request = CategoryRequest {
            name: name.trim().to_string(),
            color: color.to_string(),
        };
        let category = self.api.create_category(&request).await.map_err(|e| {
            error!(name = %request.name, error = %e, "Failed to create category.");
            RepositoryError::from(e)
        })?;
        info!(category_id = category.id, name = %category.name, "Category created.");
        Ok(category.into())
    }

    pub async fn update_category(&self, id: i32, name: &str, color: &str) -> RepoResult<Category> {
        let request = CategoryRequest {
            name: name.trim().to_string(),
            color: color.to_string(),
        };
        let category = self.api.update_category(id, &request).await.map_err(|e| {
            error!(category_id = id, error = %e, "Failed to update category.");
            RepositoryError::from(e)
        })?;
        Ok(category.into())
    }

    pub async fn delete_category(&self, id: i32) -> RepoResult<()> {
        self.api.delete_category(id).await.map_err(|e| {
            error!(category_id = id, error = %e, "Failed to delete category.");
            RepositoryError::from(e)
        })?;
        info!(category_id = id, "Category deleted.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_categories_are_converted() {
        let api = Arc::new(FakeApi::with_urls(0));
        let repo = CategoryRepository::new(api);

        let categories = repo.get_categories().await.unwrap();
        let broken = categories.iter().find(|c| c.name == "news").unwrap();
        assert_eq!(broken.url_count, 0);
        let counted = categories.iter().find(|c| c.name == "Music").unwrap();
        assert_eq!(counted.url_count, 42);
    }

    #[tokio::test]
    async fn test_get_category_by_id() {
        let api = Arc::new(FakeApi::with_urls(0));
        let repo = CategoryRepository::new(api);

        let art = repo.get_category(3).await.unwrap();
        assert_eq!(art.name, "art");
        assert_eq!(art.url_count, 7);

        let missing = repo.get_category(99).await.unwrap_err();
        assert!(missing.message.contains("404"));
    }

    #[tokio::test]
    async fn test_create_trims_name() {
        let api = Arc::new(FakeApi::with_urls(0));
        let repo = CategoryRepository::new(api.clone());

        let created = repo.create_category("  Games ", "#2ecc71").await.unwrap();
        assert_eq!(created.name, "Games");
        assert!(api.categories().iter().any(|c| c.name == "Games"));
    }
}
