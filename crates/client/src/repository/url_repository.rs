use std::sync::Arc;

use stagehand_common::dto::{BulkOperation, BulkOperationRequest, BulkValue, UpdateUrlRequest};
use stagehand_common::models::{LinkPreview, Url, UrlPage, UrlStatus, VersionInfo};
use stagehand_common::UNCATEGORIZED_CATEGORY_ID;
use tracing::{debug, error};

use crate::api::{StagehandApi, UrlQuery};
use crate::error::{RepoResult, RepositoryError};

#[derive(Clone)]
pub struct UrlRepository {
    api: Arc<dyn StagehandApi>,
}

impl UrlRepository {
    pub fn new(api: Arc<dyn StagehandApi>) -> Self {
        Self { api }
    }

    pub async fn get_urls(&self, query: &UrlQuery) -> RepoResult<UrlPage> {
        match self.api.get_urls(query).await {
            Ok(response) => {
                debug!(
                    offset = query.offset,
                    received = response.urls.len(),
                    total = response.total,
                    "Fetched URL page."
                );
                Ok(UrlPage {
                    urls: response.urls.into_iter().map(Url::from).collect(),
                    total: response.total,
                })
            }
            Err(e) => {
                error!(offset = query.offset, error = %e, "Failed to fetch URLs.");
                Err(e.into())
            }
        }
    }

    pub async fn get_url(&self, id: i32) -> RepoResult<Url> {
        self.api.get_url(id).await.map(Url::from).map_err(|e| {
            error!(url_id = id, error = %e, "Failed to fetch URL.");
            RepositoryError::from(e)
        })
    }

    pub async fn update_url(&self, id: i32, request: &UpdateUrlRequest) -> RepoResult<Url> {
        if request.is_empty() {
            return Err(RepositoryError::new("Nothing to update"));
        }
        self.api
            .update_url(id, request)
            .await
            .map(Url::from)
            .map_err(|e| {
                error!(url_id = id, error = %e, "Failed to update URL.");
                RepositoryError::from(e)
            })
    }

    /// Assigns `category_id` to every URL; `None` removes the category.
    pub async fn bulk_categorize(&self, url_ids: Vec<i32>, category_id: Option<i32>) -> RepoResult<u32> {
        let request = BulkOperationRequest {
            url_ids,
            operation: BulkOperation::Categorize,
            value: BulkValue::CategoryId(category_id.unwrap_or(UNCATEGORIZED_CATEGORY_ID)),
        };
        self.bulk(request).await
    }

    pub async fn bulk_flag(&self, url_ids: Vec<i32>, status: UrlStatus) -> RepoResult<u32> {
        let request = BulkOperationRequest {
            url_ids,
            operation: BulkOperation::Flag,
            value: BulkValue::Status(status.as_str().to_string()),
        };
        self.bulk(request).await
    }

    async fn bulk(&self, request: BulkOperationRequest) -> RepoResult<u32> {
        match self.api.bulk_operation(&request).await {
            Ok(response) if response.success => Ok(response.affected),
            Ok(response) => Err(RepositoryError::new(if response.message.is_empty() {
                "Bulk operation was rejected".to_string()
            } else {
                response.message
            })),
            Err(e) => {
                error!(operation = ?request.operation, count = request.url_ids.len(), error = %e, "Bulk operation failed.");
                Err(e.into())
            }
        }
    }

    pub async fn get_link_preview(&self, url: &str) -> RepoResult<LinkPreview> {
        self.api
            .get_link_preview(url)
            .await
            .map(LinkPreview::from)
            .map_err(RepositoryError::from)
    }

    pub async fn get_version(&self) -> RepoResult<VersionInfo> {
        self.api
            .get_version()
            .await
            .map(VersionInfo::from)
            .map_err(RepositoryError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;

    #[tokio::test]
    async fn test_get_urls_maps_page() {
        let api = Arc::new(FakeApi::with_urls(120));
        let repo = UrlRepository::new(api.clone());

        let page = repo
            .get_urls(&UrlQuery {
                offset: 100,
                ..UrlQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 120);
        assert_eq!(page.urls.len(), 20);
        assert_eq!(page.urls[0].id, 101);
    }

    #[tokio::test]
    async fn test_failure_is_normalized() {
        let api = Arc::new(FakeApi::with_urls(5));
        api.fail_lists(true);
        let repo = UrlRepository::new(api);

        let err = repo.get_urls(&UrlQuery::default()).await.unwrap_err();
        assert!(err.message.contains("500"));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected_locally() {
        let api = Arc::new(FakeApi::with_urls(5));
        let repo = UrlRepository::new(api.clone());

        let err = repo.update_url(1, &UpdateUrlRequest::default()).await.unwrap_err();
        assert_eq!(err.message, "Nothing to update");
        assert_eq!(api.update_calls().len(), 0);
    }

    #[tokio::test]
    async fn test_update_covered_and_order() {
        let api = Arc::new(FakeApi::with_urls(5));
        let repo = UrlRepository::new(api.clone());

        let request = UpdateUrlRequest::default()
            .with_covered(true)
            .with_display_order(9);
        let url = repo.update_url(2, &request).await.unwrap();
        assert!(url.covered);
        assert_eq!(url.display_order, 9);
        assert_eq!(url.status, None);
    }

    #[tokio::test]
    async fn test_bulk_categorize_without_category_sends_sentinel() {
        let api = Arc::new(FakeApi::with_urls(5));
        let repo = UrlRepository::new(api.clone());

        let affected = repo.bulk_categorize(vec![1, 2, 3], None).await.unwrap();
        assert_eq!(affected, 3);
        let calls = api.bulk_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].value, BulkValue::CategoryId(0));
        assert_eq!(calls[0].operation, BulkOperation::Categorize);
    }
}
