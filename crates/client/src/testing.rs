//! In-memory `StagehandApi` used by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use stagehand_common::dto::{
    BulkOperationRequest, BulkOperationResponse, CategoryDto, CategoryRequest, LinkPreviewDto,
    PaginatedUrlResponse, UpdateUrlRequest, UrlCount, UrlDto, VersionDto,
};

use crate::api::{StagehandApi, UrlQuery};
use crate::error::ApiError;
use crate::repository::{CategoryRepository, UrlRepository};

#[derive(Default)]
pub(crate) struct FakeApi {
    urls: Mutex<Vec<UrlDto>>,
    categories: Mutex<Vec<CategoryDto>>,
    list_calls: Mutex<Vec<UrlQuery>>,
    update_calls: Mutex<Vec<(i32, UpdateUrlRequest)>>,
    bulk_calls: Mutex<Vec<BulkOperationRequest>>,
    preview_calls: Mutex<Vec<String>>,
    list_delays: Mutex<VecDeque<Duration>>,
    fail_lists: AtomicBool,
    fail_updates: AtomicBool,
    fail_categories: AtomicBool,
    fail_preview: AtomicBool,
    fail_get_url: AtomicBool,
}

pub(crate) fn url_dto(id: i32) -> UrlDto {
    UrlDto {
        id,
        url: format!("https://example.com/links/{id}"),
        posted_by: "curator".to_string(),
        posted_at: "2024-03-01T09:00:00Z".to_string(),
        title: Some(format!("Link {id}")),
        discord_message_id: format!("msg-{id}"),
        discord_message_link: None,
        discord_user_id: None,
        twitter_username: None,
        category_id: None,
        episode_id: None,
        status: None,
        covered: false,
        display_order: id,
        created_at: "2024-03-01T09:00:00Z".to_string(),
        updated_at: "2024-03-01T09:00:00Z".to_string(),
        category_name: None,
        episode_number: None,
        is_duplicate: false,
    }
}

fn category_dto(id: i32, name: &str, url_count: &str) -> CategoryDto {
    CategoryDto {
        id,
        name: name.to_string(),
        color: "#3498db".to_string(),
        created_at: String::new(),
        updated_at: String::new(),
        url_count: Some(UrlCount::Text(url_count.to_string())),
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "boom".to_string(),
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        body: format!("{what} not found"),
    }
}

impl FakeApi {
    /// `count` URLs with ids `1..=count`, plus three categories.
    pub(crate) fn with_urls(count: i32) -> Self {
        let api = Self::default();
        *api.urls.lock().unwrap() = (1..=count).map(url_dto).collect();
        *api.categories.lock().unwrap() = vec![
            category_dto(1, "news", "abc"),
            category_dto(2, "Music", "42"),
            category_dto(3, "art", "7"),
        ];
        api
    }

    pub(crate) fn repositories(self: &Arc<Self>) -> (UrlRepository, CategoryRepository) {
        (
            UrlRepository::new(self.clone()),
            CategoryRepository::new(self.clone()),
        )
    }

    pub(crate) fn edit_url(&self, id: i32, edit: impl FnOnce(&mut UrlDto)) {
        if let Some(url) = self.urls.lock().unwrap().iter_mut().find(|u| u.id == id) {
            edit(url);
        }
    }

    /// The next list requests sleep for these durations, in order.
    pub(crate) fn push_list_delay(&self, delay: Duration) {
        self.list_delays.lock().unwrap().push_back(delay);
    }

    pub(crate) fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_categories(&self, fail: bool) {
        self.fail_categories.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_preview(&self, fail: bool) {
        self.fail_preview.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_get_url(&self, fail: bool) {
        self.fail_get_url.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn list_calls(&self) -> Vec<UrlQuery> {
        self.list_calls.lock().unwrap().clone()
    }

    pub(crate) fn update_calls(&self) -> Vec<(i32, UpdateUrlRequest)> {
        self.update_calls.lock().unwrap().clone()
    }

    pub(crate) fn bulk_calls(&self) -> Vec<BulkOperationRequest> {
        self.bulk_calls.lock().unwrap().clone()
    }

    pub(crate) fn preview_calls(&self) -> Vec<String> {
        self.preview_calls.lock().unwrap().clone()
    }

    pub(crate) fn categories(&self) -> Vec<CategoryDto> {
        self.categories.lock().unwrap().clone()
    }
}

#[async_trait]
impl StagehandApi for FakeApi {
    async fn get_urls(&self, query: &UrlQuery) -> Result<PaginatedUrlResponse, ApiError> {
        self.list_calls.lock().unwrap().push(query.clone());
        let delay = self.list_delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(server_error());
        }

        let matching: Vec<UrlDto> = self
            .urls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| match query.category_id {
                Some(0) => u.category_id.is_none(),
                Some(id) => u.category_id == Some(id),
                None => true,
            })
            .filter(|u| match query.status {
                Some(status) => u.status.as_deref() == Some(status.as_str()),
                None => true,
            })
            .filter(|u| match query.search.as_deref() {
                Some(term) if !term.trim().is_empty() => u.url.contains(term),
                _ => true,
            })
            .cloned()
            .collect();

        let total = matching.len() as u32;
        let urls = matching
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(PaginatedUrlResponse {
            urls,
            total,
            limit: query.limit,
            offset: query.offset,
        })
    }

    async fn get_url(&self, id: i32) -> Result<UrlDto, ApiError> {
        if self.fail_get_url.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.urls
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("URL"))
    }

    async fn update_url(&self, id: i32, request: &UpdateUrlRequest) -> Result<UrlDto, ApiError> {
        self.update_calls.lock().unwrap().push((id, request.clone()));
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut urls = self.urls.lock().unwrap();
        let url = urls.iter_mut().find(|u| u.id == id).ok_or_else(|| not_found("URL"))?;
        if let Some(category_id) = request.category_id {
            url.category_id = category_id;
        }
        if let Some(status) = &request.status {
            url.status = status.clone();
        }
        if let Some(covered) = request.covered {
            url.covered = covered;
        }
        if let Some(display_order) = request.display_order {
            url.display_order = display_order;
        }
        url.updated_at = "2024-03-02T10:00:00Z".to_string();
        Ok(url.clone())
    }

    async fn bulk_operation(
        &self,
        request: &BulkOperationRequest,
    ) -> Result<BulkOperationResponse, ApiError> {
        self.bulk_calls.lock().unwrap().push(request.clone());
        Ok(BulkOperationResponse {
            success: true,
            message: "ok".to_string(),
            affected: request.url_ids.len() as u32,
        })
    }

    async fn get_categories(&self) -> Result<Vec<CategoryDto>, ApiError> {
        if self.fail_categories.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(self.categories())
    }

    async fn get_category(&self, id: i32) -> Result<CategoryDto, ApiError> {
        self.categories()
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Category"))
    }

    async fn create_category(&self, request: &CategoryRequest) -> Result<CategoryDto, ApiError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut categories = self.categories.lock().unwrap();
        let id = categories.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let category = category_dto(id, &request.name, "0");
        let category = CategoryDto {
            color: request.color.clone(),
            ..category
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: i32,
        request: &CategoryRequest,
    ) -> Result<CategoryDto, ApiError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut categories = self.categories.lock().unwrap();
        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Category"))?;
        category.name = request.name.clone();
        category.color = request.color.clone();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i32) -> Result<(), ApiError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(not_found("Category"));
        }
        Ok(())
    }

    async fn get_link_preview(&self, url: &str) -> Result<LinkPreviewDto, ApiError> {
        self.preview_calls.lock().unwrap().push(url.to_string());
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        Ok(LinkPreviewDto {
            title: Some(format!("Preview of {url}")),
            description: Some("A page".to_string()),
            image_url: None,
        })
    }

    async fn get_version(&self) -> Result<VersionDto, ApiError> {
        Ok(VersionDto {
            version: "1.2.3".to_string(),
            name: "stagehand".to_string(),
            description: "fake".to_string(),
        })
    }
}
