use async_trait::async_trait;
use stagehand_common::dto::{
    BulkOperationRequest, BulkOperationResponse, CategoryDto, CategoryRequest, LinkPreviewDto,
    PaginatedUrlResponse, UpdateUrlRequest, UrlDto, VersionDto,
};
use stagehand_common::models::UrlStatus;
use stagehand_common::DEFAULT_PAGE_SIZE;

use crate::error::ApiError;

pub mod http;

pub use http::HttpApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// Parameters of `GET /urls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlQuery {
    pub limit: u32,
    pub offset: u32,
    pub category_id: Option<i32>,
    pub status: Option<UrlStatus>,
    pub search: Option<String>,
    pub covered: Option<bool>,
    pub posted_by: Option<String>,
    pub sort: SortOrder,
}

impl Default for UrlQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            category_id: None,
            status: None,
            search: None,
            covered: None,
            posted_by: None,
            sort: SortOrder::default(),
        }
    }
}

impl UrlQuery {
    /// Query-string pairs in a stable order. Unset values and blank text are
    /// left out instead of being sent empty or as `false`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        if let Some(category_id) = self.category_id {
            pairs.push(("category_id", category_id.to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(covered) = self.covered {
            pairs.push(("covered", covered.to_string()));
        }
        if let Some(posted_by) = self.posted_by.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("posted_by", posted_by.to_string()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }
}

/// The remote Stagehand service as seen by the repositories.
#[async_trait]
pub trait StagehandApi: Send + Sync {
    async fn get_urls(&self, query: &UrlQuery) -> Result<PaginatedUrlResponse, ApiError>;

    async fn get_url(&self, id: i32) -> Result<UrlDto, ApiError>;

    async fn update_url(&self, id: i32, request: &UpdateUrlRequest) -> Result<UrlDto, ApiError>;

    async fn bulk_operation(
        &self,
        request: &BulkOperationRequest,
    ) -> Result<BulkOperationResponse, ApiError>;

    async fn get_categories(&self) -> Result<Vec<CategoryDto>, ApiError>;

    async fn get_category(&self, id: i32) -> Result<CategoryDto, ApiError>;

    async fn create_category(&self, request: &CategoryRequest) -> Result<CategoryDto, ApiError>;

    async fn update_category(
        &self,
        id: i32,
        request: &CategoryRequest,
    ) -> Result<CategoryDto, ApiError>;

    async fn delete_category(&self, id: i32) -> Result<(), ApiError>;

    async fn get_link_preview(&self, url: &str) -> Result<LinkPreviewDto, ApiError>;

    async fn get_version(&self) -> Result<VersionDto, ApiError>;
}
