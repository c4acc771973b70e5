use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use stagehand_common::dto::{
    BulkOperationRequest, BulkOperationResponse, CategoryDto, CategoryRequest, LinkPreviewDto,
    PaginatedUrlResponse, UpdateUrlRequest, UrlDto, VersionDto,
};
use tracing::debug;

use super::{StagehandApi, UrlQuery};
use crate::error::ApiError;
use crate::version::VERSION;

/// `StagehandApi` over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(format!("stagehand-client/{VERSION}"))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{}{path}: {e}", self.base_url)))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!(method = %method, url = %url, "Sending API request.");
        Ok(self.client.request(method, url))
    }

    async fn send_raw(request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ApiError::Status { status, body });
        }

        Ok(response.text().await?)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let body = Self::send_raw(request).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Makes sure relative joins land under the base path (`/api` + `urls` → `/api/urls`).
fn normalize_base_url(base_url: &str) -> Result<Url, ApiError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{trimmed}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(format!("{trimmed}: cannot be used as a base URL")));
    }
    Ok(url)
}

#[async_trait]
impl StagehandApi for HttpApi {
    async fn get_urls(&self, query: &UrlQuery) -> Result<PaginatedUrlResponse, ApiError> {
        let request = self
            .request(Method::GET, "urls")?
            .query(&query.to_query_pairs());
        Self::send_json(request).await
    }

    async fn get_url(&self, id: i32) -> Result<UrlDto, ApiError> {
        Self::send_json(self.request(Method::GET, &format!("urls/{id}"))?).await
    }

    async fn update_url(&self, id: i32, request: &UpdateUrlRequest) -> Result<UrlDto, ApiError> {
        let builder = self.request(Method::PUT, &format!("urls/{id}"))?.json(request);
        Self::send_json(builder).await
    }

    async fn bulk_operation(
        &self,
        request: &BulkOperationRequest,
    ) -> Result<BulkOperationResponse, ApiError> {
        let builder = self.request(Method::POST, "urls/bulk")?.json(request);
        Self::send_json(builder).await
    }

    async fn get_categories(&self) -> Result<Vec<CategoryDto>, ApiError> {
        Self::send_json(self.request(Method::GET, "categories")?).await
    }

    async fn get_category(&self, id: i32) -> Result<CategoryDto, ApiError> {
        Self::send_json(self.request(Method::GET, &format!("categories/{id}"))?).await
    }

    async fn create_category(&self, request: &CategoryRequest) -> Result<CategoryDto, ApiError> {
        let builder = self.request(Method::POST, "categories")?.json(request);
        Self::send_json(builder).await
    }

    async fn update_category(
        &self,
        id: i32,
        request: &CategoryRequest,
    ) -> Result<CategoryDto, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("categories/{id}"))?
            .json(request);
        Self::send_json(builder).await
    }

    async fn delete_category(&self, id: i32) -> Result<(), ApiError> {
        Self::send_raw(self.request(Method::DELETE, &format!("categories/{id}"))?).await?;
        Ok(())
    }

    async fn get_link_preview(&self, url: &str) -> Result<LinkPreviewDto, ApiError> {
        let request = self
            .request(Method::GET, "link-preview")?
            .query(&[("url", url), ("fetch", "true")]);
        Self::send_json(request).await
    }

    async fn get_version(&self) -> Result<VersionDto, ApiError> {
        Self::send_json(self.request(Method::GET, "version")?).await
    }
}
