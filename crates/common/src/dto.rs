//! Wire representations of the Stagehand REST API.

use serde::{Deserialize, Serialize};

use crate::models::{Category, LinkPreview, Url, UrlStatus, VersionInfo};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UrlDto {
    pub id: i32,
    pub url: String,
    #[serde(default)]
    pub posted_by: String,
    #[serde(default)]
    pub posted_at: String,
    pub title: Option<String>,
    #[serde(default)]
    pub discord_message_id: String,
    pub discord_message_link: Option<String>,
    pub discord_user_id: Option<String>,
    pub twitter_username: Option<String>,
    pub category_id: Option<i32>,
    pub episode_id: Option<i32>,
    pub status: Option<String>,
    #[serde(default)]
    pub covered: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub category_name: Option<String>,
    pub episode_number: Option<i32>,
    #[serde(default)]
    pub is_duplicate: bool,
}

impl From<UrlDto> for Url {
    fn from(dto: UrlDto) -> Self {
        Url {
            id: dto.id,
            source_url: dto.url,
            posted_by: dto.posted_by,
            posted_at: dto.posted_at,
            title: dto.title,
            origin_message_id: dto.discord_message_id,
            origin_message_link: dto.discord_message_link,
            origin_user_id: dto.discord_user_id,
            twitter_username: dto.twitter_username,
            category_id: dto.category_id,
            episode_id: dto.episode_id,
            status: UrlStatus::from_wire(dto.status.as_deref()),
            covered: dto.covered,
            display_order: dto.display_order,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            category_name: dto.category_name,
            episode_number: dto.episode_number,
            is_duplicate: dto.is_duplicate,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PaginatedUrlResponse {
    pub urls: Vec<UrlDto>,
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

/// Body of `PUT /urls/{id}`.
///
/// The outer `Option` decides whether a field is sent at all; for the nullable
/// fields an inner `None` is sent as an explicit `null`, which clears the value.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct UpdateUrlRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covered: Option<bool>,
}

impl UpdateUrlRequest {
    pub fn with_status(mut self, status: Option<UrlStatus>) -> Self {
        self.status = Some(status.map(|s| s.as_str().to_string()));
        self
    }

    pub fn with_category(mut self, category_id: Option<i32>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_covered(mut self, covered: bool) -> Self {
        self.covered = Some(covered);
        self
    }

    pub fn with_display_order(mut self, display_order: i32) -> Self {
        self.display_order = Some(display_order);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &UpdateUrlRequest::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Categorize,
    Flag,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum BulkValue {
    CategoryId(i32),
    Status(String),
}

#[derive(Serialize, Debug, Clone)]
pub struct BulkOperationRequest {
    pub url_ids: Vec<i32>,
    pub operation: BulkOperation,
    pub value: BulkValue,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BulkOperationResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub affected: u32,
}

/// `url_count` is documented as a string but some deployments send a number.
/// Anything else still decodes, and counts as 0.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum UrlCount {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

impl UrlCount {
    pub fn value(&self) -> i64 {
        match self {
            UrlCount::Number(n) => *n,
            UrlCount::Text(s) => s.trim().parse().unwrap_or(0),
            UrlCount::Other(_) => 0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    pub url_count: Option<UrlCount>,
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Category {
            id: dto.id,
            name: dto.name,
            color: dto.color,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
            url_count: dto.url_count.as_ref().map(UrlCount::value).unwrap_or(0),
        }
    }
}

/// Body of both `POST /categories` and `PUT /categories/{id}`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CategoryRequest {
    pub name: String,
    pub color: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LinkPreviewDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<LinkPreviewDto> for LinkPreview {
    fn from(dto: LinkPreviewDto) -> Self {
        LinkPreview {
            title: dto.title,
            description: dto.description,
            image_url: dto.image_url,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VersionDto {
    pub version: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<VersionDto> for VersionInfo {
    fn from(dto: VersionDto) -> Self {
        VersionInfo {
            version: dto.version,
            name: dto.name,
            description: dto.description,
        }
    }
}
