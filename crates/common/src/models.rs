use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Editorial flag a curator can put on a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrlStatus {
    OnShow,
    Dump,
}

impl UrlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlStatus::OnShow => "on_show",
            UrlStatus::Dump => "dump",
        }
    }

    /// Lenient wire decoding: anything that is not a known status means "no status".
    pub fn from_wire(value: Option<&str>) -> Option<UrlStatus> {
        value.and_then(|v| v.parse().ok())
    }

    /// Status proposed when the quick toggle is pressed on an item.
    pub fn toggled(current: Option<UrlStatus>) -> Option<UrlStatus> {
        match current {
            Some(UrlStatus::OnShow) => None,
            _ => Some(UrlStatus::OnShow),
        }
    }
}

impl FromStr for UrlStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_show" => Ok(UrlStatus::OnShow),
            "dump" => Ok(UrlStatus::Dump),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link posted in the chat platform and tracked by the curation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Url {
    pub id: i32,
    pub source_url: String,
    pub posted_by: String,
    pub posted_at: String,
    pub title: Option<String>,
    pub origin_message_id: String,
    pub origin_message_link: Option<String>,
    pub origin_user_id: Option<String>,
    pub twitter_username: Option<String>,
    pub category_id: Option<i32>,
    pub episode_id: Option<i32>,
    pub status: Option<UrlStatus>,
    pub covered: bool,
    pub display_order: i32,
    pub created_at: String,
    pub updated_at: String,
    pub category_name: Option<String>,
    pub episode_number: Option<i32>,
    pub is_duplicate: bool,
}

impl Url {
    pub fn posted_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.posted_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Title when the backend resolved one, the raw link otherwise.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.source_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
    pub url_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPreview {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub name: String,
    pub description: String,
}

/// One page of a list query, already converted to domain values.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlPage {
    pub urls: Vec<Url>,
    pub total: u32,
}
