use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised by the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// The single failure value repositories hand to controllers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RepositoryError {
    pub message: String,
}

impl RepositoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ApiError> for RepositoryError {
    fn from(err: ApiError) -> Self {
        let message = match err {
            ApiError::Status { status, body } if body.trim().is_empty() => {
                format!("Server returned {status}")
            }
            other => other.to_string(),
        };
        RepositoryError { message }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err: RepositoryError = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            body: "URL not found".to_string(),
        }
        .into();
        assert_eq!(err.message, "Server returned 404 Not Found: URL not found");

        let err: RepositoryError = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "  ".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Server returned 502 Bad Gateway");
    }
}
