// Error types for repotree.
// Classifies GitHub API failures and covers config and IO errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoTreeError {
    #[error("GitHub token is required")]
    AuthenticationRequired,

    #[error("Authentication failed: invalid or expired token")]
    InvalidCredential,

    #[error("Rate limit exceeded, resets at {}", format_reset(.reset))]
    RateLimitExceeded { reset: Option<u64>, message: String },

    #[error("GitHub API returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("GitHub API error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RepoTreeError {
    /// Whether the upstream answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoTreeError::Upstream { status: 404, .. })
    }
}

/// Render a rate limit reset epoch as wall-clock time.
fn format_reset(reset: &Option<u64>) -> String {
    reset
        .and_then(|secs| chrono::DateTime::from_timestamp(secs as i64, 0))
        .map(|dt| dt.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub type Result<T> = std::result::Result<T, RepoTreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_includes_reset() {
        let err = RepoTreeError::RateLimitExceeded {
            reset: Some(0),
            message: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Rate limit exceeded, resets at 00:00:00 UTC"
        );

        let err = RepoTreeError::RateLimitExceeded {
            reset: None,
            message: String::new(),
        };
        assert!(err.to_string().ends_with("unknown"));
    }

    #[test]
    fn test_not_found_classification() {
        let err = RepoTreeError::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.is_not_found());

        let err = RepoTreeError::Upstream {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
