//! CMS error types

use thiserror::Error;

/// Errors that can occur while loading documents from the CMS
#[derive(Error, Debug)]
pub enum CmsError {
    /// No published document derives to the requested slug
    #[error("No document matches slug: {slug}")]
    NotFound { slug: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::Parse(err.to_string())
    }
}

/// Result type alias for CMS operations
pub type CmsResult<T> = Result<T, CmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CmsError::NotFound {
            slug: "missing-post".to_string(),
        };
        assert_eq!(err.to_string(), "No document matches slug: missing-post");

        let err = CmsError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error 401: unauthorized");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let cms_err: CmsError = json_err.into();
        assert!(matches!(cms_err, CmsError::Parse(_)));
    }
}
