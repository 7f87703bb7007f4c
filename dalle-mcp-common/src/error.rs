//! Error types for the DALL-E MCP server.
//!
//! Every failure the image tool can hit is one variant of [`Error`], so the
//! tool boundary can turn any of them into the same user-facing text.
//!
//! # Error Categories
//!
//! - `Error::MissingParameter`: empty `prompt` or `output_path`
//! - `Error::Generation`: non-success from the generation endpoint
//! - `Error::NoImageReturned`: success status but no image URL
//! - `Error::Download`: non-success while fetching the image URL
//! - `Error::Http`, `Error::Io`, `Error::Config`: everything else, wrapped

use reqwest::StatusCode;
use thiserror::Error;

/// Unified error type for image generation.
#[derive(Debug, Error)]
pub enum Error {
    /// A required tool parameter was empty or absent
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The generation endpoint answered with a non-success status
    ///
    /// Carries the raw response body so the caller sees the service's own
    /// explanation.
    #[error("OpenAI API error: {status} - {body}")]
    Generation {
        /// HTTP status returned by the generation endpoint
        status: StatusCode,
        /// Response body text
        body: String,
    },

    /// The generation endpoint succeeded but returned no image URL
    #[error("No image URL returned from OpenAI API")]
    NoImageReturned,

    /// Fetching the generated image failed with a non-success status
    #[error("Failed to download image: {status}")]
    Download {
        /// HTTP status returned by the image host
        status: StatusCode,
    },

    /// Request could not be sent or the response could not be read
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// File system I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration errors (missing env vars, invalid values)
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Classification of [`Error`] variants.
///
/// `Wrapped` covers every failure that did not originate in the tool's own
/// pipeline checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingParameter,
    UpstreamGenerationFailure,
    NoImageReturned,
    DownloadFailure,
    Wrapped,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::MissingParameter => write!(f, "missing_parameter"),
            ErrorKind::UpstreamGenerationFailure => write!(f, "upstream_generation_failure"),
            ErrorKind::NoImageReturned => write!(f, "no_image_returned"),
            ErrorKind::DownloadFailure => write!(f, "download_failure"),
            ErrorKind::Wrapped => write!(f, "wrapped"),
        }
    }
}

impl Error {
    /// Create a new missing parameter error.
    ///
    /// # Example
    ///
    /// ```
    /// use dalle_mcp_common::error::Error;
    ///
    /// let err = Error::missing_parameter("prompt");
    /// assert_eq!(err.to_string(), "Missing required parameter: prompt");
    /// ```
    pub fn missing_parameter(name: &'static str) -> Self {
        Error::MissingParameter(name)
    }

    /// Create a new generation failure from a status and response body.
    ///
    /// # Example
    ///
    /// ```
    /// use dalle_mcp_common::error::Error;
    /// use reqwest::StatusCode;
    ///
    /// let err = Error::generation(StatusCode::BAD_REQUEST, "bad request");
    /// assert!(err.to_string().contains("400"));
    /// assert!(err.to_string().contains("bad request"));
    /// ```
    pub fn generation(status: StatusCode, body: impl Into<String>) -> Self {
        Error::Generation {
            status,
            body: body.into(),
        }
    }

    /// Create a new download failure.
    pub fn download(status: StatusCode) -> Self {
        Error::Download { status }
    }

    /// The kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingParameter(_) => ErrorKind::MissingParameter,
            Error::Generation { .. } => ErrorKind::UpstreamGenerationFailure,
            Error::NoImageReturned => ErrorKind::NoImageReturned,
            Error::Download { .. } => ErrorKind::DownloadFailure,
            Error::Http(_) | Error::Io(_) | Error::Config(_) => ErrorKind::Wrapped,
        }
    }
}

/// Configuration errors.
///
/// These errors occur when loading configuration at startup and are fatal
/// to the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("Required environment variable {0} is not set")]
    MissingEnvVar(String),

    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl ConfigError {
    /// Create a new missing environment variable error.
    pub fn missing_env_var(name: impl Into<String>) -> Self {
        ConfigError::MissingEnvVar(name.into())
    }

    /// Create a new invalid value error.
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue(name.into(), reason.into())
    }
}

/// Result type alias using the unified Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_message() {
        let err = Error::missing_parameter("output_path");
        assert_eq!(err.to_string(), "Missing required parameter: output_path");
        assert_eq!(err.kind(), ErrorKind::MissingParameter);
    }

    #[test]
    fn test_generation_error_includes_status_and_body() {
        let err = Error::generation(StatusCode::BAD_REQUEST, "bad request");
        let msg = err.to_string();
        assert!(msg.contains("400"), "Should contain status code");
        assert!(msg.contains("Bad Request"), "Should contain reason phrase");
        assert!(msg.contains("bad request"), "Should contain body");
        assert_eq!(err.kind(), ErrorKind::UpstreamGenerationFailure);
    }

    #[test]
    fn test_no_image_returned_message() {
        let err = Error::NoImageReturned;
        assert_eq!(err.to_string(), "No image URL returned from OpenAI API");
        assert_eq!(err.kind(), ErrorKind::NoImageReturned);
    }

    #[test]
    fn test_download_error_includes_status() {
        let err = Error::download(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Failed to download image: 404 Not Found");
        assert_eq!(err.kind(), ErrorKind::DownloadFailure);
    }

    #[test]
    fn test_config_error_includes_var_name() {
        let err = ConfigError::missing_env_var("OPENAI_API_KEY");
        let msg = err.to_string();
        assert!(msg.contains("OPENAI_API_KEY"), "Should contain variable name");
    }

    #[test]
    fn test_error_from_config_error() {
        let config_err = ConfigError::missing_env_var("TEST_VAR");
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.kind(), ErrorKind::Wrapped);
    }

    #[test]
    fn test_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Wrapped);
        assert_eq!(err.to_string(), "read-only");
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::MissingParameter.to_string(), "missing_parameter");
        assert_eq!(ErrorKind::UpstreamGenerationFailure.to_string(), "upstream_generation_failure");
        assert_eq!(ErrorKind::NoImageReturned.to_string(), "no_image_returned");
        assert_eq!(ErrorKind::DownloadFailure.to_string(), "download_failure");
        assert_eq!(ErrorKind::Wrapped.to_string(), "wrapped");
    }
}
