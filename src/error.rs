//! Error types for API calls.
//!
//! Errors fall into two families that callers usually handle differently:
//! transport errors (the request never produced a successful response) and
//! decode errors (a 2xx body did not match the expected DTO shape). Both keep
//! the raw response when there is one. The client never retries or recovers;
//! the first failure is returned as is.

use crate::decode::{DecodeError, DecodeStrategy};
use http::{HeaderMap, StatusCode};

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use demo_api_client::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// match client.get_users_v3().await {
///     Ok(users) => println!("{} users", users.len()),
///     Err(Error::DeserializationFailed { raw_response, source, .. }) => {
///         eprintln!("Bad payload: {}", raw_response);
///         eprintln!("Reason: {}", source);
///     }
///     Err(Error::HttpError { status, raw_response, .. }) => {
///         eprintln!("HTTP error {}: {}", status, raw_response);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The request exceeded the timeout configured on the client.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The server returned a non-2xx HTTP status code.
    #[error("HTTP error {status}: {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// A successful response body could not be decoded into DTOs.
    #[error("Failed to decode response (status {status}, {strategy} decoding): {source}")]
    DeserializationFailed {
        /// The raw response body, lossily converted to UTF-8
        raw_response: String,
        /// The strategy that was applied
        strategy: DecodeStrategy,
        /// The HTTP status code
        status: StatusCode,
        /// What the decoder rejected
        source: DecodeError,
    },

    /// Invalid configuration was provided, such as a missing base URL, a bad
    /// header, or an unknown resource version.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err)
        } else {
            Error::Network(err)
        }
    }
}

impl Error {
    /// Returns `true` for failures of the HTTP exchange itself: network
    /// errors, timeouts and non-2xx statuses.
    ///
    /// # Examples
    ///
    /// ```
    /// use demo_api_client::Error;
    /// use http::StatusCode;
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::INTERNAL_SERVER_ERROR,
    ///     raw_response: "Server error".to_string(),
    ///     headers: http::HeaderMap::new(),
    /// };
    ///
    /// assert!(err.is_transport());
    /// assert!(!err.is_decode());
    /// ```
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::Timeout(_) | Error::HttpError { .. }
        )
    }

    /// Returns `true` if a successful response could not be decoded.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::DeserializationFailed { .. })
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> Error {
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        Error::DeserializationFailed {
            raw_response: "x".to_string(),
            strategy: DecodeStrategy::Plain,
            status: StatusCode::OK,
            source: DecodeError::Json(source),
        }
    }

    #[test]
    fn test_classification() {
        let err = decode_error();
        assert!(err.is_decode());
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert_eq!(err.raw_response(), Some("x"));

        let err = Error::ConfigurationError("missing".to_string());
        assert!(!err.is_decode());
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_decode_error_display_names_strategy() {
        let message = decode_error().to_string();
        assert!(message.starts_with("Failed to decode response (status 200 OK, plain decoding)"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;
        assert!(decode_error().source().is_some());
    }
}
