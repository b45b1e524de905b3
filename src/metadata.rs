//! Request metadata and configuration types.

use http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Metadata for an individual HTTP request.
///
/// The query string is kept exactly as given and sent without re-encoding,
/// so values like `limit=0,5` reach the server byte for byte.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: Method,

    /// The request path (relative to the base URL).
    pub path: String,

    /// Raw query string, without the leading `?`.
    pub query: Option<String>,

    /// Additional headers for this request.
    pub headers: HeaderMap,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` from a method and a path that may
    /// carry a query string.
    ///
    /// # Examples
    ///
    /// ```
    /// use demo_api_client::metadata::RequestMetadata;
    /// use http::Method;
    ///
    /// let request = RequestMetadata::new(Method::GET, "/api/v2/items?limit=0,10");
    /// assert_eq!(request.path, "/api/v2/items");
    /// assert_eq!(request.query.as_deref(), Some("limit=0,10"));
    /// ```
    pub fn new(method: Method, path_and_query: impl AsRef<str>) -> Self {
        let (path, query) = match path_and_query.as_ref().split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.as_ref().to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Result<Self, crate::Error> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a header known at compile time.
    pub fn with_static_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }
}

impl Default for RequestMetadata {
    fn default() -> Self {
        Self::new(Method::GET, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_without_query() {
        let request = RequestMetadata::new(Method::GET, "/api/v1/users");
        assert_eq!(request.path, "/api/v1/users");
        assert!(request.query.is_none());
    }

    #[test]
    fn test_invalid_header_is_a_configuration_error() {
        let result = RequestMetadata::default().with_header("bad header", "x");
        assert!(matches!(result, Err(crate::Error::ConfigurationError(_))));

        let request = RequestMetadata::default()
            .with_header("x-trace", "abc")
            .unwrap();
        assert_eq!(request.headers.get("x-trace").unwrap(), "abc");
    }
}
