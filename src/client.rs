//! HTTP client for the versioned DTO endpoints.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to
//! configure and create clients.

use crate::{
    decode::{self, DecodeStrategy},
    dto::{Dto, ItemV1, ItemV2, Records, UserV1, UserV2, UserV3, UserV4},
    endpoint::{Endpoint, Resource},
    metadata::RequestMetadata,
    Error, Response, Result,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// A client for the demo API.
///
/// Every call issues exactly one GET request and decodes the whole body into
/// an ordered `Vec` of DTOs. There are no retries: transport and decode
/// failures are returned to the caller on first occurrence.
///
/// The client is cheap to clone and can be shared between tasks. It never
/// issues requests concurrently on its own.
///
/// # Examples
///
/// ```no_run
/// use demo_api_client::Client;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), demo_api_client::Error> {
/// let client = Client::builder()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// for user in client.get_users_v4().await? {
///     println!("{} {} has {} addresses", user.first_name, user.last_name, user.addresses.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Sends one request and decodes the body with `strategy`.
    ///
    /// Every other method ends up here.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use demo_api_client::{dto::ItemV2, metadata::RequestMetadata, Client, DecodeStrategy};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), demo_api_client::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "/api/v2/items?limit=0,50");
    /// let items = client.call::<ItemV2>(metadata, DecodeStrategy::Plain).await?;
    /// println!("Fetched {} items", items.data.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<T>(
        &self,
        metadata: RequestMetadata,
        strategy: DecodeStrategy,
    ) -> Result<Response<Vec<T>>>
    where
        T: DeserializeOwned,
    {
        let start_time = Instant::now();

        let result = match self.execute_request(&metadata).await {
            Ok(response) => {
                let latency = start_time.elapsed();
                self.parse_response(response, strategy, latency).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::warn!(
                error = %e,
                method = %metadata.method,
                path = %metadata.path,
                "Request failed"
            );
        }

        result
    }

    /// Fetches a table endpoint, decoding into the caller's type.
    pub async fn fetch_endpoint<T>(&self, endpoint: Endpoint) -> Result<Response<Vec<T>>>
    where
        T: DeserializeOwned,
    {
        self.call(endpoint.request(), endpoint.strategy()).await
    }

    /// Fetches the JSON endpoint serving `T`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use demo_api_client::{dto::ItemV2, Client};
    ///
    /// # async fn example() -> Result<(), demo_api_client::Error> {
    /// let client = Client::builder()
    ///     .base_url("https://api.example.com")?
    ///     .build()?;
    ///
    /// let items = client.fetch::<ItemV2>().await?;
    /// println!("{} items in {:?}", items.len(), items.latency);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch<T: Dto>(&self) -> Result<Response<Vec<T>>> {
        self.fetch_endpoint(T::ENDPOINT).await
    }

    /// Fetches a resource version chosen at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] without sending anything when
    /// no JSON endpoint serves `resource` at `version`.
    pub async fn fetch_records(&self, resource: Resource, version: u8) -> Result<Records> {
        let endpoint = Endpoint::lookup(resource, version).ok_or_else(|| {
            Error::ConfigurationError(format!(
                "No endpoint for {} at schema version {}",
                resource, version
            ))
        })?;

        self.fetch_any(endpoint).await
    }

    /// Fetches any table endpoint, including the legacy one, into the
    /// matching [`Records`] variant.
    pub async fn fetch_any(&self, endpoint: Endpoint) -> Result<Records> {
        Ok(match endpoint {
            Endpoint::UsersV1 => Records::UsersV1(self.fetch_endpoint(endpoint).await?.data),
            Endpoint::UsersV2 => Records::UsersV2(self.fetch_endpoint(endpoint).await?.data),
            Endpoint::UsersV3 => Records::UsersV3(self.fetch_endpoint(endpoint).await?.data),
            Endpoint::UsersV4 => Records::UsersV4(self.fetch_endpoint(endpoint).await?.data),
            Endpoint::ItemsV1 | Endpoint::ItemsV1Legacy => {
                Records::ItemsV1(self.fetch_endpoint(endpoint).await?.data)
            }
            Endpoint::ItemsV2 => Records::ItemsV2(self.fetch_endpoint(endpoint).await?.data),
        })
    }

    /// Fetches v1 items in the legacy `application/vnd.demo.dto` format.
    pub async fn fetch_legacy_items(&self) -> Result<Response<Vec<ItemV1>>> {
        self.fetch_endpoint(Endpoint::ItemsV1Legacy).await
    }

    /// `GET /api/v1/users`
    pub async fn get_users_v1(&self) -> Result<Vec<UserV1>> {
        Ok(self.fetch::<UserV1>().await?.into_data())
    }

    /// `GET /api/v2/users`
    pub async fn get_users_v2(&self) -> Result<Vec<UserV2>> {
        Ok(self.fetch::<UserV2>().await?.into_data())
    }

    /// `GET /api/v3/users`
    pub async fn get_users_v3(&self) -> Result<Vec<UserV3>> {
        Ok(self.fetch::<UserV3>().await?.into_data())
    }

    /// `GET /api/v4/users`, with nested addresses and roles.
    pub async fn get_users_v4(&self) -> Result<Vec<UserV4>> {
        Ok(self.fetch::<UserV4>().await?.into_data())
    }

    /// `GET /api/v1/items?limit=0,5`
    pub async fn get_items_v1(&self) -> Result<Vec<ItemV1>> {
        Ok(self.fetch::<ItemV1>().await?.into_data())
    }

    /// `GET /api/v1/items?limit=0,5` with `Accept: application/vnd.demo.dto`.
    ///
    /// The body is read by [`crate::legacy`], which never instantiates types
    /// named inside the payload.
    pub async fn get_items_v1_php(&self) -> Result<Vec<ItemV1>> {
        Ok(self.fetch_legacy_items().await?.into_data())
    }

    /// `GET /api/v2/items?limit=0,10`
    pub async fn get_items_v2(&self) -> Result<Vec<ItemV2>> {
        Ok(self.fetch::<ItemV2>().await?.into_data())
    }

    /// Resolves a request path against the base URL, keeping any path prefix
    /// the base URL carries.
    fn url_for(&self, metadata: &RequestMetadata) -> Url {
        let mut url = self.inner.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            metadata.path.trim_start_matches('/')
        );
        url.set_path(&path);
        url.set_query(metadata.query.as_deref());
        url
    }

    async fn execute_request(&self, metadata: &RequestMetadata) -> Result<reqwest::Response> {
        let url = self.url_for(metadata);

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            "Executing HTTP request"
        );

        let mut headers = self.inner.default_headers.clone();
        for (name, value) in &metadata.headers {
            headers.insert(name.clone(), value.clone());
        }

        let mut request = self
            .inner
            .http_client
            .request(metadata.method.clone(), url)
            .headers(headers);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;

        Ok(response)
    }

    async fn parse_response<T>(
        &self,
        response: reqwest::Response,
        strategy: DecodeStrategy,
        latency: Duration,
    ) -> Result<Response<Vec<T>>>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let headers = response.headers().clone();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        if !status.is_success() {
            let raw_response = response.text().await.unwrap_or_default();

            if status.is_client_error() {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Client error (4xx)"
                );
            } else if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    response = %raw_response,
                    "Server error (5xx)"
                );
            }

            return Err(Error::HttpError {
                status,
                raw_response,
                headers,
            });
        }

        let raw_body = response.bytes().await?.to_vec();

        match decode::decode_sequence::<T>(strategy, &raw_body) {
            Ok(data) => {
                tracing::debug!(records = data.len(), strategy = %strategy, "Decoded response");
                Ok(Response::new(data, raw_body, status, headers, latency))
            }
            Err(source) => {
                let raw_response = String::from_utf8_lossy(&raw_body).into_owned();

                tracing::error!(
                    error = %source,
                    strategy = %strategy,
                    raw_response = %raw_response,
                    "Failed to decode response"
                );

                Err(Error::DeserializationFailed {
                    raw_response,
                    strategy,
                    status,
                    source,
                })
            }
        }
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use demo_api_client::ClientBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), demo_api_client::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// Endpoint-specific headers such as the legacy `Accept` take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, if the base URL cannot
    /// carry a path, or if the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
