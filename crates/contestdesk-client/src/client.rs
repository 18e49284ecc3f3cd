//! Shared API client and its interceptor pipeline.
//!
//! # Design
//! - Create exactly one client per process and share it by cloning; clones
//!   share the connection pool and the interceptor chain.
//! - Every request runs: request interceptors, transport, body read, status
//!   classification, response interceptors. Transport failures (including a
//!   body that stalls past the timeout) and 4xx/5xx statuses reach the
//!   response interceptors as the same `Err` path.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::contests::ContestsApi;
use crate::error::{ApiError, ApiResult};
use crate::interceptor::{
    BearerTokenInterceptor, RequestInterceptor, ResponseInterceptor, UnauthorizedInterceptor,
};
use crate::location::PageLocation;
use crate::response::ApiResponse;
use crate::session::SessionEvents;
use crate::store::TokenStore;

/// HTTP client bound to the contest backend.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    base_url: Url,
    request_hooks: Arc<[Arc<dyn RequestInterceptor>]>,
    response_hooks: Arc<[Arc<dyn ResponseInterceptor>]>,
}

impl ApiClient {
    /// Build the client with the standard hooks: bearer token on the way out,
    /// unauthorized handling on the way back.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn TokenStore>,
        location: Arc<dyn PageLocation>,
        events: SessionEvents,
    ) -> ApiResult<Self> {
        Self::builder(config)
            .with_session(store, location, events)
            .build()
    }

    /// Start a builder with no interceptors installed.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            request_hooks: Vec::new(),
            response_hooks: Vec::new(),
        }
    }

    /// Configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Contest endpoints.
    #[must_use]
    pub const fn contests(&self) -> ContestsApi<'_> {
        ContestsApi::new(self)
    }

    /// Send a request through the interceptor pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidPath`] without sending anything when `path`
    /// cannot be joined onto the base URL. Transport failures and error
    /// statuses are returned after the response interceptors have seen them.
    #[instrument(name = "api_client.execute", skip(self, body))]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<ApiResponse> {
        let url = self.endpoint(path)?;

        let mut headers = HeaderMap::new();
        for hook in self.request_hooks.iter() {
            hook.on_request(&mut headers);
        }

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let outcome = match fetch(request).await {
            Ok(response) => classify(response),
            Err(source) => Err(ApiError::Transport {
                method,
                path: path.to_string(),
                source,
            }),
        };
        if let Ok(response) = &outcome {
            debug!(status = %response.status(), "api request completed");
        }

        self.response_hooks
            .iter()
            .fold(outcome, |outcome, hook| hook.on_response(outcome))
    }

    /// `GET` a JSON document.
    ///
    /// # Errors
    ///
    /// Propagates request failures and returns [`ApiError::Decode`] when the
    /// body does not match `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.execute(Method::GET, path, None).await?;
        decode(path, &response)
    }

    /// Send a JSON body and decode a JSON reply.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] when `body` cannot be serialised, and
    /// otherwise behaves like [`ApiClient::get_json`].
    pub async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            path: path.to_string(),
            source,
        })?;
        let response = self.execute(method, path, Some(&payload)).await?;
        decode(path, &response)
    }

    /// `DELETE` a resource, ignoring any reply body.
    ///
    /// # Errors
    ///
    /// Propagates request failures.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }
}

/// Builder for [`ApiClient`] with a custom interceptor chain.
pub struct ApiClientBuilder {
    config: ClientConfig,
    request_hooks: Vec<Arc<dyn RequestInterceptor>>,
    response_hooks: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClientBuilder {
    /// Append a request interceptor; interceptors run in insertion order.
    #[must_use]
    pub fn request_interceptor(mut self, hook: impl RequestInterceptor + 'static) -> Self {
        self.request_hooks.push(Arc::new(hook));
        self
    }

    /// Append a response interceptor; interceptors run in insertion order.
    #[must_use]
    pub fn response_interceptor(mut self, hook: impl ResponseInterceptor + 'static) -> Self {
        self.response_hooks.push(Arc::new(hook));
        self
    }

    /// Install the standard session hooks: bearer token from `store` on every
    /// request, token removal and session expiry on 401.
    #[must_use]
    pub fn with_session(
        self,
        store: Arc<dyn TokenStore>,
        location: Arc<dyn PageLocation>,
        events: SessionEvents,
    ) -> Self {
        self.request_interceptor(BearerTokenInterceptor::new(Arc::clone(&store)))
            .response_interceptor(UnauthorizedInterceptor::new(store, location, events))
    }

    /// Construct the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] or [`ApiError::Certificate`] if the
    /// transport cannot be initialised.
    pub fn build(self) -> ApiResult<ApiClient> {
        let http = self.config.build_http_client()?;
        let base_url = directory_url(self.config.base_url());
        Ok(ApiClient {
            http,
            config: Arc::new(self.config),
            base_url,
            request_hooks: self.request_hooks.into(),
            response_hooks: self.response_hooks.into(),
        })
    }
}

/// Ensure relative joins append to the base path instead of replacing its
/// last segment.
fn directory_url(base: &Url) -> Url {
    let mut url = base.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Send the request and read the whole body, so a body that stalls past the
/// timeout or is cut short fails like any other transport error.
async fn fetch(request: RequestBuilder) -> reqwest::Result<ApiResponse> {
    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?;
    Ok(ApiResponse::new(status, headers, body.to_vec()))
}

fn classify(response: ApiResponse) -> ApiResult<ApiResponse> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(ApiError::Status {
            status,
            body: response.text().into_owned(),
        });
    }
    Ok(response)
}

fn decode<T: DeserializeOwned>(path: &str, response: &ApiResponse) -> ApiResult<T> {
    response.json::<T>().map_err(|source| ApiError::Decode {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn directory_url_appends_trailing_slash() -> Result<()> {
        let bare = Url::parse("http://localhost:8000")?;
        assert_eq!(directory_url(&bare).as_str(), "http://localhost:8000/");

        let prefixed = Url::parse("https://example.org/api")?;
        let dir = directory_url(&prefixed);
        assert_eq!(dir.as_str(), "https://example.org/api/");
        assert_eq!(
            dir.join("contests")?.as_str(),
            "https://example.org/api/contests"
        );
        Ok(())
    }

    #[test]
    fn endpoint_joins_relative_and_absolute_paths() -> Result<()> {
        let config = ClientConfig::with_base_url(Url::parse("https://example.org/api")?);
        let client = ApiClient::builder(config).build()?;
        assert_eq!(
            client.endpoint("/contests/3")?.as_str(),
            "https://example.org/api/contests/3"
        );
        assert_eq!(
            client.endpoint("contests/year/2024")?.as_str(),
            "https://example.org/api/contests/year/2024"
        );
        Ok(())
    }

    #[test]
    fn clones_share_configuration() -> Result<()> {
        let config = ClientConfig::with_base_url(Url::parse("http://localhost:8000")?);
        let client = ApiClient::builder(config).build()?;
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.config, &clone.config));
        Ok(())
    }
}
