//! Immutable client configuration.
//!
//! # Design
//! - Built once at start-up from the host location; never mutated after the
//!   client is constructed.
//! - Certificate verification is always on. Deployments that serve a
//!   self-signed certificate on the bare IP endpoint add their CA as an extra
//!   trust root instead.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::endpoint::resolve_base_url;
use crate::error::{ApiError, ApiResult};
use crate::location::PageLocation;

/// Request timeout applied by the transport to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Configuration for the shared API client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Duration,
    root_certificates: Vec<Vec<u8>>,
}

impl ClientConfig {
    /// Resolve the configuration for the page the client runs in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidPath`] if the selected endpoint is not a URL.
    pub fn for_location(location: &dyn PageLocation) -> ApiResult<Self> {
        let raw = resolve_base_url(location);
        let base_url = Url::parse(raw).map_err(|source| ApiError::InvalidPath {
            path: raw.to_string(),
            source,
        })?;
        Ok(Self::with_base_url(base_url))
    }

    /// Configuration pointing at an explicit base URL.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            base_url,
            default_headers,
            timeout: DEFAULT_TIMEOUT,
            root_certificates: Vec::new(),
        }
    }

    /// Trust an additional PEM-encoded root certificate.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Certificate`] when the PEM cannot be parsed or holds
    /// no certificate.
    pub fn with_root_certificate_pem(mut self, pem: &[u8]) -> ApiResult<Self> {
        parse_pem_bundle(pem)?;
        self.root_certificates.push(pem.to_vec());
        Ok(self)
    }

    /// Replace the transport timeout. Defaults to [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Prefix for every request path.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Transport timeout for each request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the underlying reqwest client.
    pub(crate) fn build_http_client(&self) -> ApiResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers.clone());
        for pem in &self.root_certificates {
            for cert in parse_pem_bundle(pem)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        builder
            .build()
            .map_err(|source| ApiError::ClientBuild { source })
    }
}

fn parse_pem_bundle(pem: &[u8]) -> ApiResult<Vec<reqwest::Certificate>> {
    let certs = reqwest::Certificate::from_pem_bundle(pem).map_err(|source| {
        ApiError::Certificate {
            reason: "unparseable pem",
            source: Some(source),
        }
    })?;
    if certs.is_empty() {
        return Err(ApiError::Certificate {
            reason: "no certificate in pem",
            source: None,
        });
    }
    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{LOCAL_BASE_URL, REMOTE_BASE_URL};
    use crate::location::StaticLocation;

    fn local_config() -> ApiResult<ClientConfig> {
        ClientConfig::for_location(&StaticLocation::new("localhost", "/"))
    }

    #[test]
    fn local_location_resolves_local_backend() -> ApiResult<()> {
        let config = local_config()?;
        assert_eq!(config.base_url().as_str(), format!("{LOCAL_BASE_URL}/"));
        Ok(())
    }

    #[test]
    fn remote_location_resolves_remote_backend() -> ApiResult<()> {
        let config =
            ClientConfig::for_location(&StaticLocation::new("contests.example.org", "/"))?;
        assert_eq!(config.base_url().as_str(), format!("{REMOTE_BASE_URL}/"));
        Ok(())
    }

    #[test]
    fn defaults_carry_json_content_type_and_timeout() -> ApiResult<()> {
        let config = local_config()?;
        assert_eq!(
            config.default_headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(config.default_headers().len(), 1);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.with_timeout(Duration::from_millis(250)).timeout(),
            Duration::from_millis(250)
        );
        Ok(())
    }

    #[test]
    fn pem_without_certificates_is_rejected() -> ApiResult<()> {
        let err = local_config()?
            .with_root_certificate_pem(b"not a certificate")
            .err();
        assert!(matches!(err, Some(ApiError::Certificate { .. })));
        Ok(())
    }

    #[test]
    fn http_client_builds_from_defaults() -> ApiResult<()> {
        assert!(local_config()?.build_http_client().is_ok());
        Ok(())
    }
}
