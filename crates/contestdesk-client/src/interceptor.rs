//! Request and response hooks run by [`ApiClient`](crate::ApiClient).
//!
//! # Design
//! - Hooks are synchronous and infallible from the caller's point of view:
//!   a failed token lookup downgrades to an unauthenticated request, and a
//!   failed outcome is always handed back unchanged.
//! - Side effects on 401 (token removal, session signal) happen before the
//!   error is returned so callers observe the cleared state.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, error, warn};

use crate::error::ApiResult;
use crate::location::PageLocation;
use crate::response::ApiResponse;
use crate::session::{SessionEvent, SessionEvents};
use crate::store::{ADMIN_TOKEN_KEY, TokenStore};

const ADMIN_PATH_MARKER: &str = "/admin";

/// Hook run on the outgoing header set before each request is sent.
pub trait RequestInterceptor: Send + Sync {
    /// Inspect or mutate the outgoing headers.
    fn on_request(&self, headers: &mut HeaderMap);
}

/// Hook run on every outcome, successful or not.
pub trait ResponseInterceptor: Send + Sync {
    /// Observe the outcome and pass it on.
    ///
    /// # Errors
    ///
    /// Implementations return the failure they were given; they never
    /// swallow it.
    fn on_response(&self, outcome: ApiResult<ApiResponse>) -> ApiResult<ApiResponse>;
}

/// Attaches `Authorization: Bearer <token>` when the store holds a token.
pub struct BearerTokenInterceptor {
    store: Arc<dyn TokenStore>,
    key: &'static str,
}

impl BearerTokenInterceptor {
    /// Interceptor reading the admin token from `store`.
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            key: ADMIN_TOKEN_KEY,
        }
    }

    fn header_value(&self) -> Option<HeaderValue> {
        let token = match self.store.get(self.key) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, key = self.key, "token lookup failed; sending request without credentials");
                return None;
            }
        };

        let token = token.trim();
        if token.is_empty() {
            debug!(key = self.key, "stored token is blank; ignoring");
            return None;
        }

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(err) => {
                warn!(error = %err, key = self.key, "stored token is not a valid header value; ignoring");
                None
            }
        }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn on_request(&self, headers: &mut HeaderMap) {
        if let Some(value) = self.header_value() {
            headers.insert(AUTHORIZATION, value);
        }
    }
}

/// Clears the admin token on 401 and signals session expiry on admin pages.
pub struct UnauthorizedInterceptor {
    store: Arc<dyn TokenStore>,
    key: &'static str,
    location: Arc<dyn PageLocation>,
    events: SessionEvents,
}

impl UnauthorizedInterceptor {
    /// Interceptor clearing the admin token from `store`.
    #[must_use]
    pub fn new(
        store: Arc<dyn TokenStore>,
        location: Arc<dyn PageLocation>,
        events: SessionEvents,
    ) -> Self {
        Self {
            store,
            key: ADMIN_TOKEN_KEY,
            location,
            events,
        }
    }

    fn expire_session(&self) {
        if let Err(err) = self.store.delete(self.key) {
            warn!(error = %err, key = self.key, "failed to clear rejected token");
        }

        let path = self.location.pathname();
        if path.contains(ADMIN_PATH_MARKER) {
            let event = SessionEvent::Expired { path };
            let kind = event.kind();
            let receivers = self.events.publish(event);
            debug!(event = kind, receivers, "published session event");
        }
    }
}

impl ResponseInterceptor for UnauthorizedInterceptor {
    fn on_response(&self, outcome: ApiResult<ApiResponse>) -> ApiResult<ApiResponse> {
        let err = match outcome {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if err.is_unauthorized() {
            self.expire_session();
        }
        error!(error = %err, status = ?err.status(), "api request failed");
        Err(err)
    }
}
