//! Client wiring, error types, and the request-id hook for the CLI.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use contestdesk_client::{
    ApiClient, ApiError, ClientConfig, FileStore, RequestInterceptor, SessionEvents,
    SessionStream, StaticLocation, StoreError,
};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use url::Url;

use crate::cli::Cli;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation {
                field,
                reason,
                value,
            } => Self::validation(match value {
                Some(value) => format!("{field} {reason} (got '{value}')"),
                None => format!("{field} {reason}"),
            }),
            ApiError::Status { status, body } => classify_status(status, &body),
            other => Self::failure(other),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        Self::failure(err)
    }
}

/// Map an error status from the backend onto a CLI error.
fn classify_status(status: StatusCode, body: &str) -> CliError {
    let detail = problem_detail(body);
    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        return CliError::validation(detail.unwrap_or_else(|| format!("request rejected ({status})")));
    }
    if status == StatusCode::UNAUTHORIZED {
        return CliError::failure(anyhow!(
            "{} (status {status}); run `contestdesk token set <token>` to sign in",
            detail.unwrap_or_else(|| "admin token missing or rejected".to_string())
        ));
    }
    match detail {
        Some(detail) => CliError::failure(anyhow!("{detail} (status {status})")),
        None if !body.trim().is_empty() => {
            CliError::failure(anyhow!("{} (status {status})", body.trim()))
        }
        None => CliError::failure(anyhow!("request failed with status {status}")),
    }
}

/// Extract the `detail` field of a backend error body. Validation failures
/// carry a list of `{loc, msg}` entries instead of a string.
fn problem_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(serde_json::Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(serde_json::Value::as_str);
                    Some(field.map_or_else(|| msg.to_string(), |field| format!("{field}: {msg}")))
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Tags every request with the invocation's trace identifier.
pub(crate) struct RequestIdInterceptor {
    value: HeaderValue,
}

impl RequestIdInterceptor {
    pub(crate) fn new(trace_id: &str) -> CliResult<Self> {
        let value = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        Ok(Self { value })
    }
}

impl RequestInterceptor for RequestIdInterceptor {
    fn on_request(&self, headers: &mut HeaderMap) {
        headers.insert(HEADER_REQUEST_ID, self.value.clone());
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: ApiClient,
    pub(crate) store: FileStore,
}

impl AppContext {
    /// Build the single API client for this invocation.
    ///
    /// The returned stream receives session events raised while commands run.
    pub(crate) fn from_cli(cli: &Cli, trace_id: &str) -> CliResult<(Self, SessionStream)> {
        let location = StaticLocation::new(cli.host.clone(), cli.page_path.clone());
        let mut config = match &cli.api_url {
            Some(url) => ClientConfig::with_base_url(url.clone()),
            None => ClientConfig::for_location(&location)?,
        };
        if let Some(path) = &cli.ca_cert {
            let pem = fs::read(path)
                .with_context(|| format!("failed to read CA certificate {}", path.display()))
                .map_err(CliError::failure)?;
            config = config.with_root_certificate_pem(&pem)?;
        }

        let store = FileStore::new(&cli.token_store);
        let events = SessionEvents::new();
        let stream = events.subscribe();
        let client = ApiClient::builder(config)
            .request_interceptor(RequestIdInterceptor::new(trace_id)?)
            .with_session(Arc::new(store.clone()), Arc::new(location), events)
            .build()?;

        tracing::debug!(
            base_url = %client.config().base_url(),
            store = %store.path().display(),
            "api client configured"
        );
        Ok((Self { client, store }, stream))
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}
