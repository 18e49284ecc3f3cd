#![forbid(unsafe_code)]
#![deny(unused_must_use, rustdoc::broken_intra_doc_links, rustdoc::bare_urls)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

//! HTTP client for the contest backend API.
//!
//! Layout:
//! - `endpoint.rs`: base URL selection from the host name
//! - `config.rs`: immutable client configuration (base URL, headers, timeout, TLS roots)
//! - `client.rs`: the shared client and its interceptor pipeline
//! - `interceptor.rs`: bearer-token and unauthorized-response hooks
//! - `response.rs`: buffered response seen by response hooks
//! - `store.rs`: key-value token store capability
//! - `location.rs`: host page location capability
//! - `session.rs`: session-expired broadcast
//! - `contests.rs`: typed contest endpoints

pub mod client;
pub mod config;
pub mod contests;
pub mod endpoint;
pub mod error;
pub mod interceptor;
pub mod location;
pub mod response;
pub mod session;
pub mod store;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use contests::{ClassLevel, Contest, ContestCreate, ContestUpdate, ContestsApi, Solution};
pub use endpoint::{LOCAL_BASE_URL, REMOTE_BASE_URL, base_url_for_host};
pub use error::{ApiError, ApiResult, StoreError, StoreResult};
pub use interceptor::{
    BearerTokenInterceptor, RequestInterceptor, ResponseInterceptor, UnauthorizedInterceptor,
};
pub use location::{PageLocation, StaticLocation};
pub use response::ApiResponse;
pub use session::{SessionEvent, SessionEvents, SessionStream};
pub use store::{ADMIN_TOKEN_KEY, FileStore, MemoryStore, TokenStore};
