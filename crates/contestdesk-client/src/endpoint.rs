//! Base URL selection.
//!
//! The choice is binary: loopback host names talk to the local development
//! server, everything else talks to the deployed backend over TLS.

use crate::location::PageLocation;

/// Backend used while the front-end is served from the developer's machine.
pub const LOCAL_BASE_URL: &str = "http://localhost:8000";

/// Deployed backend.
pub const REMOTE_BASE_URL: &str = "https://98.70.34.119:8000";

const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Select the base URL for the given host name.
///
/// Only exact matches on `localhost` and `127.0.0.1` select the local backend.
#[must_use]
pub fn base_url_for_host(hostname: &str) -> &'static str {
    if LOCAL_HOSTS.contains(&hostname) {
        LOCAL_BASE_URL
    } else {
        REMOTE_BASE_URL
    }
}

/// Select the base URL for the page the client is running in.
#[must_use]
pub fn resolve_base_url(location: &dyn PageLocation) -> &'static str {
    base_url_for_host(&location.hostname())
}
