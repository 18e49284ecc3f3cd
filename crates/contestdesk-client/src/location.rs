//! Host page location capability.

/// Read-only view of where the client is running.
pub trait PageLocation: Send + Sync {
    /// Host name of the page, without scheme or port.
    fn hostname(&self) -> String;

    /// Path component of the page URL.
    fn pathname(&self) -> String;
}

/// Location fixed at construction time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticLocation {
    hostname: String,
    pathname: String,
}

impl StaticLocation {
    /// Build a location from a host name and path.
    #[must_use]
    pub fn new(hostname: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pathname: pathname.into(),
        }
    }
}

impl PageLocation for StaticLocation {
    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn pathname(&self) -> String {
        self.pathname.clone()
    }
}
