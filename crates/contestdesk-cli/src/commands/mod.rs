//! Command handlers grouped by concern.

pub(crate) mod contests;
pub(crate) mod token;
