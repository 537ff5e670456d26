//! Wall-clock timestamps.
//!
//! Objects record `created`/`modified` as seconds since the Unix epoch, which
//! is also how they are persisted (a `bigint` column).

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Returns the current time in epoch seconds.
#[must_use]
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp()
}
