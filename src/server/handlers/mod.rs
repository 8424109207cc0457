pub mod health;
pub mod hello;
pub mod social;

use chrono::{SecondsFormat, Utc};

/// RFC 3339 UTC timestamp with millisecond precision.
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
