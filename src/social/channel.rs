//! Supported social channels and channel-list resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A third-party destination a post can be published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocialChannel {
    Facebook,
    Instagram,
}

impl SocialChannel {
    pub const ALL: [SocialChannel; 2] = [SocialChannel::Facebook, SocialChannel::Instagram];

    /// Canonical upper-case name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialChannel::Facebook => "FACEBOOK",
            SocialChannel::Instagram => "INSTAGRAM",
        }
    }

    /// Human-readable provider name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            SocialChannel::Facebook => "Facebook",
            SocialChannel::Instagram => "Instagram",
        }
    }

    /// Error code for unexpected provider failures, e.g. `ERR_FACEBOOK`.
    pub fn error_code(&self) -> String {
        format!("ERR_{}", self.as_str())
    }
}

impl fmt::Display for SocialChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown social channel: {0}")]
pub struct UnknownChannel(pub String);

impl FromStr for SocialChannel {
    type Err = UnknownChannel;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        SocialChannel::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

/// Resolve the channels a request targets.
///
/// A present, non-empty `requested` list wins over `defaults`, even when
/// none of its entries are valid: `["TWITTER"]` resolves to nothing rather
/// than falling back. Unknown names are dropped with a warning, duplicates
/// collapse, and first-seen order is kept.
pub fn resolve_channels(requested: Option<&[String]>, defaults: &[String]) -> Vec<SocialChannel> {
    let source = match requested {
        Some(list) if !list.is_empty() => list,
        _ => defaults,
    };

    let mut channels = Vec::with_capacity(source.len());
    for name in source {
        match name.parse::<SocialChannel>() {
            Ok(channel) if !channels.contains(&channel) => channels.push(channel),
            Ok(_) => {}
            Err(_) => tracing::warn!(channel = %name, "dropping unknown social channel"),
        }
    }
    channels
}
