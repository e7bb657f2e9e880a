use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Origin of a tracked page, e.g. `https://example.com` or `http://localhost:8080`. Only `http`
/// and `https` pages have one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteKey(Arc<str>);

impl SiteKey {
    /// Derives the key for a tab address. Internal pages such as `chrome://extensions`,
    /// `about:blank` or local files are never tracked and yield [None].
    pub fn from_address(address: &str) -> Option<SiteKey> {
        let url = Url::parse(address).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let origin = url.origin();
        if !origin.is_tuple() {
            return None;
        }
        Some(SiteKey(origin.ascii_serialization().into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SiteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SiteKey {
    fn from(value: &str) -> Self {
        SiteKey(value.into())
    }
}

/// The one browsing session being timed right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub site: SiteKey,
    pub started_at: DateTime<Utc>,
}
