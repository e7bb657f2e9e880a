use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tracker::session::SiteKey;

/// Whole seconds accumulated per site.
pub type TimeLogs = BTreeMap<SiteKey, u64>;

/// Layout of the storage file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub time_logs: TimeLogs,
}

impl StorageDocument {
    pub fn add_time(&mut self, site: &SiteKey, seconds: u64) -> u64 {
        let total = self.time_logs.entry(site.clone()).or_insert(0);
        *total = total.saturating_add(seconds);
        *total
    }
}
