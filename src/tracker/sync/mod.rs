//! Transfer of accumulated time to the remote log store. The store appends whatever it
//! receives, so a batch that was sent but not confirmed may arrive twice. Local totals are only
//! dropped after the store acknowledged them.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::storage::entities::TimeLogs;

/// One line of the remote log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub url: String,
    pub time_spent: u64,
    /// Time of the sync that carried the entry, not the time the browsing happened.
    pub date: DateTime<Utc>,
}

/// Body of `POST /api/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogBatch {
    pub user_id: String,
    pub logs: Vec<LogEntry>,
}

impl LogBatch {
    pub fn from_time_logs(user_id: String, time_logs: &TimeLogs, date: DateTime<Utc>) -> Self {
        Self {
            user_id,
            logs: time_logs
                .iter()
                .map(|(site, seconds)| LogEntry {
                    url: site.to_string(),
                    time_spent: *seconds,
                    date,
                })
                .collect(),
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.logs.iter().map(|entry| entry.time_spent).sum()
    }
}

/// Everything the store holds for a user, as returned by `GET /api/logs/:userId`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLogs {
    pub user_id: String,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending, the store wasn't contacted.
    Empty,
    Sent { sites: usize, seconds: u64 },
}

/// Remote collection of logs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Appends a batch to the user's logs. Succeeds only if the store acknowledged it.
    async fn submit(&self, batch: &LogBatch) -> Result<()>;

    /// Retrieves the user's logs, [None] if the store has nothing for them.
    async fn fetch(&self, user_id: &str) -> Result<Option<UserLogs>>;
}
