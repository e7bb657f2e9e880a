use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use url::Url;

use crate::utils::dir::resolve_application_path;

use super::args::ServeArgs;

/// Resolved configuration of a running tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub dir: PathBuf,
    pub endpoint: Url,
    pub sync_period: Duration,
}

impl TrackerConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self> {
        Ok(Self {
            dir: resolve_application_path(args.dir.clone())?,
            endpoint: args.endpoint.clone(),
            sync_period: Duration::from_secs(args.sync_minutes * 60),
        })
    }
}
