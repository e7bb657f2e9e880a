use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use url::Url;

use super::sync::http::DEFAULT_ENDPOINT;

/// Options of the host process. The browser launches the host without options, so every one of
/// them can also come from the environment.
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(
        long,
        env = "TABTALLY_DIR",
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub dir: Option<PathBuf>,
    #[arg(long, env = "TABTALLY_ENDPOINT", default_value = DEFAULT_ENDPOINT, help = "Log store endpoint receiving synced logs")]
    pub endpoint: Url,
    #[arg(
        long = "sync-minutes",
        env = "TABTALLY_SYNC_MINUTES",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Minutes between syncs with the log store"
    )]
    pub sync_minutes: u64,
    /// This option is for debugging purposes only. Logs go to stderr, stdout belongs to the
    /// browser.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter", env = "TABTALLY_LOG")]
    pub log_filter: Option<LevelFilter>,
}

/// Arguments the browser passes when it launches a native messaging host.
#[derive(Parser, Debug)]
#[command(name = "tabtally-host", version, about = "Native messaging host of tabtally")]
pub struct HostArgs {
    /// Origin of the extension that started the host, e.g. chrome-extension://<id>/
    pub origin: Option<String>,
    /// Handle of the calling window, passed on Windows only.
    #[arg(long = "parent-window")]
    pub parent_window: Option<String>,
    #[command(flatten)]
    pub serve: ServeArgs,
}
