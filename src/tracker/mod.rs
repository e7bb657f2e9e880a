//! The tracker runs as a native messaging host. The browser forwards tab, focus and idle events
//! over stdin, the tracker turns them into per-site time and syncs it to the log store.
//!
//! Work is split the same way on every run:
//!  - [collection] modules produce [collection::Inbound] messages (browser input, sync ticks).
//!  - [processing] consumes them one by one and owns all the tracker state.

use std::time::Duration;

use anyhow::Result;
use collection::{host_reader::HostReader, sync_timer::SyncTimer, Inbound};
use config::TrackerConfig;
use processing::{host_processor::HostProcessor, tracker::Tracker, ProcessingModule};
use storage::local_store::{JsonFileStore, LocalStore};
use sync::{http::HttpLogStore, LogStore};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::utils::clock::{Clock, DefaultClock};

pub mod args;
pub mod collection;
pub mod config;
pub mod host;
pub mod processing;
pub mod session;
pub mod shutdown;
pub mod storage;
pub mod sync;
pub mod tabs;

const INBOUND_CAPACITY: usize = 64;

/// Represents the starting point for the host.
pub async fn start_tracker(config: TrackerConfig) -> Result<()> {
    let store = JsonFileStore::new(&config.dir)?;
    let log_store = HttpLogStore::new(config.endpoint.clone())?;
    let tracker = Tracker::initialize(store, log_store, Box::new(DefaultClock)).await?;

    let shutdown_token = CancellationToken::new();

    let (_, result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        run_host(
            tracker,
            tokio::io::stdin(),
            tokio::io::stdout(),
            config.sync_period,
            DefaultClock,
            &shutdown_token,
        ),
    );
    result
}

/// Wires the browser stream, the sync timer and the tracker together and runs them until the
/// browser disconnects or `shutdown_token` is cancelled.
async fn run_host<S: LocalStore, L: LogStore>(
    tracker: Tracker<S, L>,
    input: impl AsyncRead + Unpin,
    output: impl AsyncWrite + Unpin,
    sync_period: Duration,
    clock: impl Clock,
    shutdown_token: &CancellationToken,
) -> Result<()> {
    let (sender, receiver) = mpsc::channel::<Inbound>(INBOUND_CAPACITY);

    let reader = HostReader::new(sender.clone(), input, shutdown_token.clone());
    let timer = SyncTimer::new(sender, shutdown_token.clone(), sync_period, Box::new(clock));
    let processor = ProcessingModule::new(receiver, HostProcessor::new(tracker, output));

    let (reader_result, timer_result, processing_result) =
        tokio::join!(reader.run(), timer.run(), processor.run());

    if let Err(reader_result) = reader_result {
        error!("Host reader got an error {:?}", reader_result);
    }

    if let Err(timer_result) = timer_result {
        error!("Sync timer got an error {:?}", timer_result);
    }

    processing_result.inspect_err(|e| error!("Processing module got an error {e:?}"))
}
