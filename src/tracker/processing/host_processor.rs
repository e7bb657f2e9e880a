use anyhow::Result;
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::tracker::{
    collection::Inbound,
    host::{messages::HostMessage, write_frame},
    storage::local_store::LocalStore,
    sync::LogStore,
};

use super::{module::EventProcessor, tracker::Tracker};

/// Bridges the inbound stream and the [Tracker]. Replies to control messages are framed back to
/// the browser through `output`.
pub struct HostProcessor<S: LocalStore, L: LogStore, W> {
    tracker: Tracker<S, L>,
    output: W,
}

impl<S: LocalStore, L: LogStore, W: AsyncWrite + Unpin> HostProcessor<S, L, W> {
    pub fn new(tracker: Tracker<S, L>, output: W) -> Self {
        Self { tracker, output }
    }
}

impl<S: LocalStore, L: LogStore, W: AsyncWrite + Unpin> EventProcessor for HostProcessor<S, L, W> {
    async fn process_next(&mut self, message: Inbound) -> Result<()> {
        match message {
            Inbound::Host(HostMessage::Event(event)) => self.tracker.dispatch(event).await,
            Inbound::Host(HostMessage::Control(control)) => {
                let reply = self.tracker.control(control).await;
                debug!("Replying {:?}", reply);
                write_frame(&mut self.output, &reply).await
            }
            Inbound::SyncTick => {
                self.tracker.flush().await?;
                Ok(())
            }
        }
    }

    async fn finalize(&mut self) -> Result<()> {
        info!("Shutting down tracker");
        self.tracker.finalize().await
    }
}
