use anyhow::Result;
use tokio::{io::AsyncRead, sync::mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::tracker::host::{messages::HostMessage, read_frame};

use super::Inbound;

/// Reads framed messages coming from the browser and passes them on. The browser closing the
/// stream means it no longer needs the host, so end of input shuts everything down.
pub struct HostReader<R> {
    next: mpsc::Sender<Inbound>,
    input: R,
    shutdown: CancellationToken,
}

impl<R: AsyncRead + Unpin> HostReader<R> {
    pub fn new(next: mpsc::Sender<Inbound>, input: R, shutdown: CancellationToken) -> Self {
        Self {
            next,
            input,
            shutdown,
        }
    }

    /// Executes the reader loop.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                frame = read_frame(&mut self.input) => frame,
            };

            let body = match frame {
                Ok(Some(body)) => body,
                Ok(None) => {
                    info!("Browser closed the host stream");
                    self.shutdown.cancel();
                    return Ok(());
                }
                Err(e) => {
                    error!("Host stream is unreadable {e:?}");
                    self.shutdown.cancel();
                    return Err(e);
                }
            };

            match serde_json::from_slice::<HostMessage>(&body) {
                Ok(message) => {
                    debug!("Received {:?}", message);
                    self.next
                        .send(Inbound::Host(message))
                        .await
                        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                }
                Err(e) => {
                    warn!(
                        "Skipping malformed message {}: {e}",
                        String::from_utf8_lossy(&body)
                    )
                }
            }
        }
    }
}
