use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::utils::clock::Clock;

use super::Inbound;

pub const DEFAULT_SYNC_PERIOD: Duration = Duration::from_secs(60);

/// Periodically asks the processing side to sync. Ticks go through the same channel as browser
/// messages, so a sync never overlaps with event handling.
pub struct SyncTimer {
    next: mpsc::Sender<Inbound>,
    shutdown: CancellationToken,
    period: Duration,
    time_provider: Box<dyn Clock>,
}

impl SyncTimer {
    pub fn new(
        next: mpsc::Sender<Inbound>,
        shutdown: CancellationToken,
        period: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            shutdown,
            period,
            time_provider,
        }
    }

    /// Executes the timer loop.
    pub async fn run(self) -> Result<()> {
        let mut sync_point = self.time_provider.instant();
        loop {
            sync_point += self.period;

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = self.time_provider.sleep_until(sync_point) => ()
            }

            debug!("Sync tick");
            self.next
                .send(Inbound::SyncTick)
                .await
                .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use tokio::{sync::mpsc, time::Instant};
    use tokio_util::sync::CancellationToken;

    use crate::{
        tracker::collection::Inbound,
        utils::clock::DefaultClock,
    };

    use super::SyncTimer;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() -> Result<()> {
        let (sender, mut receiver) = mpsc::channel(10);
        let shutdown = CancellationToken::new();
        let timer = SyncTimer::new(
            sender,
            shutdown.clone(),
            Duration::from_secs(60),
            Box::new(DefaultClock),
        );
        let start = Instant::now();

        let (result, _) = tokio::join!(timer.run(), async {
            assert_eq!(receiver.recv().await, Some(Inbound::SyncTick));
            assert_eq!(start.elapsed(), Duration::from_secs(60));
            assert_eq!(receiver.recv().await, Some(Inbound::SyncTick));
            assert_eq!(start.elapsed(), Duration::from_secs(120));
            shutdown.cancel();
        });

        result?;
        assert_eq!(receiver.recv().await, None);
        Ok(())
    }
}
