use anyhow::Result;
use module::EventProcessor;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error, info_span, Instrument};

use super::collection::Inbound;

pub mod host_processor;
pub mod module;
pub mod tracker;

/// Single consumer of everything the collection side produces. Because messages are handled
/// strictly one after another, the tracker state needs no further synchronization.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<Inbound>,
    processor: Processor,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<Inbound>, processor: P) -> Self {
        Self {
            receiver,
            processor,
        }
    }

    /// Runs until every producer is gone, then lets the processor finish up.
    pub async fn run(mut self) -> Result<()> {
        while let Some(message) = self.receiver.recv().await {
            debug!("Processing {:?}", message);
            let span = info_span!("Processing inbound message");
            if let Err(e) = self
                .processor
                .process_next(message.clone())
                .instrument(span)
                .await
            {
                error!("Error processing {:?}: {e:?}", message)
            }
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}
