use anyhow::Result;

use crate::tracker::collection::Inbound;

/// Represents the consumer of [Inbound] messages. Implementations get messages one at a time, in
/// the order they were produced.
pub trait EventProcessor {
    fn process_next(&mut self, message: Inbound) -> impl std::future::Future<Output = Result<()>>;

    fn finalize(&mut self) -> impl std::future::Future<Output = Result<()>>;
}
