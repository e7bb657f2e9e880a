//! Producers of tracker work. Each of them feeds the same channel, so the
//! [processing](super::processing) side sees one ordered stream of [Inbound] messages.

pub mod host_reader;
pub mod sync_timer;

use super::host::messages::HostMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A message forwarded by the browser.
    Host(HostMessage),
    /// Time to push accumulated logs to the log store.
    SyncTick,
}
