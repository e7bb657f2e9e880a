//! Tracks how much time is spent on each website. The browser extension forwards tab, focus and
//! idle events to a native messaging host, which accumulates per-site time locally and syncs it
//! to a remote log store.
//!

pub mod cli;
pub mod tracker;
pub mod utils;
