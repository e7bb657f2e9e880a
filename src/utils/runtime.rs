use std::{future::Future, time::Duration};

use anyhow::Result;

/// How long to wait for blocking reads still in flight when the runtime shuts down.
const BLOCKING_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Runs `future` to completion on a fresh current-thread runtime. Blocking reads that are
/// still pending afterwards (stdin never returns on its own) are abandoned on shutdown.
pub fn run_abandoning_blocking<T>(future: impl Future<Output = T>) -> Result<T> {
    let runtime = single_thread_runtime()?;
    let output = runtime.block_on(future);
    runtime.shutdown_timeout(BLOCKING_SHUTDOWN_TIMEOUT);
    Ok(output)
}
