use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels the tracker on Ctrl-C. Returns early if something else already cancelled it, such as
/// the browser closing the host stream.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {}
    };
}
