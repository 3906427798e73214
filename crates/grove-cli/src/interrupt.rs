//! Ctrl-C handling
//!
//! The first interrupt cancels the run between files and lets the file in
//! flight finish. A second interrupt asks for the process to exit at once.

use std::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Exit status after a forced interrupt (128 + SIGINT)
pub const FORCED_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// A second signal arrived after the run was cancelled
    Forced,
    /// The signal source failed; no further interrupts will be seen
    Unavailable,
}

/// Wait for interrupts from `next_signal`, cancelling `cancel` on the first.
///
/// Returns once a second interrupt arrives or the source fails.
pub async fn watch<F, Fut>(mut next_signal: F, cancel: CancellationToken) -> Interrupt
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    let mut received = 0usize;
    loop {
        if let Err(e) = next_signal().await {
            warn!(error = %e, "cannot listen for interrupts");
            return Interrupt::Unavailable;
        }
        received += 1;
        if received > 1 {
            warn!("second interrupt received, exiting");
            return Interrupt::Forced;
        }
        warn!("interrupt received, stopping after the current file (Ctrl-C again to exit now)");
        cancel.cancel();
    }
}
