//! Logging setup
//!
//! The library only emits `tracing` events; hosts that have no subscriber of
//! their own can install a plain formatter with [`init`].

use tracing::subscriber::SetGlobalDefaultError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Install a global formatting subscriber at `level`.
///
/// Fails if a global subscriber is already set.
pub fn init(level: Level) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
