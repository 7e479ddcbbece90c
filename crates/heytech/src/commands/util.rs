//! Shared helpers for command handlers.

use heytech_core::Controller;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Wait until every queued command has reached the device.
pub async fn flush(controller: &Controller) -> Result<(), CliError> {
    let limit = controller.config().timings.data_wait;
    controller.flush(limit).await?;
    Ok(())
}

/// Run discovery and wait until the rest of its batch has been answered.
///
/// Discovery returns once the names are in, while groups, parameter
/// tables and device details are still arriving. The device answers in
/// request order, so a fresh automation status read completes only
/// after every earlier answer was applied.
pub async fn discover_all(controller: &Controller) -> Result<(), CliError> {
    controller.connect().await?;
    controller.run_full_discovery().await?;
    if let Err(e) = controller.read_automation_status().await {
        debug!(error = %e, "no answer after discovery batch");
    }
    Ok(())
}

/// Report a completed action on stderr unless `--quiet`.
pub fn done(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("✓ {message}");
    }
}

/// Join channel numbers for messages: `1, 2, 5`.
pub fn channel_list(channels: &[u16]) -> String {
    channels
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
