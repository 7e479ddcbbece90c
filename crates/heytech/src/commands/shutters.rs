//! Shutter command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use heytech_core::{Controller, Shutter, ShutterPositions};

use crate::cli::{GlobalOpts, ShuttersArgs, ShuttersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// A named shutter joined with its last known position.
#[derive(Debug, Serialize)]
struct ShutterView {
    channel: u16,
    name: String,
    position: Option<u8>,
}

impl ShutterView {
    fn new(shutter: &Arc<Shutter>, positions: &ShutterPositions) -> Self {
        Self {
            channel: shutter.channel,
            name: shutter.name.clone(),
            position: positions.get(&shutter.channel).copied(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PositionView {
    channel: u16,
    position: u8,
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShutterRow {
    #[tabled(rename = "Ch")]
    channel: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Position")]
    position: String,
}

impl From<&ShutterView> for ShutterRow {
    fn from(v: &ShutterView) -> Self {
        Self {
            channel: v.channel,
            name: v.name.clone(),
            position: v.position.map(|p| format!("{p}%")).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Ch")]
    channel: u16,
    #[tabled(rename = "Position")]
    position: String,
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ShuttersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ShuttersCommand::List => discover(controller, global).await,

        ShuttersCommand::Positions => {
            controller.connect().await?;
            let positions = controller.read_positions().await?;
            let views: Vec<PositionView> = positions
                .iter()
                .map(|(&channel, &position)| PositionView { channel, position })
                .collect();
            let out = output::render_list(
                &global.output,
                &views,
                |v| PositionRow {
                    channel: v.channel,
                    position: format!("{}%", v.position),
                },
                |v| format!("{} {}", v.channel, v.position),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShuttersCommand::Move { action, channels } => {
            controller.connect().await?;
            controller.enqueue_user_command(&action, &channels)?;
            util::flush(controller).await?;
            util::done(
                global,
                &format!("Sent '{action}' to channel {}", util::channel_list(&channels)),
            );
            Ok(())
        }
    }
}

/// Run a full discovery and list the named shutters.
pub async fn discover(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.connect().await?;
    let shutters = controller.run_full_discovery().await?;
    let positions = match controller.read_positions().await {
        Ok(positions) => positions,
        Err(e) => {
            tracing::debug!(error = %e, "listing shutters without fresh positions");
            controller.positions()
        }
    };

    let views: Vec<ShutterView> = shutters
        .iter()
        .map(|s| ShutterView::new(s, &positions))
        .collect();
    let out = output::render_list(
        &global.output,
        &views,
        |v| ShutterRow::from(v),
        |v| format!("{} {}", v.channel, v.name),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
