//! Automation parameter tables (jalousie, shading, wind, rain).

use tabled::Tabled;

use heytech_core::Controller;

use crate::cli::{GlobalOpts, ParamsArgs, ParamsKind};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ParamsRow {
    #[tabled(rename = "Ch")]
    channel: u16,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Threshold")]
    threshold: String,
    #[tabled(rename = "Position")]
    position: String,
}

impl ParamsRow {
    fn new(channel: u16, enabled: bool, threshold: Option<u32>, position: Option<u8>) -> Self {
        Self {
            channel,
            enabled: output::flag(Some(enabled), false),
            threshold: threshold.map(|t| t.to_string()).unwrap_or_default(),
            position: position.map(|p| format!("{p}%")).unwrap_or_default(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: &ParamsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::discover_all(controller).await?;
    let store = controller.store();
    let format = &global.output;

    let out = match args.kind {
        ParamsKind::Jalousie => {
            let snap = store.jalousie_params();
            output::render_list(
                format,
                snap.as_slice(),
                // Tilt time is reported in tenths of a second.
                |p| ParamsRow::new(p.channel, p.enabled, Some(p.tilt_time), None),
                |p| p.channel.to_string(),
            )?
        }
        ParamsKind::Shading => {
            let snap = store.shading_params();
            output::render_list(
                format,
                snap.as_slice(),
                |p| {
                    ParamsRow::new(
                        p.channel,
                        p.enabled,
                        Some(p.brightness_threshold),
                        Some(p.position),
                    )
                },
                |p| p.channel.to_string(),
            )?
        }
        ParamsKind::Wind => {
            let snap = store.wind_params();
            output::render_list(
                format,
                snap.as_slice(),
                |p| ParamsRow::new(p.channel, p.enabled, Some(p.wind_threshold), Some(p.position)),
                |p| p.channel.to_string(),
            )?
        }
        ParamsKind::Rain => {
            let snap = store.rain_params();
            output::render_list(
                format,
                snap.as_slice(),
                |p| ParamsRow::new(p.channel, p.enabled, None, Some(p.position)),
                |p| p.channel.to_string(),
            )?
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
