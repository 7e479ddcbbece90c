//! Device information and maintenance handlers.

use serde::Serialize;

use heytech_core::Controller;

use crate::cli::{DeviceArgs, DeviceCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, detail_lines};

use super::util;

#[derive(Debug, Serialize)]
struct DeviceView {
    host: String,
    port: u16,
    model: Option<String>,
    firmware: Option<String>,
    channels: Option<u16>,
    shutters: usize,
    scenarios: usize,
    groups: usize,
    logbook_entries: Option<u32>,
}

fn device_detail(v: &DeviceView) -> String {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".into());
    detail_lines(&[
        ("Address", format!("{}:{}", v.host, v.port)),
        ("Model", or_dash(v.model.clone())),
        ("Firmware", or_dash(v.firmware.clone())),
        ("Channels", or_dash(v.channels.map(|c| c.to_string()))),
        ("Shutters", v.shutters.to_string()),
        ("Scenarios", v.scenarios.to_string()),
        ("Groups", v.groups.to_string()),
        ("Logbook", or_dash(v.logbook_entries.map(|n| n.to_string()))),
    ])
}

pub async fn handle(
    controller: &Controller,
    args: DeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DeviceCommand::Info => {
            util::discover_all(controller).await?;
            let info = controller.device_info();
            let config = controller.config();
            let view = DeviceView {
                host: config.host.clone(),
                port: config.port,
                model: info.model,
                firmware: info.firmware,
                channels: controller.max_channels(),
                shutters: controller.shutters_snapshot().len(),
                scenarios: controller.scenarios_snapshot().len(),
                groups: controller.groups_snapshot().len(),
                logbook_entries: controller.store().logbook_count(),
            };
            let out = output::render_single(&global.output, &view, device_detail, |v| {
                v.model.clone().unwrap_or_default()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DeviceCommand::Test => {
            controller.test_connection().await?;
            util::flush(controller).await?;
            let info = controller.read_device_info().await?;
            let model = info.model.unwrap_or_else(|| "Heytech controller".into());
            let config = controller.config();
            util::done(
                global,
                &format!("Connected to {model} at {}:{}", config.host, config.port),
            );
            Ok(())
        }

        DeviceCommand::SyncTime => {
            controller.connect().await?;
            controller.sync_time()?;
            util::flush(controller).await?;
            util::done(global, "Device clock set to local time");
            Ok(())
        }
    }
}
