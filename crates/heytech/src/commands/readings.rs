//! Climate and automation status handlers.

use serde::Serialize;

use heytech_core::{ClimateReading, Controller};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, detail_lines, flag, measurement};

fn climate_detail(c: &ClimateReading, color: bool) -> String {
    let range = |min: Option<f64>, max: Option<f64>| {
        format!("{} .. {}", measurement(min, " °C"), measurement(max, " °C"))
    };
    detail_lines(&[
        ("Brightness", measurement(c.brightness, " klx")),
        ("Brightness avg", measurement(c.brightness_average, " klx")),
        ("Indoor", measurement(c.indoor_temperature, " °C")),
        (
            "Indoor range",
            range(c.indoor_temperature_min, c.indoor_temperature_max),
        ),
        ("Outdoor", measurement(c.outdoor_temperature, " °C")),
        (
            "Outdoor range",
            range(c.outdoor_temperature_min, c.outdoor_temperature_max),
        ),
        ("Wind", measurement(c.wind_speed, " km/h")),
        ("Wind max", measurement(c.wind_speed_max, " km/h")),
        ("Humidity", measurement(c.relative_humidity, " %")),
        ("Rain", flag(c.rain, color)),
        ("Alarm", flag(c.alarm, color)),
    ])
}

pub async fn climate(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.connect().await?;
    let reading = controller.read_climate().await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &*reading,
        |c| climate_detail(c, color),
        |c| measurement(c.indoor_temperature, ""),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Debug, Serialize)]
struct AutomationView {
    enabled: bool,
}

pub async fn automation(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.connect().await?;
    let enabled = controller.read_automation_status().await?;
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &AutomationView { enabled },
        |v| detail_lines(&[("Automation", flag(Some(v.enabled), color))]),
        |v| if v.enabled { "on".into() } else { "off".into() },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
