//! Scenario and group handlers.

use std::sync::Arc;

use tabled::Tabled;

use heytech_core::{Controller, Group, Scenario};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand, ScenariosArgs, ScenariosCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "No")]
    number: u16,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Arc<Scenario>> for ScenarioRow {
    fn from(s: &Arc<Scenario>) -> Self {
        Self {
            number: s.number,
            name: s.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "No")]
    number: u16,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Channels")]
    channels: String,
}

impl From<&Arc<Group>> for GroupRow {
    fn from(g: &Arc<Group>) -> Self {
        Self {
            number: g.number,
            name: g.name.clone(),
            channels: util::channel_list(&g.channels),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_scenarios(
    controller: &Controller,
    args: ScenariosArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ScenariosCommand::List => {
            controller.connect().await?;
            controller.run_full_discovery().await?;
            let snap = controller.scenarios_snapshot();
            let out = output::render_list(
                &global.output,
                snap.as_slice(),
                |s| ScenarioRow::from(s),
                |s| format!("{} {}", s.number, s.name),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ScenariosCommand::Activate { number } => {
            controller.connect().await?;
            controller.activate_scenario(number)?;
            util::flush(controller).await?;
            util::done(global, &format!("Scenario {number} activated"));
            Ok(())
        }
    }
}

pub async fn handle_groups(
    controller: &Controller,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Group membership is only known after the device reported it.
    util::discover_all(controller).await?;

    match args.command {
        GroupsCommand::List => {
            let snap = controller.groups_snapshot();
            let out = output::render_list(
                &global.output,
                snap.as_slice(),
                |g| GroupRow::from(g),
                |g| g.number.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Move { number, action } => {
            controller.control_group(number, &action)?;
            util::flush(controller).await?;
            util::done(global, &format!("Sent '{action}' to group {number}"));
            Ok(())
        }
    }
}
