//! Command handlers, one module per top-level subcommand.

pub mod config_cmd;
mod device;
mod logbook;
mod params;
mod readings;
mod scenarios;
mod shutters;
mod util;

use heytech_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Discover => shutters::discover(controller, global).await,
        Command::Shutters(args) => shutters::handle(controller, args, global).await,
        Command::Climate => readings::climate(controller, global).await,
        Command::Automation => readings::automation(controller, global).await,
        Command::Scenarios(args) => scenarios::handle_scenarios(controller, args, global).await,
        Command::Groups(args) => scenarios::handle_groups(controller, args, global).await,
        Command::Logbook(args) => logbook::handle(controller, args, global).await,
        Command::Params(args) => params::handle(controller, &args, global).await,
        Command::Device(args) => device::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
