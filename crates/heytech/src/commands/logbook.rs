//! Logbook handlers.

use tabled::Tabled;

use heytech_core::{Controller, LogbookEntry};

use crate::cli::{GlobalOpts, LogbookArgs, LogbookCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LogbookRow {
    #[tabled(rename = "No")]
    number: u32,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Trigger")]
    trigger: String,
}

impl From<&LogbookEntry> for LogbookRow {
    fn from(e: &LogbookEntry) -> Self {
        Self {
            number: e.number,
            date: e.date.clone(),
            time: e.time.clone(),
            room: e.room.clone(),
            direction: e.direction.clone(),
            trigger: e.trigger.clone(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: LogbookArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LogbookCommand::Show { max } => {
            controller.connect().await?;
            let entries = controller.read_logbook(max).await?;
            let out = output::render_list(
                &global.output,
                &entries,
                |e| LogbookRow::from(e),
                |e| format!("{} {} {} {}", e.date, e.time, e.room, e.direction),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LogbookCommand::Clear { yes } => {
            if !yes {
                return Err(CliError::ConfirmationRequired {
                    action: "logbook clear".into(),
                });
            }
            controller.connect().await?;
            controller.clear_logbook()?;
            util::flush(controller).await?;
            util::done(global, "Logbook cleared");
            Ok(())
        }
    }
}
