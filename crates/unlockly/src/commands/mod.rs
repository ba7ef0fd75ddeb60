//! Command dispatch: bridges CLI args -> session operations -> output.

pub mod agents;
pub mod analyze;
pub mod catalog;
pub mod config_cmd;
pub mod detect;
pub mod firmware;
pub mod health;
pub mod recent;
pub mod select;
pub mod updates;
pub mod util;

use unlockly_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Detect(args) => detect::handle(session, args, global).await,
        Command::Select(args) => select::handle(session, args, global),
        Command::Analyze(args) => analyze::handle(session, args, global).await,
        Command::Firmware(args) => firmware::handle(session, args, global).await,
        Command::Agents(args) => agents::handle(session, args, global).await,
        Command::Health(args) => health::handle(session, args, global).await,
        Command::Catalog(args) => catalog::handle(session, args, global).await,
        Command::Recent => recent::handle(session, global),
        Command::Updates => updates::handle(session, global).await,
        // Config is handled before dispatch
        Command::Config(_) => unreachable!(),
    }
}
