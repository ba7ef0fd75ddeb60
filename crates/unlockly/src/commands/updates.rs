//! Component update check.

use unlockly_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let resp = session.check_updates().await?;

    if resp.updates.is_empty() {
        if !global.quiet {
            eprintln!("Everything is up to date");
        }
        return Ok(());
    }

    let rendered = serde_json::to_string_pretty(&resp.updates)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
