//! Detection command handlers.

use unlockly_core::Session;

use crate::cli::{DetectArgs, DetectCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    session: &Session,
    args: DetectArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = match args.command.unwrap_or(DetectCommand::Phone) {
        DetectCommand::Phone => session.detection().detect().await,
        DetectCommand::Any => session.detection().detect_any().await,
        DetectCommand::Fix => {
            if !global.quiet {
                eprintln!("Retrying every detection strategy in order...");
            }
            session.detection().fix_recognition().await
        }
    };

    let Some(outcome) = outcome else {
        print_fallback_help();
        return Err(CliError::Backend {
            message: "no device could be detected".into(),
        });
    };

    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!("Detected via {} strategy", outcome.strategy);
        if let Some(probe) = &outcome.probe {
            if let (Some(vid), Some(pid)) = (&probe.vendor_id, &probe.product_id) {
                eprintln!("USB device {vid}:{pid} ({})", probe.mode.as_deref().unwrap_or("normal"));
            }
        }
    }

    let rendered = output::render_single(
        &global.output,
        outcome.device.as_ref(),
        |d| util::device_detail(d, color),
        util::device_id,
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn print_fallback_help() {
    eprintln!(
        "\nNo device detected. Things to try:\n\
         - Check the USB cable and try another port\n\
         - Enable USB debugging in developer options\n\
         - Run: unlockly detect fix   (tries every strategy)\n\
         - Run: unlockly select       (pick the model manually)"
    );
}
