//! Backend health command handlers.

use unlockly_core::{HealthSnapshot, Session};

use crate::cli::{GlobalOpts, HealthArgs, HealthCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: &Session,
    args: HealthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = match args.command.unwrap_or(HealthCommand::Show) {
        HealthCommand::Show => session.refresh_health().await?,
        HealthCommand::Heal => {
            if !global.quiet {
                eprintln!("Running self-heal pass...");
            }
            session.self_heal().await?
        }
    };

    let color = output::should_color(&global.color);
    let rendered = output::render_single(
        &global.output,
        &snapshot,
        |s: &HealthSnapshot| {
            let mut lines = vec![format!(
                "Health: {}",
                output::health_label(s.state, color)
            )];
            for issue in &s.issues {
                lines.push(format!("  - {issue}"));
            }
            lines.join("\n")
        },
        |s| s.state.to_string(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
