//! Lock analysis command handler.

use unlockly_core::{LockKind, Session};

use crate::cli::{AnalyzeArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    session: &Session,
    args: AnalyzeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let lock: LockKind = args.lock.parse().map_err(|_| CliError::Validation {
        field: "lock".into(),
        reason: format!(
            "unknown lock kind '{}' (expected frp, bootloader, screen_lock, google_account, or carrier)",
            args.lock
        ),
    })?;

    let resp = session.analyze_lock(args.model.as_deref(), lock).await?;

    let rendered = output::render_single(
        &global.output,
        &resp.analysis,
        |a| {
            let mut lines = vec![format!("Lock type:     {}", a.detected_lock_type)];
            if let Some(ref difficulty) = a.difficulty {
                lines.push(format!("Difficulty:    {difficulty}"));
            }
            if let Some(rate) = a.success_rate {
                lines.push(format!("Success rate:  {:.0}%", rate * 100.0));
            }
            if let Some(ref time) = a.estimated_time {
                lines.push(format!("Est. time:     {time}"));
            }
            if !a.methods.is_empty() {
                lines.push(format!("Methods:       {}", a.methods.join(", ")));
            }
            if !a.risks.is_empty() {
                lines.push(format!("Risks:         {}", a.risks.join(", ")));
            }
            if !a.requirements.is_empty() {
                lines.push(format!("Requirements:  {}", a.requirements.join(", ")));
            }
            lines.join("\n")
        },
        |a| a.detected_lock_type.clone(),
    );
    output::print_output(&rendered, global.quiet);

    if let Some(ref recommendation) = resp.ai_recommendation {
        if !global.quiet {
            eprintln!("\nRecommendation:\n{recommendation}");
        }
    }
    Ok(())
}
