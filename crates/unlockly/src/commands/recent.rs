//! Recent-device listing.

use tabled::Tabled;

use unlockly_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RecentRow {
    #[tabled(rename = "BRAND")]
    brand: String,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "CONFIDENCE")]
    confidence: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "SEEN")]
    seen: String,
}

pub fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let recents = session.store().recent_devices();
    if recents.is_empty() && !global.quiet {
        eprintln!("No devices seen yet. Run: unlockly detect");
        return Ok(());
    }

    let color = output::should_color(&global.color);
    let rendered = output::render_list(
        &global.output,
        &recents,
        |r| RecentRow {
            brand: r.device.brand.clone(),
            model: r.device.model.clone(),
            confidence: format!(
                "{:.0}% ({})",
                r.device.confidence * 100.0,
                output::band_label(r.device.confidence_band(), color)
            ),
            method: r.device.method.to_string(),
            seen: r.seen_at.format("%Y-%m-%d %H:%M").to_string(),
        },
        |r| util::device_id(&r.device),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
