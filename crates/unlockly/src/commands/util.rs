//! Shared helpers for command handlers.

use dialoguer::Confirm;

use unlockly_core::Device;

use crate::error::CliError;

/// Ask for confirmation unless `--yes` was given.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, CliError> {
    if assume_yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Multi-line detail view of a device, used by detect/select/table output.
pub fn device_detail(device: &Device, color: bool) -> String {
    let locks = if device.supported_locks.is_empty() {
        "(unknown)".to_owned()
    } else {
        device
            .supported_locks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut lines = vec![
        format!("Brand:        {}", device.brand),
        format!("Model:        {}", device.model),
    ];
    if let Some(ref number) = device.model_number {
        lines.push(format!("Model number: {number}"));
    }
    if let Some(ref os) = device.os_version {
        lines.push(format!("OS version:   {os}"));
    }
    lines.push(format!(
        "Confidence:   {:.0}% ({})",
        device.confidence * 100.0,
        crate::output::band_label(device.confidence_band(), color)
    ));
    lines.push(format!("Method:       {}", device.method));
    lines.push(format!("Locks:        {locks}"));
    lines.join("\n")
}

/// One-line identifier for plain output.
pub fn device_id(device: &Device) -> String {
    format!("{} {}", device.brand, device.model)
}
