//! Built-in catalog browsing, plus the backend's Hisense descriptors.

use serde::Serialize;
use tabled::Tabled;

use unlockly_core::Session;

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Named {
    name: String,
}

#[derive(Tabled)]
struct NamedRow {
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct MethodRow {
    #[tabled(rename = "METHOD")]
    name: String,
    #[tabled(rename = "LOCK")]
    lock: String,
    #[tabled(rename = "SUCCESS")]
    success: String,
    #[tabled(rename = "DATA LOSS")]
    data_loss: String,
    #[tabled(rename = "TOOLS")]
    tools: String,
}

#[derive(Tabled)]
struct BuildRow {
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "ANDROID")]
    android: String,
    #[tabled(rename = "REGION")]
    region: String,
    #[tabled(rename = "SIZE")]
    size: String,
}

#[derive(Tabled)]
struct EmergencyRow {
    #[tabled(rename = "MODE")]
    name: String,
    #[tabled(rename = "VID")]
    vendor_id: String,
    #[tabled(rename = "PID")]
    product_id: String,
}

pub async fn handle(
    session: &Session,
    args: CatalogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CatalogCommand::Brands => {
            let brands: Vec<Named> = session
                .catalog()
                .brands()
                .into_iter()
                .map(|b| Named { name: b.to_owned() })
                .collect();
            let rendered = output::render_list(
                &global.output,
                &brands,
                |b| NamedRow {
                    name: b.name.clone(),
                },
                |b| b.name.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CatalogCommand::Models { brand } => {
            let models = session.catalog().models_for(&brand);
            if models.is_empty() {
                return Err(CliError::NotFound {
                    resource_type: "brand".into(),
                    identifier: brand,
                    list_command: "catalog brands".into(),
                });
            }
            let models: Vec<Named> = models
                .into_iter()
                .map(|m| Named { name: m.to_owned() })
                .collect();
            let rendered = output::render_list(
                &global.output,
                &models,
                |m| NamedRow {
                    name: m.name.clone(),
                },
                |m| m.name.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CatalogCommand::Methods { brand, model } => {
            let Some(entry) = session.catalog().lookup(&brand, &model) else {
                return Err(CliError::NotFound {
                    resource_type: "model".into(),
                    identifier: format!("{brand} {model}"),
                    list_command: format!("catalog models {brand}"),
                });
            };
            let rendered = output::render_list(
                &global.output,
                &entry.unlock_methods,
                |m| MethodRow {
                    name: m.name.clone(),
                    lock: m.lock_kind.to_string(),
                    success: format!("{:.0}%", m.success_rate * 100.0),
                    data_loss: m.data_loss.to_string(),
                    tools: m.tools.join(", "),
                },
                |m| m.name.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CatalogCommand::Firmware { model, region } => {
            let builds = session.catalog().firmware_for(&model, region.as_deref());
            if builds.is_empty() {
                return Err(CliError::NotFound {
                    resource_type: "firmware".into(),
                    identifier: model,
                    list_command: "catalog brands".into(),
                });
            }
            let builds: Vec<_> = builds.into_iter().cloned().collect();
            let rendered = output::render_list(
                &global.output,
                &builds,
                |b| BuildRow {
                    version: b.version.clone(),
                    android: b.android_version.clone(),
                    region: b.region.clone(),
                    size: b.file_size.clone(),
                },
                |b| b.version.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CatalogCommand::Emergency => {
            let modes = session.catalog().emergency_modes();
            let rendered = output::render_list(
                &global.output,
                modes,
                |m| EmergencyRow {
                    name: m.name.clone(),
                    vendor_id: m.vendor_id.clone(),
                    product_id: m.product_id.clone(),
                },
                |m| m.name.clone(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        CatalogCommand::Hisense { model } => {
            let resp = session.hisense_methods(&model).await?;
            if resp.data.is_empty() && !global.quiet {
                eprintln!("The backend has no Hisense descriptors for '{model}'");
                return Ok(());
            }
            let rendered = serde_json::to_string_pretty(&resp.data)?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }
    }
}
