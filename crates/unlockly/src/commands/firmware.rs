//! Firmware command handlers: search, download, queue status, requests.

use serde::Serialize;
use tabled::Tabled;

use unlockly_api::FirmwareRequest;
use unlockly_core::{DownloadItem, DownloadStatus, Session};

use crate::cli::{FirmwareArgs, FirmwareCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FirmwareRow {
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "ANDROID")]
    android: String,
    #[tabled(rename = "REGION")]
    region: String,
    #[tabled(rename = "SIZE")]
    size: String,
    #[tabled(rename = "DATE")]
    date: String,
}

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "VERSION")]
    version: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "PROGRESS")]
    progress: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

/// Serializable view of a queue item for JSON output.
#[derive(Serialize)]
struct QueueItem<'a> {
    version: &'a str,
    status: DownloadStatus,
    progress: u8,
    error: Option<&'a str>,
}

pub async fn handle(
    session: &Session,
    args: FirmwareArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FirmwareCommand::Find { model, region } => {
            let resp = session.find_firmware(model.as_deref(), &region).await?;

            if resp.firmware_list.is_empty() && !global.quiet {
                eprintln!(
                    "No firmware indexed for that model.\n\
                     Try: unlockly firmware request <brand> <model>"
                );
            }

            let rendered = output::render_list(
                &global.output,
                &resp.firmware_list,
                |f| FirmwareRow {
                    version: f.version.clone(),
                    android: f.android_version.clone().unwrap_or_default(),
                    region: f.region.clone().unwrap_or_default(),
                    size: f.file_size.clone().unwrap_or_default(),
                    date: f.build_date.clone().unwrap_or_default(),
                },
                |f| f.version.clone(),
            );
            output::print_output(&rendered, global.quiet);

            if let Some(ref recommendation) = resp.ai_recommendation {
                if !global.quiet {
                    eprintln!("\nRecommendation:\n{recommendation}");
                }
            }
            Ok(())
        }

        FirmwareCommand::Download {
            version,
            url,
            no_wait,
        } => {
            if !session.downloads().enqueue(url, version.clone()) {
                return Err(CliError::Validation {
                    field: "version".into(),
                    reason: format!("'{version}' is already downloading"),
                });
            }
            if !global.quiet {
                eprintln!("Download of {version} started");
            }
            if no_wait {
                return Ok(());
            }
            watch_download(session, &version, global).await
        }

        FirmwareCommand::Status => {
            let snapshot = session.downloads().snapshot();
            let color = output::should_color(&global.color);

            let items: Vec<QueueItem<'_>> = snapshot
                .iter()
                .map(|item| QueueItem {
                    version: &item.version,
                    status: item.status,
                    progress: item.progress,
                    error: item.error.as_deref(),
                })
                .collect();

            let rendered = output::render_list(
                &global.output,
                &items,
                |item| QueueRow {
                    version: item.version.to_owned(),
                    status: output::status_label(item.status, color),
                    progress: format!("{}%", item.progress),
                    error: item.error.unwrap_or_default().to_owned(),
                },
                |item| item.version.to_owned(),
            );
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        FirmwareCommand::Request {
            brand,
            model,
            model_number,
            region,
            notes,
        } => {
            let prompt = format!("Submit a firmware request for {brand} {model}?");
            if !super::util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let req = FirmwareRequest {
                brand,
                model,
                model_number,
                region,
                notes,
            };
            session.request_firmware(&req).await?;
            if !global.quiet {
                eprintln!("Firmware request submitted");
            }
            Ok(())
        }
    }
}

/// Follow one download until it reaches a terminal state.
async fn watch_download(
    session: &Session,
    version: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut rx = session.downloads().subscribe();

    loop {
        let item: Option<DownloadItem> = rx
            .borrow()
            .iter()
            .find(|i| i.version == version)
            .cloned();

        if let Some(item) = item {
            if !global.quiet {
                eprint!("\r{version}: {:3}%", item.progress);
            }
            if item.status.is_terminal() {
                if !global.quiet {
                    eprintln!();
                }
                return match item.status {
                    DownloadStatus::Failed => Err(CliError::Transfer {
                        message: item
                            .error
                            .unwrap_or_else(|| "transfer failed".to_owned()),
                    }),
                    _ => Ok(()),
                };
            }
        }

        if rx.changed().await.is_err() {
            return Ok(());
        }
    }
}
