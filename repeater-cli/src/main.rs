mod logging;
mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use repeater_codec::DecodeOptions;
use repeater_core::{RequestFilter, RequestId};
use repeater_har::parse_log;
use repeater_ingest::{CaptureEvent, Coordinator, CoordinatorConfig, open_or_create_workspace};
use repeater_storage::{JsonFileStore, KeyValueStore, SettingsPatch, Theme};
use repeater_web::{Client, ClientConfig};

#[derive(Debug, Parser)]
#[command(name = "repeater", about = "Capture, edit and replay HTTP requests")]
struct Cli {
    #[arg(long = "data-dir")]
    data_dir: PathBuf,
    #[arg(long = "log-level")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture every entry of a HAR export.
    Import { har: PathBuf },
    /// List stored requests grouped by domain.
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        method: Option<String>,
    },
    /// Print a stored request as raw HTTP, followed by its response.
    Show { id: String },
    /// Send a stored request again, or a raw request read from a file.
    Replay {
        #[arg(required_unless_present = "raw", conflicts_with = "raw")]
        id: Option<String>,
        #[arg(long)]
        raw: Option<PathBuf>,
        #[arg(long, requires = "raw")]
        scheme: Option<String>,
    },
    Duplicate { id: String },
    Delete { id: String },
    Clear,
    /// Show settings, or change the given ones.
    Settings {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long = "auto-capture")]
        auto_capture: Option<bool>,
        #[arg(long = "max-requests")]
        max_requests: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let context = open_or_create_workspace(&cli.data_dir)?;
    logging::init(&context.config.logging, cli.log_level.as_deref())?;

    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(&context.paths.state));
    let client = Client::new(ClientConfig {
        timeout: Duration::from_secs(context.config.replay.timeout_secs),
        accept_invalid_certs: context.config.replay.accept_invalid_certs,
    });
    let coordinator = Coordinator::restore(
        store,
        client,
        CoordinatorConfig::from_workspace(&context.config),
    );

    tracing::debug!(
        data_dir = %context.paths.root.display(),
        stored = coordinator.index().count(),
        "workspace opened"
    );

    let result = run(&coordinator, cli.command).await;
    coordinator.flush().map_err(|err| err.to_string())?;
    result
}

async fn run(coordinator: &Coordinator<Client>, command: Command) -> Result<(), String> {
    match command {
        Command::Import { har } => {
            let raw = std::fs::read_to_string(&har).map_err(|err| format!("{}: {err}", har.display()))?;
            let entries = parse_log(&raw).map_err(|err| err.to_string())?;
            let total = entries.len();
            let was_capturing = coordinator.is_capturing();
            coordinator.start_capture();
            let mut imported = 0;
            for entry in entries {
                if coordinator.handle_capture(CaptureEvent::new(entry)).await.is_some() {
                    imported += 1;
                }
            }
            if !was_capturing {
                coordinator.stop_capture();
            }
            println!("imported {imported} of {total} entries");
            for (domain, requests) in coordinator.get_by_domain() {
                println!("  {domain}: {}", requests.len());
            }
        }
        Command::List { query, method } => {
            let filter = RequestFilter::new(query, method);
            if filter.is_empty() {
                print!("{}", render::grouped(&coordinator.get_by_domain()));
            } else {
                for request in coordinator.filtered(&filter) {
                    println!("{}", render::summary_line(&request));
                }
            }
        }
        Command::Show { id } => {
            let id = RequestId::from(id);
            let request = coordinator
                .get(&id)
                .ok_or_else(|| format!("no request with id `{id}`"))?;
            println!("{}", coordinator.encode_raw(&request));
            if let Some(response) = request.response() {
                println!();
                println!("{}", render::response_meta(response));
                println!("{}", coordinator.encode_raw_response(response));
            }
        }
        Command::Replay { id, raw, scheme } => {
            let outcome = match (id, raw) {
                (Some(id), _) => coordinator
                    .resend(&RequestId::from(id))
                    .await
                    .map_err(|err| err.to_string()),
                (None, Some(path)) => {
                    let text = std::fs::read_to_string(&path)
                        .map_err(|err| format!("{}: {err}", path.display()))?;
                    let options = match scheme {
                        Some(scheme) => DecodeOptions::with_scheme(scheme),
                        None => coordinator.decode_options().clone(),
                    };
                    coordinator
                        .replay_raw(&text, &options)
                        .await
                        .map_err(|err| err.to_string())
                }
                (None, None) => Err("give a request id or --raw <file>".to_string()),
            };
            let response = outcome?;
            println!("{}", render::response_meta(&response));
            println!("{}", coordinator.encode_raw_response(&response));
        }
        Command::Duplicate { id } => {
            let copy = coordinator
                .duplicate(&RequestId::from(id))
                .map_err(|err| err.to_string())?;
            println!("{}", render::summary_line(&copy));
        }
        Command::Delete { id } => {
            let removed = coordinator
                .delete(&RequestId::from(id))
                .map_err(|err| err.to_string())?;
            println!("deleted {}", removed.id());
        }
        Command::Clear => {
            println!("cleared {} requests", coordinator.clear());
        }
        Command::Settings {
            theme,
            auto_capture,
            max_requests,
        } => {
            let patch = SettingsPatch {
                theme,
                auto_capture,
                max_requests,
                filters: None,
            };
            let settings = if patch.is_empty() {
                coordinator.settings()
            } else {
                coordinator.update_settings(patch)
            };
            println!("{}", render::settings(&settings));
        }
    }
    Ok(())
}
