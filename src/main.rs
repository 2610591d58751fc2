//! LinkVault command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use linkvault::app::App;
use linkvault::platform;
use linkvault::services::importers::ImportFormat;
use linkvault::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkvault::types::transfer::QrTransferInfo;

/// Deeplink collection: bookmark import and LAN transfer.
#[derive(Parser, Debug)]
#[command(name = "linkvault", version, about, long_about = None)]
struct Cli {
    /// Database file (defaults to the platform data directory).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a bookmark file.
    Import {
        path: PathBuf,
        /// text, csv, html, chrome or firefox. Detected from the file when omitted.
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        profile: Option<i64>,
    },
    /// Show how a plain-text file would be imported without writing anything.
    Preview {
        path: PathBuf,
        #[arg(long)]
        profile: Option<i64>,
    },
    /// Write the transfer envelope of the active profile as JSON.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the API and transfer servers until Ctrl-C.
    Serve,
    /// Fetch and merge a peer's export from its QR payload JSON.
    Pull { payload: String },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("linkvault=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn open_app(cli: &Cli) -> Result<App, Box<dyn std::error::Error>> {
    let mut settings = SettingsEngine::new(cli.config.clone());
    settings.load()?;

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => {
            let dir = platform::get_data_dir();
            std::fs::create_dir_all(&dir)?;
            dir.join(&settings.get_settings().general.database_file)
        }
    };
    tracing::debug!(path = %db_path.display(), "opening database");

    Ok(App::new(&db_path, settings)?)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_app(&cli)?;

    match cli.command {
        Commands::Import {
            path,
            format,
            profile,
        } => {
            let profile_id = profile.unwrap_or_else(|| app.active_profile_id());
            let result = match format {
                Some(name) => {
                    let format = ImportFormat::from_name(&name)
                        .ok_or_else(|| format!("unknown import format: {name}"))?;
                    app.import_service
                        .import_file(format, &path, profile_id)
                        .await?
                }
                None => {
                    let (format, result) = app
                        .import_service
                        .import_detected(&path, profile_id)
                        .await?;
                    tracing::info!(format = format.display_name(), "format detected");
                    result
                }
            };
            println!("{}", result.summary());
        }
        Commands::Preview { path, profile } => {
            let profile_id = profile.unwrap_or_else(|| app.active_profile_id());
            let content = tokio::fs::read_to_string(&path).await?;
            for entry in app.import_service.preview_plain_text(&content, profile_id)? {
                let mark = if entry.is_selected_by_default { "x" } else { " " };
                let note = match (entry.is_valid, entry.is_duplicate) {
                    (false, _) => " (invalid)",
                    (true, true) => " (duplicate)",
                    (true, false) => "",
                };
                println!("[{mark}] {}{note}", entry.link);
            }
        }
        Commands::Export { out } => {
            let envelope = app.export()?;
            let json = serde_json::to_string_pretty(&envelope)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!(
                        "Exported {} link(s) to {}",
                        envelope.links.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Serve => {
            match app.api_server.start().await {
                Ok(url) => println!("API server: {url}"),
                Err(e) => eprintln!("API server not started: {e}"),
            }

            let url = app.transfer_server.start().await?;
            println!("Transfer server: {url}");
            if let Some(info) = app.transfer_server.connection_info().await {
                println!("{}", info.render_terminal()?);
                println!("{}", info.to_json()?);
            }

            tokio::signal::ctrl_c().await?;
            app.shutdown().await;
        }
        Commands::Pull { payload } => {
            let info = QrTransferInfo::from_json(&payload)?;
            let result = app.pull(&info).await?;
            println!("{}", result.summary());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("linkvault: {e}");
            ExitCode::FAILURE
        }
    }
}
