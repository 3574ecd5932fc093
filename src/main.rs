use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use game_roster::store::DocumentStore;
use game_roster::{init_telemetry, render_csv, GameRosterConfig, JsonFileStore};

#[derive(Parser)]
#[command(name = "game-roster")]
#[command(about = "Sign-up desk for numbered games with a PIN-guarded admin console")]
#[command(long_about = "Game Roster serves a small registration site: visitors sign up for the \
                       active game and get a turn number, and an administrator can open or close \
                       registrations, switch games and export the roster as CSV.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the registration web server (default)
    Serve {
        /// Address to listen on
        #[arg(long, help = "Socket address to bind, e.g. 127.0.0.1:3000")]
        bind: Option<String>,
        /// Roster document location
        #[arg(long, help = "Path to the JSON roster document")]
        data_file: Option<PathBuf>,
    },
    /// Write the registrant CSV export without starting the server
    Export {
        /// Roster document location
        #[arg(long, help = "Path to the JSON roster document")]
        data_file: Option<PathBuf>,
        /// Output file; stdout when omitted
        #[arg(long, short = 'o', help = "Write the CSV to this file instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Write the effective configuration as TOML
    InitConfig {
        /// Destination file
        #[arg(long, default_value = "game-roster.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long, help = "Overwrite the file if it already exists")]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    GameRosterConfig::load_env_file()?;
    let mut config = GameRosterConfig::load()?;

    match cli.command.unwrap_or(Commands::Serve {
        bind: None,
        data_file: None,
    }) {
        Commands::Serve { bind, data_file } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            if let Some(data_file) = data_file {
                config.storage.data_file = data_file;
            }
            init_telemetry(&config.observability)?;
            tokio::runtime::Runtime::new()?.block_on(async { game_roster::serve(&config).await })
        }
        Commands::Export { data_file, output } => {
            if let Some(data_file) = data_file {
                config.storage.data_file = data_file;
            }
            init_telemetry(&config.observability)?;
            tokio::runtime::Runtime::new()?.block_on(async { export_command(&config, output).await })
        }
        Commands::InitConfig { path, force } => init_config_command(&config, &path, force),
    }
}

async fn export_command(config: &GameRosterConfig, output: Option<PathBuf>) -> Result<()> {
    let store = JsonFileStore::new(&config.storage.data_file);
    let doc = store
        .read_document()
        .await
        .with_context(|| format!("Failed to read roster document {}", store.location()))?;
    let csv = render_csv(&doc.sorted_registrants());

    match output {
        Some(path) => {
            tokio::fs::write(&path, &csv)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(file = %path.display(), rows = doc.students.len(), "CSV export written");
        }
        None => println!("{csv}"),
    }
    Ok(())
}

fn init_config_command(config: &GameRosterConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    config.save_to_file(path)?;
    println!("Wrote configuration to {}", path.display());
    Ok(())
}
