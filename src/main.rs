use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use safepaste::commands::{create, delete, list, purge_expired, serve, view};
use safepaste::config::Config;
use safepaste::App;

#[derive(Debug, Parser)]
#[command(name = "safepaste", version, about = "Encrypted paste exchange")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the paste server.
    Serve {
        #[arg(long, env = "SAFEPASTE_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Delete every expired paste once and exit.
    PurgeExpired {
        #[arg(long, env = "SAFEPASTE_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Encrypt and upload a paste, printing its locator.
    Create(create::CreateArgs),
    /// Fetch, decrypt and print a paste.
    View(view::ViewArgs),
    /// Delete a paste using its delete key.
    Delete(delete::DeleteArgs),
    /// List recent public pastes.
    List(list::ListArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve { config } => {
            let app = App::from_config(Config::load(config.as_deref())?).await?;
            serve::run(app).await
        }
        Command::PurgeExpired { config } => {
            let app = App::from_config(Config::load(config.as_deref())?).await?;
            purge_expired::run(app).await
        }
        Command::Create(args) => create::run(args).await,
        Command::View(args) => view::run(args).await,
        Command::Delete(args) => delete::run(args).await,
        Command::List(args) => list::run(args).await,
    }
}
