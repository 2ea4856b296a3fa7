use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::client::{create_paste, Draft, HttpBackend};
use crate::expiration::Expiration;
use crate::models::{Format, Visibility};

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Base URL of the paste server.
    #[arg(long, env = "SAFEPASTE_SERVER")]
    pub server: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::PlainText)]
    pub format: Format,
    /// Language hint for source code, e.g. `rust`.
    #[arg(long)]
    pub language: Option<String>,
    #[arg(long, value_enum, default_value_t = Visibility::Unlisted)]
    pub visibility: Visibility,
    #[arg(long)]
    pub password: Option<String>,
    /// Delete the paste after it has been read once.
    #[arg(long)]
    pub burn: bool,
    /// One of 5m, 10m, 1h, 1d, 1w, 1M, 1y, never.
    #[arg(long, default_value_t = Expiration::OneWeek)]
    pub expire: Expiration,
    /// File to paste; reads stdin when omitted.
    pub file: Option<PathBuf>,
}

pub async fn run(args: CreateArgs) -> anyhow::Result<()> {
    let content = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
            content
        }
    };

    let backend = HttpBackend::new(&args.server)?;
    let receipt = create_paste(
        &backend,
        Draft {
            title: args.title,
            content,
            format: args.format,
            language: args.language,
            visibility: args.visibility,
            password: args.password,
            burn_after_reading: args.burn,
            expiration: args.expire,
        },
    )
    .await?;

    println!("{}", receipt.locator);
    eprintln!("delete key: {}", receipt.delete_key);
    if let Some(expires_at) = receipt.expires_at {
        eprintln!("expires at: {expires_at}");
    }
    Ok(())
}
