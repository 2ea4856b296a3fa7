use clap::Args;
use tracing::info;

use crate::client::{Backend, HttpBackend};
use crate::locator::Locator;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(long, env = "SAFEPASTE_SERVER")]
    pub server: String,
    /// Paste id, or a full locator.
    pub id: String,
    #[arg(long)]
    pub delete_key: String,
}

pub async fn run(args: DeleteArgs) -> anyhow::Result<()> {
    let id = match Locator::parse(&args.id) {
        Ok(locator) => locator.id().to_owned(),
        Err(_) => args.id,
    };

    let backend = HttpBackend::new(&args.server)?;
    backend.delete(&id, &args.delete_key).await?;
    info!("deleted paste '{id}'");
    Ok(())
}
