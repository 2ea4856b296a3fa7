use chrono::Utc;
use tracing::info;

use crate::controllers::paste;
use crate::App;

pub async fn run(app: App) -> anyhow::Result<()> {
    let count = paste::purge_expired(&app.store, Utc::now()).await?;
    info!("purge finished, {count} expired pastes removed");
    Ok(())
}
