use clap::Args;

use crate::client::{Backend, HttpBackend};
use crate::models::Format;
use crate::render::language_label;
use crate::store::PasteOrder;
use crate::types::api::{ListQuery, PasteSummary};

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, env = "SAFEPASTE_SERVER")]
    pub server: String,
    /// Only titles containing this text.
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_enum)]
    pub format: Option<Format>,
    #[arg(long, value_enum)]
    pub order: Option<PasteOrder>,
}

pub async fn run(args: ListArgs) -> anyhow::Result<()> {
    print!("{}", fetch(&args).await?);
    Ok(())
}

/// Recent public pastes on the server, one per line.
pub async fn fetch(args: &ListArgs) -> anyhow::Result<String> {
    let backend = HttpBackend::new(&args.server)?;
    let pastes = backend
        .list(ListQuery {
            q: args.search.clone(),
            format: args.format,
            order: args.order,
        })
        .await?;
    Ok(table(&pastes))
}

pub fn table(pastes: &[PasteSummary]) -> String {
    if pastes.is_empty() {
        return "no public pastes\n".to_owned();
    }

    pastes
        .iter()
        .map(|paste| {
            let mut flags = Vec::new();
            if paste.password_protected {
                flags.push("password");
            }
            if paste.burn_after_reading {
                flags.push("burn");
            }
            format!(
                "{id}  {created}  {title} [{format}, {language}] {views} views{flags}\n",
                id = paste.id,
                created = paste.created_at.format("%Y-%m-%d %H:%M"),
                title = paste.title,
                format = paste.format.label(),
                language = language_label(&paste.language),
                views = paste.views,
                flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", flags.join(", "))
                },
            )
        })
        .collect()
}
