use anyhow::bail;
use clap::Args;
use tracing::warn;

use crate::client::{HttpBackend, OpenedPaste, ViewSession, ViewState};
use crate::locator::Locator;
use crate::render::{effective_language, language_label};

#[derive(Debug, Args)]
pub struct ViewArgs {
    /// Full locator, including the `#key` fragment.
    pub locator: String,
    #[arg(long)]
    pub password: Option<String>,
    /// Server to fetch from instead of the one named in the locator.
    #[arg(long, env = "SAFEPASTE_SERVER")]
    pub server: Option<String>,
    /// Print an HTML fragment instead of terminal output.
    #[arg(long)]
    pub html: bool,
}

pub async fn run(args: ViewArgs) -> anyhow::Result<()> {
    let locator = Locator::parse(&args.locator)?;
    let server = args
        .server
        .clone()
        .unwrap_or_else(|| locator.base_url().to_owned());
    let backend = HttpBackend::new(server)?;

    let mut session = ViewSession::new(&backend, locator);
    match session.load(args.password.as_deref()).await? {
        ViewState::Ready(opened) => {
            eprint!("{}", header(opened));
            if args.html {
                println!("{}", opened.render_html());
            } else {
                print!("{}", opened.render_terminal());
            }
        }
        state => bail!("{}", state.message()),
    }

    if let Err(err) = session.end().await {
        warn!("paste could not be burned: {err}");
    }
    Ok(())
}

/// Paste details shown above the content.
pub fn header(opened: &OpenedPaste) -> String {
    let language = language_label(effective_language(&opened.plaintext, &opened.language));
    let expires = opened
        .expires_at
        .map_or_else(|| "never".to_owned(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string());

    let mut out = format!(
        "{title}\n{format} | {language} | {views} {noun} | expires {expires}\n",
        title = opened.title,
        format = opened.format.label(),
        views = opened.views,
        noun = if opened.views == 1 { "view" } else { "views" },
    );
    if opened.burn_after_reading {
        out.push_str("burn after reading: this paste is deleted once you are done with it\n");
    }
    out.push('\n');
    out
}
