//! Presentation of decrypted pastes.
//!
//! Nothing in here may fail: anything that cannot be rendered as requested is
//! shown as escaped plain text instead.

use std::sync::OnceLock;

use regex::Regex;

use crate::markdown::markdown_to_ansi;
use crate::models::Format;

const LANGUAGES: &[(&str, &str)] = &[
    ("text", "Plain Text"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("python", "Python"),
    ("java", "Java"),
    ("cpp", "C++"),
    ("csharp", "C#"),
    ("php", "PHP"),
    ("ruby", "Ruby"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("yaml", "YAML"),
    ("bash", "Bash"),
    ("powershell", "PowerShell"),
    ("dockerfile", "Dockerfile"),
    ("log", "Log File"),
    ("config", "Configuration"),
];

/// Human readable name for a language hint; unknown hints are shown as-is.
pub fn language_label(language: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(value, _)| *value == language)
        .map_or(language, |(_, label)| label)
}

fn heuristics() -> &'static [(&'static str, Regex)] {
    static HEURISTICS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    HEURISTICS.get_or_init(|| {
        [
            ("bash", r"\A#!\s*/(usr/)?bin/(env\s+)?(ba|z)?sh"),
            ("python", r"\A#!\s*/(usr/)?bin/(env\s+)?python"),
            ("dockerfile", r"(?m)^FROM\s+[\w./:@-]+(\s+AS\s+\w+)?\s*$"),
            ("html", r"(?i)\A\s*<(!doctype\s+html|html[\s>])"),
            ("xml", r"\A\s*<\?xml\s"),
            ("php", r"\A\s*<\?php"),
            ("rust", r"(?m)^\s*(pub\s+)?(fn\s+\w+\s*(<[^>]*>)?\s*\(|impl(<[^>]*>)?\s+\w+|use\s+\w+::|let\s+mut\s+\w+)"),
            ("go", r"(?m)^package\s+\w+\s*$|^func\s+(\(\w+\s+\*?\w+\)\s+)?\w+\("),
            ("python", r"(?m)^\s*(def\s+\w+\(.*\)\s*(->\s*[\w\[\], .]+)?:\s*$|from\s+[\w.]+\s+import\s+\w+|class\s+\w+(\(.*\))?:\s*$)"),
            ("typescript", r"(?m)^\s*(export\s+)?(interface\s+\w+\s*\{|type\s+\w+\s*=)|:\s*(string|number|boolean)\s*[;,)=]"),
            ("javascript", r"(?m)^\s*(const|let|var)\s+\w+\s*=|function\s+\w+\s*\(|=>\s*\{|console\.log\("),
            ("java", r"(?m)^\s*(public|private|protected)\s+(static\s+)?(class|void|final)\s"),
            ("csharp", r"(?m)^\s*using\s+System(\.\w+)*;|namespace\s+\w+(\.\w+)*\s*\{?\s*$"),
            ("cpp", r"(?m)^\s*#include\s*[<\x22]|std::\w+"),
            ("sql", r"(?is)\b(SELECT\s+.+\s+FROM|INSERT\s+INTO|CREATE\s+TABLE|UPDATE\s+\w+\s+SET|DELETE\s+FROM)\b"),
            ("css", r"(?m)^\s*[.#]?[\w-]+(\s*[.#:][\w-]+)*\s*\{\s*$\s*^\s*[\w-]+\s*:"),
            ("yaml", r"(?m)\A(---\s*$|[\w-]+:\s*(\S.*)?$)(\n([\w-]+:|\s+[\w-]+:|\s*-\s).*)+"),
            ("ruby", r"(?m)^\s*(def\s+\w+[?!]?\s*$|require\s+'[\w/]+'|puts\s)"),
            ("powershell", r"(?m)\$\w+\s*=|^\s*(Get|Set|New|Remove)-\w+"),
            ("log", r"(?m)^\[?\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}.*\b(INFO|WARN|ERROR|DEBUG|TRACE)\b"),
        ]
        .into_iter()
        .filter_map(|(language, pattern)| Regex::new(pattern).ok().map(|re| (language, re)))
        .collect()
    })
}

/// Best-effort guess at the language of `content`. Returns `"text"` when
/// nothing matches.
pub fn detect_language(content: &str) -> &'static str {
    let trimmed = content.trim();

    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if bracketed && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return "json";
    }

    heuristics()
        .iter()
        .find(|(_, re)| re.is_match(trimmed))
        .map_or("text", |(language, _)| language)
}

/// The language to render with: the explicit hint, or a detected one when
/// the hint is empty or `text`.
pub fn effective_language<'a>(content: &str, language: &'a str) -> &'a str {
    match language.trim() {
        "" | "text" => detect_language(content),
        language => language,
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn pretty_json(content: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

fn plain_html(content: &str) -> String {
    format!("<pre class=\"paste plain\">{}</pre>", escape_html(content))
}

/// Render decrypted content as an HTML fragment.
pub fn render_html(content: &str, format: Format, language: &str) -> String {
    match format {
        Format::PlainText => plain_html(content),
        Format::SourceCode => {
            let language = effective_language(content, language);
            let body = if language == "json" {
                pretty_json(content).unwrap_or_else(|| content.to_owned())
            } else {
                content.to_owned()
            };
            let class: String = language
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            format!(
                "<pre class=\"paste code\"><code class=\"language-{class}\">{}</code></pre>",
                escape_html(&body)
            )
        }
        Format::Markdown => match markdown::to_html_with_options(content, &markdown::Options::gfm()) {
            Ok(html) => format!("<div class=\"paste markdown\">{html}</div>"),
            Err(_) => plain_html(content),
        },
    }
}

/// Render decrypted content for a terminal.
pub fn render_terminal(content: &str, format: Format, language: &str) -> String {
    match format {
        Format::PlainText => content.to_owned(),
        Format::SourceCode => {
            if effective_language(content, language) == "json" {
                pretty_json(content).unwrap_or_else(|| content.to_owned())
            } else {
                content.to_owned()
            }
        }
        Format::Markdown => markdown_to_ansi(content),
    }
}
