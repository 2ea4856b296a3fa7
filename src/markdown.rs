use markdown::mdast::Node;
use markdown::{to_mdast, ParseOptions};
use textwrap::{fill, indent as prefix};

use crate::render::escape_html;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_UNDERLINE: &str = "\x1b[4m";

const ANSI_RESET: &str = "\x1b[0m";

const FILL_WIDTH: usize = 80;
const INDENT_AMOUNT: usize = 4;

/// Render markdown to manpage-style HTML.
pub fn markdown_to_html(source: &str) -> String {
    let rendered = ansi_to_html::convert_escaped(&markdown_to_ansi(source))
        .unwrap_or_else(|_| escape_html(source));
    format!("<code style=\"white-space: pre\">{rendered}</code>")
}

/// Render markdown to manpage-style ANSI-styled text. Input that cannot be
/// parsed is returned unchanged.
pub fn markdown_to_ansi(source: &str) -> String {
    let Ok(root) = to_mdast(source, &ParseOptions::default()) else {
        return source.to_owned();
    };
    let mut level = 0;
    let body = render_node(&root, &mut level);
    format!("{}\n", body.trim_end())
}

fn render_nodes(nodes: &[Node], level: &mut usize) -> String {
    nodes
        .iter()
        .map(|n| render_node(n, level))
        .fold(String::new(), |acc, s| acc + &s)
}

fn render_inline(nodes: &[Node]) -> String {
    let mut level = 0;
    render_nodes(nodes, &mut level)
}

fn render_node(node: &Node, level: &mut usize) -> String {
    let mut contents = match node {
        Node::Root(node) => render_nodes(&node.children, level),

        Node::Heading(node) => {
            // make subsequent nodes be at this 0-based level
            *level = (node.depth as usize).saturating_sub(1);

            let inner = render_inline(&node.children);
            if *level == 0 {
                // render top-level headings as unstyled center text
                let pad = FILL_WIDTH.saturating_sub(inner.chars().count()) / 2;
                format!("{}{}\n\n", " ".repeat(pad.saturating_sub(1)), inner)
            } else {
                // render all other headings as bold
                indent_wrap(
                    &format!("{ANSI_BOLD}{inner}{ANSI_RESET}\n"),
                    level.saturating_sub(1),
                )
            }
        }

        Node::Text(node) => node.value.clone(),

        Node::Strong(node) => {
            format!("{ANSI_BOLD}{}{ANSI_RESET}", render_inline(&node.children))
        }
        Node::Emphasis(node) => {
            format!("{ANSI_ITALIC}{}{ANSI_RESET}", render_inline(&node.children))
        }
        Node::InlineCode(node) => node.value.clone(),
        Node::Break(_) => "\n".to_owned(),

        Node::Link(node) => {
            let value = render_inline(&node.children);
            if value == node.url {
                format!("{ANSI_UNDERLINE}{}{ANSI_RESET}", node.url)
            } else {
                format!("{} ({ANSI_UNDERLINE}{}{ANSI_RESET})", value, node.url)
            }
        }

        Node::Paragraph(node) => indent_wrap(&render_inline(&node.children), *level),
        Node::Blockquote(node) => {
            indent(&prefix(&render_inline(&node.children), "> "), *level)
        }
        Node::Code(node) => indent(&node.value, *level + 1),
        Node::List(list) => {
            let mut start = list.start.unwrap_or(1);
            list.children
                .iter()
                .map(|item| {
                    let bullet = if list.ordered {
                        start += 1;
                        format!("{}. ", start - 1)
                    } else {
                        "- ".to_owned()
                    };
                    let text = match item {
                        Node::ListItem(item) => render_inline(&item.children),
                        other => render_inline(std::slice::from_ref(other)),
                    };
                    indent(&format!("{bullet}{}", text.trim_end()), *level)
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Node::ThematicBreak(_) => indent(&"-".repeat(FILL_WIDTH / 2), *level),

        // anything else degrades to its plain text content
        other => other.to_string(),
    };

    let is_block = matches!(
        node,
        Node::Paragraph(_) | Node::Blockquote(_) | Node::Code(_) | Node::List(_) | Node::ThematicBreak(_)
    );
    if is_block {
        contents.push_str("\n\n");
    }

    contents
}

fn indent_wrap(text: &str, level: usize) -> String {
    let width = FILL_WIDTH.saturating_sub(INDENT_AMOUNT * level).max(20);
    indent(&fill(text, width), level)
}

fn indent(text: &str, level: usize) -> String {
    prefix(text, &" ".repeat(INDENT_AMOUNT * level))
}
