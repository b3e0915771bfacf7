//! HTML fragment to plain text.
//!
//! The reply container's HTML is walked once and rendered with a handful of
//! block rules: buttons vanish, table rows become tab-separated lines,
//! headings and paragraphs are set off by blank lines and links keep their
//! target in parentheses. Everything else contributes its text content.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node};

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex pattern"));

/// Normalize an HTML fragment into plain text.
///
/// Never fails: `None` and `""` both yield `""`.
pub fn normalize_html(html: Option<&str>) -> String {
    let html = match html {
        Some(h) if !h.trim().is_empty() => h,
        _ => return String::new(),
    };

    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    render_children(fragment.root_element(), Mode::Blocks, &mut out);

    EXCESS_NEWLINES
        .replace_all(&out, "\n\n")
        .trim()
        .to_string()
}

/// Table cells and headings are flattened before links and paragraphs are
/// converted, so inside them only the text survives.
#[derive(Clone, Copy)]
enum Mode {
    Blocks,
    Text,
}

fn render_children(element: ElementRef<'_>, mode: Mode, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    render_element(el, mode, out);
                }
            }
            _ => {}
        }
    }
}

fn render_element(element: ElementRef<'_>, mode: Mode, out: &mut String) {
    match (element.value().name(), mode) {
        ("button" | "script" | "style", _) => {}
        ("table", _) => {
            out.push('\n');
            out.push_str(&render_table(element));
            out.push('\n');
        }
        ("h1" | "h2" | "h3" | "h4" | "h5" | "h6", Mode::Blocks) => {
            out.push_str("\n\n");
            out.push_str(render_text(element).trim());
            out.push_str("\n\n");
        }
        ("a", Mode::Blocks) => {
            let text = render_text(element);
            match element.value().attr("href") {
                Some(href) if !href.is_empty() => {
                    out.push_str(text.trim());
                    out.push_str(" (");
                    out.push_str(href);
                    out.push(')');
                }
                _ => out.push_str(&text),
            }
        }
        ("p", Mode::Blocks) => {
            out.push_str("\n\n");
            render_children(element, mode, out);
            out.push_str("\n\n");
        }
        _ => render_children(element, mode, out),
    }
}

fn render_text(element: ElementRef<'_>) -> String {
    let mut s = String::new();
    render_children(element, Mode::Text, &mut s);
    s
}

fn child_elements<'a>(
    element: ElementRef<'a>,
    names: &'a [&'a str],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |el| names.iter().any(|n| *n == el.value().name()))
}

/// Rows owned by `table`: direct `tr` children and those of its row groups.
/// Rows of nested tables belong to the cell that holds them.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(child_elements(child, &["tr"])),
            _ => {}
        }
    }
    rows
}

/// One line per row, cells separated by tabs.
fn render_table(table: ElementRef<'_>) -> String {
    table_rows(table)
        .into_iter()
        .filter_map(|row| {
            let cells: Vec<String> = child_elements(row, &["td", "th"])
                .map(|cell| {
                    render_text(cell)
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            (!cells.is_empty()).then(|| cells.join("\t"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
