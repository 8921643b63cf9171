//! Markdown-lite rendering for analyzer output.
//!
//! The generative service is prompted to answer with a tiny Markdown subset:
//! `**bold**` spans and `* ` bullet lines. [`MarkdownLite`] parses exactly that
//! subset into tagged blocks and renders them as HTML; anything else stays
//! literal text. Text is HTML-escaped, so the output is safe to inject.
//!
//! [`CommonMark`] is a drop-in alternative backed by `pulldown-cmark` for when
//! the service starts emitting richer Markdown.

use pulldown_cmark::{html, Event, Options, Parser, Tag};
use std::str::FromStr;
use std::sync::Arc;

/// Class list on the `<ul>` wrapping a run of bullet lines.
pub const LIST_CLASS: &str = "list-disc list-outside pl-5 mt-2";

/// Class list on each `<li>`.
pub const ITEM_CLASS: &str = "mt-2";

/// Converts generated text into displayable markup.
pub trait MarkupRenderer: Send + Sync {
    /// HTML for direct display.
    fn render(&self, raw: &str) -> String;

    /// The text a reader sees, without markup (used for copy-to-clipboard).
    fn plain_text(&self, raw: &str) -> String;
}

// =============================================================================
// Parse tree
// =============================================================================

/// An inline span within a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Plain(String),
    Bold(String),
}

/// A line-level block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A non-bullet line (possibly empty)
    Line(Vec<Inline>),
    /// A run of consecutive `* ` lines
    List(Vec<Vec<Inline>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse the Markdown-lite subset. Never fails.
    pub fn parse(raw: &str) -> Self {
        let mut blocks: Vec<Block> = Vec::new();

        for line in raw.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);

            match line.strip_prefix("* ") {
                Some(item) => {
                    let spans = parse_inline(item);
                    if let Some(Block::List(items)) = blocks.last_mut() {
                        items.push(spans);
                    } else {
                        blocks.push(Block::List(vec![spans]));
                    }
                }
                None => blocks.push(Block::Line(parse_inline(line))),
            }
        }

        Self { blocks }
    }

    pub fn to_html(&self) -> String {
        let rendered: Vec<String> = self
            .blocks
            .iter()
            .map(|block| match block {
                Block::Line(spans) => inline_html(spans),
                Block::List(items) => {
                    let items: Vec<String> = items
                        .iter()
                        .map(|spans| {
                            format!("<li class=\"{}\">{}</li>", ITEM_CLASS, inline_html(spans))
                        })
                        .collect();
                    format!("<ul class=\"{}\">{}</ul>", LIST_CLASS, items.join("\n"))
                }
            })
            .collect();

        rendered.join("\n")
    }

    pub fn to_plain_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Line(spans) => lines.push(inline_text(spans)),
                Block::List(items) => lines.extend(items.iter().map(|spans| inline_text(spans))),
            }
        }
        lines.join("\n")
    }
}

/// Split a line into plain and `**bold**` spans. Bold spans are non-greedy and
/// never cross a line; an unmatched `**` is kept as literal text.
fn parse_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("**") else {
            break;
        };

        if open > 0 {
            spans.push(Inline::Plain(rest[..open].to_string()));
        }
        spans.push(Inline::Bold(after[..close].to_string()));
        rest = &after[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Inline::Plain(rest.to_string()));
    }
    spans
}

fn inline_html(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Plain(text) => escape_html(text),
            Inline::Bold(text) => format!("<strong>{}</strong>", escape_html(text)),
        })
        .collect()
}

fn inline_text(spans: &[Inline]) -> String {
    spans
        .iter()
        .map(|span| match span {
            Inline::Plain(text) | Inline::Bold(text) => text.as_str(),
        })
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// =============================================================================
// Renderers
// =============================================================================

/// Bold spans and bullet lists only.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownLite;

impl MarkupRenderer for MarkdownLite {
    fn render(&self, raw: &str) -> String {
        Document::parse(raw).to_html()
    }

    fn plain_text(&self, raw: &str) -> String {
        Document::parse(raw).to_plain_text()
    }
}

/// Full CommonMark via pulldown-cmark. Raw HTML in the input is emitted as
/// escaped text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMark;

impl MarkupRenderer for CommonMark {
    fn render(&self, raw: &str) -> String {
        let parser = Parser::new_ext(raw, Options::ENABLE_STRIKETHROUGH).map(|event| match event {
            Event::Html(html) => Event::Text(html),
            other => other,
        });

        let mut out = String::with_capacity(raw.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    fn plain_text(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for event in Parser::new(raw) {
            match event {
                Event::Text(text) | Event::Code(text) | Event::Html(text) => out.push_str(&text),
                Event::SoftBreak | Event::HardBreak => out.push('\n'),
                Event::End(Tag::Paragraph | Tag::Item | Tag::Heading(..)) => {
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
        out.trim_end().to_string()
    }
}

/// Renderer selection, as configured by `MARKUP_RENDERER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Lite,
    CommonMark,
}

impl RendererKind {
    pub fn build(self) -> Arc<dyn MarkupRenderer> {
        match self {
            RendererKind::Lite => Arc::new(MarkdownLite),
            RendererKind::CommonMark => Arc::new(CommonMark),
        }
    }
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lite" | "markdown-lite" => Ok(RendererKind::Lite),
            "commonmark" | "pulldown" => Ok(RendererKind::CommonMark),
            other => Err(format!("unknown markup renderer '{}'", other)),
        }
    }
}
