//! Markdown rendering.
//!
//! Converts tutorial markdown to HTML using comrak with GFM extensions and
//! records the document outline the page controller later binds to: the
//! second-level headings, the table-of-contents list, and the code blocks.
//!
//! The outline is read from the same AST the HTML is produced from, so the
//! N-th entry of each list corresponds to the N-th matching element in the
//! injected markup.

use comrak::{
    format_html,
    nodes::{AstNode, ListType, NodeValue},
    parse_document, Arena, Options,
};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A code block as it appears in the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// First word of the fence info string, if any.
    pub language: Option<String>,
    /// The literal code, as copied to the clipboard.
    pub text: String,
}

/// One `<li>` of the table-of-contents list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Destination of the first link inside the item, if it has one.
    pub href: Option<String>,
}

/// Structure of a rendered document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    /// Plain-text content of every second-level heading.
    pub headings: Vec<String>,
    /// Items of the first ordered list, when the document has one.
    pub toc: Option<Vec<TocEntry>>,
    /// Every block-level code element (`<pre><code>`).
    pub code_blocks: Vec<CodeBlock>,
    /// Whether the document contains at least one image.
    pub has_image: bool,
}

/// HTML for the content container plus the outline it was built from.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub html: String,
    pub outline: Outline,
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Build comrak render options with GFM extensions.
///
/// Raw HTML in the source is omitted (`render.unsafe_ = false`) so every
/// heading and list in the output comes from markdown syntax and is present
/// in the outline.
fn make_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.render.unsafe_ = false;
    options
}

/// Text content of a node, matching what the DOM's `textContent` reports.
fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Text(s) => text.push_str(s),
            NodeValue::Code(c) => text.push_str(&c.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
            // Alt text is an attribute in the output, not text content.
            NodeValue::Image(_) | NodeValue::HtmlInline(_) => {}
            _ => text.push_str(&collect_text(child)),
        }
    }
    text
}

fn is_ordered_list<'a>(node: &'a AstNode<'a>) -> bool {
    matches!(&node.data.borrow().value, NodeValue::List(list) if list.list_type == ListType::Ordered)
}

fn is_list_item<'a>(node: &'a AstNode<'a>) -> bool {
    matches!(
        &node.data.borrow().value,
        NodeValue::Item(_) | NodeValue::TaskItem(_)
    )
}

fn first_link_url<'a>(node: &'a AstNode<'a>) -> Option<String> {
    node.descendants().find_map(|n| match &n.data.borrow().value {
        NodeValue::Link(link) => Some(link.url.clone()),
        _ => None,
    })
}

/// Items of the first ordered list in document order, nested items included
/// (a `querySelectorAll("li")` on that list sees them too).
fn extract_toc<'a>(root: &'a AstNode<'a>) -> Option<Vec<TocEntry>> {
    let list = root.descendants().find(|n| is_ordered_list(*n))?;
    let entries = list
        .descendants()
        .filter(|n| is_list_item(*n))
        .map(|item| TocEntry {
            href: first_link_url(item),
        })
        .collect();
    Some(entries)
}

fn extract_outline<'a>(root: &'a AstNode<'a>) -> Outline {
    let mut outline = Outline {
        toc: extract_toc(root),
        ..Outline::default()
    };

    for node in root.descendants() {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) if heading.level == 2 => {
                outline.headings.push(collect_text(node));
            }
            NodeValue::CodeBlock(block) => {
                let language = block
                    .info
                    .split_whitespace()
                    .next()
                    .map(|lang| lang.to_owned());
                outline.code_blocks.push(CodeBlock {
                    language,
                    text: block.literal.clone(),
                });
            }
            NodeValue::Image(_) => outline.has_image = true,
            _ => {}
        }
    }

    outline
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render a markdown string to HTML and extract its outline.
///
/// Logs `[render] headings=<n> toc=<n> code_blocks=<n>` at debug level.
pub fn render_markdown(input: &str) -> RenderedDocument {
    let arena = Arena::new();
    let options = make_options();
    let root = parse_document(&arena, input, &options);

    let outline = extract_outline(root);

    let mut html_bytes = Vec::new();
    format_html(root, &options, &mut html_bytes).expect("comrak HTML formatting should not fail");
    let html = String::from_utf8(html_bytes).expect("comrak output must be valid UTF-8");

    log::debug!(
        "[render] headings={} toc={} code_blocks={}",
        outline.headings.len(),
        outline.toc.as_ref().map_or(0, |toc| toc.len()),
        outline.code_blocks.len()
    );

    RenderedDocument { html, outline }
}

/// Minimal HTML entity escaping for text content and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
