//! Synthetic document used to drive the page controller without a browser.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use tutorials_hub::{LoadError, Platform};

/// Observable state of the fake page.
#[derive(Debug, Default)]
pub struct Dom {
    pub search: String,
    pub hash: String,
    pub content: String,
    pub code_html: BTreeMap<usize, String>,
    pub title: String,
    /// `href` of every icon link in `<head>`.
    pub favicons: Vec<String>,
    pub first_image_src: Option<String>,
    pub back_label: String,
    pub navigations: Vec<String>,
    pub heading_ids: BTreeMap<usize, String>,
    /// Distance from the viewport top per heading, in document order.
    pub heading_tops: Vec<f64>,
    /// Ids present outside the rendered document (page shell).
    pub shell_ids: Vec<String>,
    pub scrolled_to: Vec<String>,
    pub history: Vec<String>,
    pub active_items: BTreeSet<usize>,
    /// One `(code block, label)` entry per copy control.
    pub copy_controls: Vec<(usize, String)>,
    pub clipboard: Option<String>,
    pub fetched: Vec<String>,
    /// Names of mutating calls, in call order.
    pub ops: Vec<&'static str>,
}

impl Dom {
    pub fn copy_labels(&self, block: usize) -> Vec<&str> {
        self.copy_controls
            .iter()
            .filter(|(b, _)| *b == block)
            .map(|(_, label)| label.as_str())
            .collect()
    }

    fn has_id(&self, id: &str) -> bool {
        self.heading_ids.values().any(|h| h == id) || self.shell_ids.iter().any(|s| s == id)
    }
}

pub struct FakePage {
    pub dom: RefCell<Dom>,
    files: HashMap<String, String>,
    clipboard_error: Option<String>,
    /// While set, `fetch_text` stays pending.
    fetch_held: Cell<bool>,
}

impl FakePage {
    /// A page at `?<search>` with the standard shell.
    pub fn new(search: &str) -> Self {
        let dom = Dom {
            search: search.to_owned(),
            content: "<p class=\"loading\">Loading…</p>".to_owned(),
            title: "📚 Tutorials Hub".to_owned(),
            back_label: "⬅ Back".to_owned(),
            shell_ids: vec!["content".to_owned(), "backBtn".to_owned()],
            ..Dom::default()
        };
        Self {
            dom: RefCell::new(dom),
            files: HashMap::new(),
            clipboard_error: None,
            fetch_held: Cell::new(false),
        }
    }

    pub fn with_file(mut self, path: &str, body: &str) -> Self {
        self.files.insert(path.to_owned(), body.to_owned());
        self
    }

    pub fn with_hash(self, hash: &str) -> Self {
        self.dom.borrow_mut().hash = hash.to_owned();
        self
    }

    pub fn with_favicon(self, href: &str) -> Self {
        self.dom.borrow_mut().favicons.push(href.to_owned());
        self
    }

    pub fn with_content(self, html: &str) -> Self {
        self.dom.borrow_mut().content = html.to_owned();
        self
    }

    pub fn with_clipboard_error(mut self, message: &str) -> Self {
        self.clipboard_error = Some(message.to_owned());
        self
    }

    /// Keep the document request in flight until [`FakePage::release_fetch`].
    pub fn with_held_fetch(self) -> Self {
        self.fetch_held.set(true);
        self
    }

    pub fn release_fetch(&self) {
        self.fetch_held.set(false);
    }

    pub fn set_heading_tops(&self, tops: &[f64]) {
        self.dom.borrow_mut().heading_tops = tops.to_vec();
    }
}

impl Platform for FakePage {
    fn location_search(&self) -> String {
        self.dom.borrow().search.clone()
    }

    fn location_hash(&self) -> String {
        self.dom.borrow().hash.clone()
    }

    async fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        self.dom.borrow_mut().fetched.push(path.to_owned());
        while self.fetch_held.get() {
            tokio::task::yield_now().await;
        }
        match path {
            "offline.md" => Err(LoadError::network("NetworkError when attempting to fetch resource.")),
            _ => self
                .files
                .get(path)
                .cloned()
                .ok_or(LoadError::Status { status: 404 }),
        }
    }

    fn set_content_html(&self, html: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("content");
        dom.content = html.to_owned();
        dom.code_html.clear();
        dom.heading_ids.clear();
        dom.active_items.clear();
        dom.copy_controls.clear();
        dom.first_image_src = None;
    }

    fn set_code_html(&self, index: usize, html: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("highlight");
        dom.code_html.insert(index, html.to_owned());
    }

    fn set_title(&self, title: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("title");
        dom.title = title.to_owned();
    }

    fn set_favicon(&self, href: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("favicon");
        dom.favicons = vec![href.to_owned()];
    }

    fn remove_favicon(&self) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("favicon");
        dom.favicons.clear();
    }

    fn set_first_image_src(&self, src: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("image");
        dom.first_image_src = Some(src.to_owned());
    }

    fn set_back_label(&self, label: &str) {
        self.dom.borrow_mut().back_label = label.to_owned();
    }

    fn navigate(&self, href: &str) {
        self.dom.borrow_mut().navigations.push(href.to_owned());
    }

    fn set_heading_id(&self, index: usize, id: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("heading-id");
        dom.heading_ids.insert(index, id.to_owned());
    }

    fn heading_tops(&self) -> Vec<f64> {
        self.dom.borrow().heading_tops.clone()
    }

    fn scroll_to_element(&self, id: &str) -> bool {
        let mut dom = self.dom.borrow_mut();
        if !dom.has_id(id) {
            return false;
        }
        dom.scrolled_to.push(id.to_owned());
        true
    }

    fn push_fragment(&self, fragment: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.history.push(fragment.to_owned());
        dom.hash = format!("#{fragment}");
    }

    fn set_toc_item_active(&self, index: usize, active: bool) {
        let mut dom = self.dom.borrow_mut();
        if active {
            dom.active_items.insert(index);
        } else {
            dom.active_items.remove(&index);
        }
    }

    fn append_copy_control(&self, index: usize, label: &str) {
        let mut dom = self.dom.borrow_mut();
        dom.ops.push("copy-control");
        dom.copy_controls.push((index, label.to_owned()));
    }

    fn set_copy_label(&self, index: usize, label: &str) {
        let mut dom = self.dom.borrow_mut();
        for (block, current) in dom.copy_controls.iter_mut() {
            if *block == index {
                *current = label.to_owned();
            }
        }
    }

    async fn write_clipboard(&self, text: &str) -> Result<(), String> {
        if let Some(message) = &self.clipboard_error {
            return Err(message.clone());
        }
        self.dom.borrow_mut().clipboard = Some(text.to_owned());
        Ok(())
    }
}

/// A tutorial with a TOC, two sections and two code blocks.
pub const RUST_TUTORIAL: &str = "\
# Rust

![rust](rust.png)

1. [Intro](#intro)
2. [Install](#install)

## Intro

Rust is a systems language.

```rust
fn main() {
    println!(\"hi\");
}
```

## Install

```bash
curl --proto '=https' -sSf https://sh.rustup.rs | sh
```
";

pub const LANDING: &str = "\
# Tutorials Hub

- [Rust](index.html?tutorial=rust)
- [Git](index.html?tutorial=git)
";
