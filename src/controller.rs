//! The tutorial page controller.
//!
//! One [`PageController`] drives one page view: it works out which tutorial
//! was requested, fetches and renders it, and then layers the navigation
//! conveniences on top of the injected HTML. Everything it learns during
//! [`PageController::load`] is kept in [`PageState`] so the event handlers
//! the binding layer registers can read it. The state sits behind a
//! `RefCell` and every method takes `&self`, so a controller shared through
//! `Rc` can answer clicks (the back button in particular) while its load is
//! still waiting on the network.
//!
//! Mutation order after the fetch is fixed:
//! render → highlight → title/icon → back button → TOC → copy buttons.
//! Scroll listener registration follows, done by the binding layer when
//! [`PageController::tracks_scroll`] is true.

use std::cell::{Ref, RefCell};

use crate::config::PageConfig;
use crate::error::LoadError;
use crate::highlight::Highlighter;
use crate::markdown::{html_escape, render_markdown, Outline, RenderedDocument};
use crate::platform::Platform;
use crate::slug;

/// What the controller knows about the current page view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageState {
    /// Tutorial named in the query string, if any.
    pub tutorial: Option<String>,
    /// Where the back button leads.
    pub back_href: String,
    /// Id assigned to each second-level heading, in document order.
    pub heading_ids: Vec<String>,
    /// Heading id each TOC item links to; `None` for items that are not
    /// wired (no link, or a link that is not a fragment).
    pub toc_targets: Vec<Option<String>>,
    /// Text of each code block, as copied to the clipboard.
    pub code_blocks: Vec<String>,
    /// Whether scroll events should update the active TOC item.
    pub tracks_scroll: bool,
}

pub struct PageController<P> {
    platform: P,
    config: PageConfig,
    highlighter: Highlighter,
    state: RefCell<PageState>,
}

impl<P: Platform> PageController<P> {
    pub fn new(platform: P, config: PageConfig) -> Self {
        let highlighter = Highlighter::new().unwrap_or_else(|e| {
            log::warn!("[highlight] falling back to default syntaxes: {e}");
            Highlighter::defaults()
        });
        Self::with_highlighter(platform, config, highlighter)
    }

    pub fn with_highlighter(platform: P, config: PageConfig, highlighter: Highlighter) -> Self {
        let state = PageState {
            back_href: config.home_href.clone(),
            ..PageState::default()
        };
        Self {
            platform,
            config,
            highlighter,
            state: RefCell::new(state),
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn state(&self) -> Ref<'_, PageState> {
        self.state.borrow()
    }

    // -----------------------------------------------------------------------
    // Load sequence
    // -----------------------------------------------------------------------

    /// Run the whole page-load sequence.
    ///
    /// On a load failure the content area already shows the error message
    /// when this returns; title and back button are still updated, the
    /// document enhancements are skipped. The landing page gets the same
    /// enhancements as a tutorial.
    pub async fn load(&self) -> Result<(), LoadError> {
        let path = self.request_path();
        let fetched = self.platform.fetch_text(&path).await;
        self.present(&path, fetched)
    }

    /// Work out which document the URL asks for and remember the tutorial.
    pub fn request_path(&self) -> String {
        let tutorial =
            tutorial_from_query(&self.platform.location_search(), &self.config.query_param);
        let path = self.config.document_path(tutorial.as_deref());
        log::info!(
            "[load] tutorial={} path={path}",
            tutorial.as_deref().unwrap_or("-")
        );
        self.state.borrow_mut().tutorial = tutorial;
        path
    }

    /// Everything after the fetch of `path`: inject, highlight, title and
    /// icon, back button, then the document enhancements.
    pub fn present(&self, path: &str, fetched: Result<String, LoadError>) -> Result<(), LoadError> {
        let rendered = self.render_document(path, fetched);

        self.update_title();
        self.update_back_button();

        let document = rendered?;
        self.replace_icon_image(&document.outline);
        self.bind_toc(&document.outline);
        self.add_copy_buttons(&document.outline);
        Ok(())
    }

    /// Render, inject, highlight; or show the load error.
    fn render_document(
        &self,
        path: &str,
        fetched: Result<String, LoadError>,
    ) -> Result<RenderedDocument, LoadError> {
        let markdown = match fetched {
            Ok(text) => text,
            Err(e) => {
                log::warn!("[load] path={path} error={e}");
                self.platform.set_content_html(&load_error_html(&e));
                return Err(e);
            }
        };

        let document = render_markdown(&markdown);
        self.platform.set_content_html(&document.html);
        self.highlight_all(&document.outline);
        Ok(document)
    }

    /// Highlight every code block now present in the content area.
    fn highlight_all(&self, outline: &Outline) {
        for (index, block) in outline.code_blocks.iter().enumerate() {
            let html = self
                .highlighter
                .highlight(block.language.as_deref(), &block.text);
            self.platform.set_code_html(index, &html);
        }
    }

    fn update_title(&self) {
        match self.state.borrow().tutorial.as_deref() {
            Some(tutorial) => {
                self.platform.set_title(&title_case(tutorial));
                self.platform.set_favicon(&self.config.icon_path(tutorial));
            }
            None => {
                self.platform.set_title(&self.config.default_title);
                self.platform.remove_favicon();
            }
        }
    }

    fn update_back_button(&self) {
        let mut state = self.state.borrow_mut();
        if state.tutorial.is_some() {
            state.back_href = self.config.home_href.clone();
        } else {
            state.back_href = self.config.repository_href.clone();
            self.platform.set_back_label(&self.config.repository_label);
        }
    }

    /// Tutorials open with their logo; point it at the tutorial's icon.
    fn replace_icon_image(&self, outline: &Outline) {
        if let Some(tutorial) = self.state.borrow().tutorial.as_deref() {
            if outline.has_image {
                self.platform
                    .set_first_image_src(&self.config.icon_path(tutorial));
            }
        }
    }

    fn bind_toc(&self, outline: &Outline) {
        let Some(toc) = outline.toc.as_ref() else {
            log::debug!("[toc] skipped reason=no-ordered-list");
            return;
        };
        if outline.headings.is_empty() {
            log::debug!("[toc] skipped reason=no-headings");
            return;
        }

        let heading_ids: Vec<String> = outline
            .headings
            .iter()
            .map(|text| slug::to_anchor(text))
            .collect();
        for (index, id) in heading_ids.iter().enumerate() {
            self.platform.set_heading_id(index, id);
        }

        let toc_targets: Vec<Option<String>> = toc
            .iter()
            .map(|entry| entry.href.as_deref().and_then(slug::fragment_target))
            .collect();

        log::debug!(
            "[toc] headings={} items={} wired={}",
            heading_ids.len(),
            toc_targets.len(),
            toc_targets.iter().filter(|t| t.is_some()).count()
        );

        {
            let mut state = self.state.borrow_mut();
            state.heading_ids = heading_ids;
            state.toc_targets = toc_targets;
            state.tracks_scroll = true;
        }

        self.scroll_to_location_hash();
    }

    /// Deep link: scroll to the section named by the URL fragment.
    ///
    /// Heading ids keep non-ASCII characters percent-encoded, so when the
    /// decoded fragment matches nothing the encoded form is tried as well.
    fn scroll_to_location_hash(&self) {
        let hash = self.platform.location_hash();
        let decoded = slug::decode_fragment(&hash);
        if decoded.is_empty() {
            return;
        }
        if self.platform.scroll_to_element(&decoded) {
            log::debug!("[toc] deep-link target={decoded}");
            return;
        }
        if let Some(encoded) = slug::fragment_target(&hash) {
            if encoded != decoded && self.platform.scroll_to_element(&encoded) {
                log::debug!("[toc] deep-link target={encoded}");
            }
        }
    }

    fn add_copy_buttons(&self, outline: &Outline) {
        for index in 0..outline.code_blocks.len() {
            self.platform
                .append_copy_control(index, &self.config.copy_label);
        }
        self.state.borrow_mut().code_blocks = outline
            .code_blocks
            .iter()
            .map(|block| block.text.clone())
            .collect();
    }

    // -----------------------------------------------------------------------
    // Binding-layer queries
    // -----------------------------------------------------------------------

    /// Indices of TOC items whose click should be intercepted.
    pub fn wired_toc_items(&self) -> Vec<usize> {
        self.state
            .borrow()
            .toc_targets
            .iter()
            .enumerate()
            .filter_map(|(index, target)| target.as_ref().map(|_| index))
            .collect()
    }

    pub fn code_block_count(&self) -> usize {
        self.state.borrow().code_blocks.len()
    }

    pub fn tracks_scroll(&self) -> bool {
        self.state.borrow().tracks_scroll
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    /// Click on TOC item `index`.
    ///
    /// Returns `true` when the click was handled and the browser's default
    /// navigation must be suppressed.
    pub fn on_toc_click(&self, index: usize) -> bool {
        let Some(target) = self.state.borrow().toc_targets.get(index).cloned().flatten() else {
            return false;
        };
        if !self.platform.scroll_to_element(&target) {
            log::debug!("[toc] click target={target} missing");
        }
        self.platform.push_fragment(&target);
        true
    }

    /// Recompute the active TOC item from heading positions.
    ///
    /// Returns the index of the TOC item now marked active, if any.
    pub fn on_scroll(&self) -> Option<usize> {
        let state = self.state.borrow();
        if !state.tracks_scroll {
            return None;
        }

        let positions = self.platform.heading_tops();
        let tops = (0..state.heading_ids.len()).map(|i| positions.get(i).copied());
        let current = active_heading(tops, self.config.active_threshold)
            .map(|i| state.heading_ids[i].as_str());
        let active_item = current.and_then(|id| {
            state
                .toc_targets
                .iter()
                .position(|target| target.as_deref() == Some(id))
        });

        for index in 0..state.toc_targets.len() {
            self.platform
                .set_toc_item_active(index, Some(index) == active_item);
        }
        active_item
    }

    /// Click on the copy control of code block `index`.
    pub async fn on_copy_click(&self, index: usize) {
        let Some(text) = self.state.borrow().code_blocks.get(index).cloned() else {
            return;
        };
        match self.platform.write_clipboard(&text).await {
            Ok(()) => self
                .platform
                .set_copy_label(index, &self.config.copied_label),
            Err(e) => log::error!("[copy] block={index} error={e}"),
        }
    }

    /// Pointer left the copy control of code block `index`.
    pub fn on_copy_leave(&self, index: usize) {
        if index < self.code_block_count() {
            self.platform.set_copy_label(index, &self.config.copy_label);
        }
    }

    /// Click on the back button. Valid at any time, including while the
    /// document is still loading.
    pub fn on_back_click(&self) {
        let href = self.state.borrow().back_href.clone();
        self.platform.navigate(&href);
    }
}

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Decode one `application/x-www-form-urlencoded` component.
fn form_decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Value of query parameter `name` in `search` (`?a=1&b=2`), with
/// `URLSearchParams` semantics. An empty value counts as absent.
pub fn tutorial_from_query(search: &str, name: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| form_decode(key) == name)
        .map(|(_, value)| form_decode(value))
        .filter(|value| !value.is_empty())
}

/// Upper-case the first character.
pub fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Index of the last heading whose top has reached `threshold` pixels from
/// the viewport top. Headings without a position are ignored.
pub fn active_heading(tops: impl IntoIterator<Item = Option<f64>>, threshold: f64) -> Option<usize> {
    tops.into_iter()
        .enumerate()
        .filter_map(|(index, top)| top.filter(|t| *t <= threshold).map(|_| index))
        .last()
}

/// Markup shown in place of a document that failed to load.
pub fn load_error_html(error: &LoadError) -> String {
    format!(
        "<p class=\"load-error\">❌ Failed to load tutorial: {}</p>",
        html_escape(&error.to_string())
    )
}
