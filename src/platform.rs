//! Access to the page the controller runs in.
//!
//! The controller never touches `window` or `document` directly; it goes
//! through [`Platform`]. In the browser this is `web::WebPlatform`; tests
//! supply a synthetic document.
//!
//! Elements inside the content container are addressed by their position in
//! document order, matching the outline produced by
//! [`crate::markdown::render_markdown`]:
//!
//! - heading `i` is the i-th `h2`;
//! - TOC item `i` is the i-th `li` of the first `ol`;
//! - code block `i` is the i-th `pre > code`.

use crate::error::LoadError;

#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Query string of the current URL, including the leading `?` if any.
    fn location_search(&self) -> String;

    /// Fragment of the current URL, including the leading `#` if any.
    fn location_hash(&self) -> String;

    /// Fetch `path` relative to the page and return the body as text.
    ///
    /// A non-success status is an error.
    async fn fetch_text(&self, path: &str) -> Result<String, LoadError>;

    /// Replace the whole content container with `html`.
    fn set_content_html(&self, html: &str);

    /// Replace the inner HTML of code block `index` with highlighted markup
    /// and mark it as highlighted.
    fn set_code_html(&self, index: usize, html: &str);

    fn set_title(&self, title: &str);

    /// Make `href` the page icon, replacing every existing icon link.
    fn set_favicon(&self, href: &str);

    /// Remove every page icon link.
    fn remove_favicon(&self);

    /// Point the first image inside the content at `src`.
    fn set_first_image_src(&self, src: &str);

    fn set_back_label(&self, label: &str);

    /// Navigate away from the page.
    fn navigate(&self, href: &str);

    fn set_heading_id(&self, index: usize, id: &str);

    /// Distance in pixels from the viewport top to every heading, in
    /// document order. Called on every scroll event, so implementations
    /// should query the document once per call.
    fn heading_tops(&self) -> Vec<f64>;

    /// Smooth-scroll the element with `id` into view.
    ///
    /// Returns `false` when no element has that id.
    fn scroll_to_element(&self, id: &str) -> bool;

    /// Push `#fragment` onto the session history without navigating.
    fn push_fragment(&self, fragment: &str);

    fn set_toc_item_active(&self, index: usize, active: bool);

    /// Add a copy control labelled `label` next to code block `index`.
    fn append_copy_control(&self, index: usize, label: &str);

    fn set_copy_label(&self, index: usize, label: &str);

    async fn write_clipboard(&self, text: &str) -> Result<(), String>;
}
