//! Embedded static web assets for the preview host.
//!
//! Compiled into the binary via `include_str!` so a tutorials site without
//! its own page shell or stylesheet can still be previewed.

/// Page shell served at `/` when the site root has no `index.html`.
///
/// Provides `#backBtn` and `#content` and boots the wasm bundle from
/// `./pkg/tutorials_hub.js`.
pub const INDEX_HTML: &str = include_str!("assets/index.html");

/// Stylesheet for the page shell, copy controls and active TOC items.
pub const CSS: &str = include_str!("assets/hub.css");

/// Bundled syntect theme used for `/assets/highlight.css`.
pub const HIGHLIGHT_THEME: &str = "InspiredGitHub";
