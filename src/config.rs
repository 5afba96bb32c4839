//! Page and preview-host configuration.

/// Constants that shape one page view.
///
/// Everything the page controller would otherwise hard-code lives here so a
/// site can be re-hosted under different paths or labels.
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    /// Query parameter naming the tutorial to show.
    pub query_param: String,
    /// Directory (relative to the page) holding `<tutorial>.md` files.
    pub tutorials_dir: String,
    /// Document fetched when no tutorial is requested.
    pub default_document: String,
    /// Directory holding `<tutorial>.svg` icons.
    pub icons_dir: String,
    /// Title used on the landing page.
    pub default_title: String,
    /// Back-button target while a tutorial is shown.
    pub home_href: String,
    /// Back-button target and label on the landing page.
    pub repository_href: String,
    pub repository_label: String,
    /// A heading counts as "current" once its top is at or above this many
    /// pixels from the top of the viewport.
    pub active_threshold: f64,
    pub copy_label: String,
    pub copied_label: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            query_param: "tutorial".to_owned(),
            tutorials_dir: "tutorials".to_owned(),
            default_document: "README.md".to_owned(),
            icons_dir: "icons".to_owned(),
            default_title: "📚 Tutorials Hub".to_owned(),
            home_href: "./index.html".to_owned(),
            repository_href: "https://github.com/younes-alhyan/tutorials-hub".to_owned(),
            repository_label: "🌐 View on GitHub".to_owned(),
            active_threshold: 100.0,
            copy_label: "copy".to_owned(),
            copied_label: "copied!".to_owned(),
        }
    }
}

impl PageConfig {
    /// Request path for `tutorial`, or the landing document when absent.
    pub fn document_path(&self, tutorial: Option<&str>) -> String {
        match tutorial {
            Some(name) => format!("{}/{}.md", self.tutorials_dir, name),
            None => self.default_document.clone(),
        }
    }

    pub fn icon_path(&self, tutorial: &str) -> String {
        format!("{}/{}.svg", self.icons_dir, tutorial)
    }
}

/// Preview host settings, filled from the `serve` subcommand.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Site directory containing `index.html`, `README.md`, `tutorials/`,
    /// `icons/` and the wasm bundle under `pkg/`.
    pub root: std::path::PathBuf,
    pub bind: String,
    pub port: u16,
}
