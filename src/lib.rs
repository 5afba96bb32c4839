//! A markdown tutorials page.
//!
//! The page fetches a tutorial (or the landing `README.md`), renders it with
//! comrak, highlights its code blocks with syntect and adds navigation on
//! top: heading anchors, a smooth-scrolling table of contents that tracks
//! the current section, copy buttons and per-tutorial title and icon.
//!
//! [`controller::PageController`] holds all of that logic and talks to the
//! browser only through [`platform::Platform`]. Compiled for `wasm32`, the
//! `web` module provides the browser implementation and boots the page;
//! natively the crate also ships a small preview host ([`serve`]) for
//! working on a tutorials site locally.

pub mod config;
pub mod controller;
pub mod error;
pub mod highlight;
pub mod markdown;
pub mod platform;
pub mod slug;

#[cfg(not(target_arch = "wasm32"))]
pub mod serve;
#[cfg(not(target_arch = "wasm32"))]
mod web_assets;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::PageConfig;
pub use controller::{PageController, PageState};
pub use error::LoadError;
pub use platform::Platform;
