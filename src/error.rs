//! Error types for the tutorials page and its preview host.

use thiserror::Error;

/// Failure to load the requested Markdown document.
///
/// This is the only error a page load surfaces to the reader; it is rendered
/// in place of the document and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The server answered with a non-success status.
    #[error("Tutorial not found (HTTP {status})")]
    Status { status: u16 },

    /// The request never produced a response (network unreachable, CORS, ...).
    #[error("{0}")]
    Network(String),

    /// The response arrived but its body could not be read as text.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl LoadError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn body(msg: impl Into<String>) -> Self {
        Self::Body(msg.into())
    }
}

/// The custom grammar could not be compiled into the syntax set.
#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("invalid syntax definition {name}: {message}")]
    Grammar { name: &'static str, message: String },
}

/// Errors from the native preview host.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("bind {addr} failed: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("exhausted {attempts} port candidates starting at {start}; all ports in use")]
    PortsExhausted { attempts: u16, start: u16 },

    #[error("site root {0} is not a directory")]
    NotADirectory(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
