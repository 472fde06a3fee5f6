//! Error types for embedded surfaces.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for surface operations.
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// Errors that can occur while driving a surface or its session.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The platform webview runtime could not be initialised.
    #[error("webview runtime initialization failed: {0}")]
    InitFailed(String),

    /// The surface could not be created inside its host window.
    #[error("failed to create surface: {0}")]
    CreateFailed(String),

    /// Navigation failed.
    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    /// JavaScript execution failed.
    #[error("JavaScript execution failed: {0}")]
    JsError(String),

    /// The session refused a cookie.
    #[error("failed to set cookie {name}: {reason}")]
    Cookie { name: String, reason: String },

    /// Removing stored browsing data failed.
    #[error("failed to clear {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The surface has no browsing session attached.
    #[error("no browsing session available")]
    NoSession,

    /// Error reported by the webview runtime.
    #[cfg(feature = "wry")]
    #[error("webview error: {0}")]
    Webview(#[from] wry::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
