//! Embedded web surfaces for the desktop shell.
//!
//! A surface is a webview placed inside an outer window at explicit bounds.
//! The shell uses two kinds: the *chrome* strip that renders the title bar,
//! and the *content* surface that renders the wrapped site. Each surface is
//! backed by a [`BrowsingSession`] holding cookies, caches and storage.
//!
//! # Features
//!
//! - `wry`: child webviews through the platform engine (default)

mod error;
mod profile;

#[cfg(feature = "wry")]
mod wry_backend;

pub use error::{Result, SurfaceError};
pub use profile::ProfileDirectory;

#[cfg(feature = "wry")]
pub use wry_backend::{SurfaceHooks, WryProfile, WrySurface, init_platform, pump_platform_events};

/// Rectangle inside the host window, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A cookie as handed to a [`BrowsingSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    /// Origin the cookie is set for, e.g. `https://example.com/`.
    pub url: String,
    pub name: String,
    pub value: String,
    /// Domain attribute, leading dot preserved.
    pub domain: String,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; `None` makes a session cookie.
    pub expiration_date: Option<i64>,
}

/// Categories of browsing data a session can clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    ShaderCache,
    ServiceWorkers,
    CacheStorage,
    Cookies,
    LocalStorage,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::ShaderCache => "shadercache",
            StorageKind::ServiceWorkers => "serviceworkers",
            StorageKind::CacheStorage => "cachestorage",
            StorageKind::Cookies => "cookies",
            StorageKind::LocalStorage => "localstorage",
        }
    }
}

/// Storage cleared by the cache maintenance action. Must never include
/// cookies or local storage.
pub const MAINTENANCE_STORAGES: [StorageKind; 3] = [
    StorageKind::ShaderCache,
    StorageKind::ServiceWorkers,
    StorageKind::CacheStorage,
];

/// Persistent store of cookies, caches and site storage behind a surface.
pub trait BrowsingSession {
    /// Install a cookie.
    fn set_cookie(&self, cookie: &SessionCookie) -> Result<()>;

    /// Drop the HTTP cache.
    fn clear_http_cache(&self) -> Result<()>;

    /// Clear the given storage categories and nothing else.
    fn clear_storage_data(&self, kinds: &[StorageKind]) -> Result<()>;

    /// Bytes currently held by the HTTP cache.
    fn cache_size(&self) -> Result<u64>;
}

/// A webview embedded in the host window.
pub trait ContentSurface {
    /// Navigate to a URL.
    fn navigate(&self, url: &str) -> Result<()>;

    /// Reload the current page.
    fn reload(&self) -> Result<()>;

    /// Move and resize the surface inside its host window.
    fn set_bounds(&self, bounds: Bounds) -> Result<()>;

    /// Run a script in the page without waiting for a result.
    fn evaluate_script(&self, script: &str) -> Result<()>;

    /// Session backing this surface, if still alive.
    fn session(&self) -> Option<&dyn BrowsingSession>;
}

/// What the runtime should do with a page's request to open a new window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupResponse {
    /// Let the engine open the window itself.
    Allow,
    /// Suppress the engine's window; the shell handles the URL.
    Deny,
}

/// Configuration for a surface.
#[derive(Debug, Clone)]
pub struct SurfaceConfig {
    pub bounds: Bounds,
    /// Initial page; `None` leaves the surface blank until navigated.
    pub url: Option<String>,
    /// Inline document, used instead of `url` when set.
    pub html: Option<String>,
    /// User agent string override.
    pub user_agent: Option<String>,
    /// Scripts injected into every document before page scripts run.
    pub initialization_scripts: Vec<String>,
    pub devtools: bool,
    /// RGBA painted before the first frame.
    pub background: Option<(u8, u8, u8, u8)>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::new(0, 0, 800, 600),
            url: None,
            html: None,
            user_agent: None,
            initialization_scripts: Vec::new(),
            devtools: false,
            background: None,
        }
    }
}

/// Builder for creating surfaces.
#[derive(Debug, Clone, Default)]
pub struct SurfaceBuilder {
    config: SurfaceConfig,
}

impl SurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.config.bounds = bounds;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.config.html = Some(html.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_initialization_script(mut self, script: impl Into<String>) -> Self {
        self.config.initialization_scripts.push(script.into());
        self
    }

    pub fn with_devtools(mut self, enabled: bool) -> Self {
        self.config.devtools = enabled;
        self
    }

    pub fn with_background(mut self, rgba: (u8, u8, u8, u8)) -> Self {
        self.config.background = Some(rgba);
        self
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Build a child webview inside `window`, sharing `profile`'s storage.
    #[cfg(feature = "wry")]
    pub fn build_wry<W>(
        self,
        window: &W,
        profile: &mut WryProfile,
        hooks: SurfaceHooks,
    ) -> Result<WrySurface>
    where
        W: wry::raw_window_handle::HasWindowHandle,
    {
        WrySurface::new(self.config, window, profile, hooks)
    }
}
