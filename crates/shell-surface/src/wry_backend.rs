//! Child webviews through `wry`.

use crate::{
    Bounds, BrowsingSession, ContentSurface, PopupResponse, ProfileDirectory, Result,
    SessionCookie, StorageKind, SurfaceConfig, SurfaceError,
};
use std::path::PathBuf;
use wry::cookie::Cookie;
use wry::dpi::{LogicalPosition, LogicalSize, Position, Size};
use wry::raw_window_handle::HasWindowHandle;
use wry::{NewWindowResponse, Rect, WebContext, WebView, WebViewBuilder};

type IpcHandler = Box<dyn Fn(String) + Send + Sync + 'static>;
type NewWindowHandler = Box<dyn Fn(&str) -> PopupResponse + Send + Sync + 'static>;

/// Initialise the platform toolkit the webviews run on. Call once, before
/// any surface is built.
///
/// Child webviews on Linux need an X11 parent, so GTK is pinned to X11 as
/// well; the event loop must be created with the X11 backend to match.
pub fn init_platform() -> Result<()> {
    #[cfg(target_os = "linux")]
    {
        gtk::gdk::set_allowed_backends("x11");
        gtk::init().map_err(|err| SurfaceError::InitFailed(err.to_string()))?;
    }
    Ok(())
}

/// Drain pending toolkit events. WebKitGTK only makes progress while its
/// main context is iterated, so call this on every event-loop turn.
pub fn pump_platform_events() {
    #[cfg(target_os = "linux")]
    while gtk::events_pending() {
        gtk::main_iteration_nocheck();
    }
}

/// Persistent profile shared by every surface built against it.
pub struct WryProfile {
    context: WebContext,
    directory: ProfileDirectory,
}

impl WryProfile {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let directory = ProfileDirectory::new(root);
        directory.ensure_exists()?;
        let context = WebContext::new(Some(directory.root().to_path_buf()));
        log::debug!("opened browsing profile at {}", directory.root().display());
        Ok(Self { context, directory })
    }
}

/// Callbacks a surface forwards to the shell. Both run on the UI thread.
#[derive(Default)]
pub struct SurfaceHooks {
    ipc: Option<IpcHandler>,
    new_window: Option<NewWindowHandler>,
}

impl SurfaceHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive `window.ipc.postMessage(..)` bodies from the page.
    pub fn on_ipc(mut self, handler: impl Fn(String) + Send + Sync + 'static) -> Self {
        self.ipc = Some(Box::new(handler));
        self
    }

    /// Decide on `window.open` and `target="_blank"` requests.
    pub fn on_new_window(
        mut self,
        handler: impl Fn(&str) -> PopupResponse + Send + Sync + 'static,
    ) -> Self {
        self.new_window = Some(Box::new(handler));
        self
    }
}

/// A `wry` child webview and the profile it stores data in.
pub struct WrySurface {
    webview: WebView,
    profile: ProfileDirectory,
}

impl WrySurface {
    pub(crate) fn new<W: HasWindowHandle>(
        config: SurfaceConfig,
        window: &W,
        profile: &mut WryProfile,
        hooks: SurfaceHooks,
    ) -> Result<Self> {
        let directory = profile.directory.clone();
        let mut builder = WebViewBuilder::new_with_web_context(&mut profile.context)
            .with_bounds(to_rect(config.bounds))
            .with_devtools(config.devtools);

        if let Some(html) = config.html {
            builder = builder.with_html(html);
        } else if let Some(url) = config.url {
            builder = builder.with_url(url);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.with_user_agent(user_agent);
        }
        if let Some(rgba) = config.background {
            builder = builder.with_background_color(rgba);
        }
        for script in config.initialization_scripts {
            builder = builder.with_initialization_script(script);
        }

        if let Some(ipc) = hooks.ipc {
            builder = builder
                .with_ipc_handler(move |request: wry::http::Request<String>| {
                    ipc(request.into_body())
                });
        }
        if let Some(new_window) = hooks.new_window {
            builder = builder.with_new_window_req_handler(move |url: String, _features| {
                match new_window(&url) {
                    PopupResponse::Allow => NewWindowResponse::Allow,
                    PopupResponse::Deny => NewWindowResponse::Deny,
                }
            });
        }

        let webview = builder
            .build_as_child(window)
            .map_err(|err| SurfaceError::CreateFailed(err.to_string()))?;

        Ok(Self {
            webview,
            profile: directory,
        })
    }

    pub fn focus(&self) {
        if let Err(err) = self.webview.focus() {
            log::debug!("failed to focus surface: {err}");
        }
    }
}

impl ContentSurface for WrySurface {
    fn navigate(&self, url: &str) -> Result<()> {
        self.webview
            .load_url(url)
            .map_err(|err| SurfaceError::NavigationFailed(format!("{url}: {err}")))
    }

    fn reload(&self) -> Result<()> {
        self.webview.reload()?;
        Ok(())
    }

    fn set_bounds(&self, bounds: Bounds) -> Result<()> {
        self.webview.set_bounds(to_rect(bounds))?;
        Ok(())
    }

    fn evaluate_script(&self, script: &str) -> Result<()> {
        self.webview
            .evaluate_script(script)
            .map_err(|err| SurfaceError::JsError(err.to_string()))
    }

    fn session(&self) -> Option<&dyn BrowsingSession> {
        Some(self)
    }
}

impl BrowsingSession for WrySurface {
    fn set_cookie(&self, cookie: &SessionCookie) -> Result<()> {
        self.webview
            .set_cookie(&to_engine_cookie(cookie))
            .map_err(|err| SurfaceError::Cookie {
                name: cookie.name.clone(),
                reason: err.to_string(),
            })
    }

    fn clear_http_cache(&self) -> Result<()> {
        self.profile.clear_http_cache()
    }

    fn clear_storage_data(&self, kinds: &[StorageKind]) -> Result<()> {
        self.profile.clear(kinds)
    }

    fn cache_size(&self) -> Result<u64> {
        self.profile.http_cache_size()
    }
}

fn to_rect(bounds: Bounds) -> Rect {
    Rect {
        position: Position::Logical(LogicalPosition::new(bounds.x as f64, bounds.y as f64)),
        size: Size::Logical(LogicalSize::new(
            bounds.width as f64,
            bounds.height as f64,
        )),
    }
}

fn to_engine_cookie(cookie: &SessionCookie) -> Cookie<'static> {
    let mut builder = Cookie::build((cookie.name.clone(), cookie.value.clone()))
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .secure(cookie.secure);

    if let Some(seconds) = cookie.expiration_date {
        match time::OffsetDateTime::from_unix_timestamp(seconds) {
            Ok(expires) => builder = builder.expires(expires),
            Err(err) => log::debug!("cookie {} keeps session expiry: {err}", cookie.name),
        }
    }

    builder.build()
}
