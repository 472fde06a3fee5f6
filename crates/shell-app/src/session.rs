//! The window controller: one outer window, the chrome strip above and the
//! content surface below it.
//!
//! Lifecycle: `AwaitingChrome → Running → Closed`. The content surface is
//! created once the chrome page reports the engine's user agent (or right
//! away when a custom one is configured). Cookies are imported into its
//! session before the first navigation is issued.

use crate::chrome::{self, ChromeStyle};
use crate::layout;
use crate::maintenance::{self, MaintenanceOutcome, Prompt, Relauncher};
use crate::menu;
use crate::user_agent::strip_product_tokens;
use anyhow::{Context, Result};
use shell_config::ShellConfig;
use shell_state::{WindowState, WindowStateStore};
use shell_surface::{BrowsingSession, ContentSurface, SurfaceBuilder};
use shell_window::WindowOptions;
use std::path::PathBuf;

/// What the controller needs from the outer window. Sizes are logical.
pub trait HostWindow {
    /// Size of the area the surfaces are laid out in.
    fn content_size(&self) -> (u32, u32);

    /// Outer position and inner size, as persisted on close.
    fn current_state(&self) -> WindowState;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingChrome,
    Running,
    Closed,
}

pub struct ShellSession<S: ContentSurface> {
    config: ShellConfig,
    store: WindowStateStore,
    cookie_file: Option<PathBuf>,
    phase: Phase,
    chrome: Option<S>,
    content: Option<S>,
}

impl<S: ContentSurface> ShellSession<S> {
    pub fn new(config: ShellConfig) -> Self {
        let defaults = WindowState::sized(config.window.width, config.window.height);
        let store = WindowStateStore::new(config.state_file()).with_defaults(defaults);
        let cookie_file = config.cookie_file();
        Self {
            config,
            store,
            cookie_file,
            phase: Phase::AwaitingChrome,
            chrome: None,
            content: None,
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn content(&self) -> Option<&S> {
        self.content.as_ref()
    }

    pub fn chrome(&self) -> Option<&S> {
        self.chrome.as_ref()
    }

    pub fn content_session(&self) -> Option<&dyn BrowsingSession> {
        self.content.as_ref().and_then(|content| content.session())
    }

    /// Outer window built from the stored geometry.
    pub fn window_options(&self) -> WindowOptions {
        let state = self.store.load();
        let window = &self.config.window;
        WindowOptions::new(&self.config.app.title)
            .with_size(state.width, state.height)
            .with_position(state.position())
            .with_min_size(window.min_width, window.min_height)
            .with_decorations(window.native_decorations)
    }

    /// Whether the content surface has to wait for the chrome's user agent.
    pub fn needs_user_agent_probe(&self) -> bool {
        self.config.user_agent.custom.is_none()
    }

    pub fn chrome_builder(&self, window: &dyn HostWindow) -> SurfaceBuilder {
        let (width, height) = window.content_size();
        let style = ChromeStyle {
            title: self.config.app.title.clone(),
            background: self.config.window.header_background.clone(),
            foreground: self.config.window.header_foreground.clone(),
            header_height: self.config.window.header_height,
            window_controls: !self.config.window.native_decorations,
        };
        let mut builder = SurfaceBuilder::new()
            .with_bounds(layout::chrome_bounds(
                width,
                height,
                self.config.window.header_height,
            ))
            .with_html(chrome::chrome_html(&style))
            .with_initialization_script(chrome::RELOAD_SHORTCUT_SCRIPT)
            .with_devtools(self.config.app.devtools);
        if let Some(rgba) = chrome::hex_rgba(&style.background) {
            builder = builder.with_background(rgba);
        }
        builder
    }

    pub fn attach_chrome(&mut self, chrome: S) {
        self.chrome = Some(chrome);
    }

    /// User agent for the content surface: the configured one, or the
    /// engine's with the listed product tokens removed.
    pub fn content_user_agent(&self, engine_user_agent: Option<&str>) -> Option<String> {
        if let Some(custom) = &self.config.user_agent.custom {
            return Some(custom.clone());
        }
        engine_user_agent
            .map(|ua| strip_product_tokens(ua, &self.config.user_agent.strip_products))
    }

    pub fn content_builder(
        &self,
        window: &dyn HostWindow,
        engine_user_agent: Option<&str>,
    ) -> SurfaceBuilder {
        let (width, height) = window.content_size();
        let mut builder = SurfaceBuilder::new()
            .with_bounds(layout::content_bounds(
                width,
                height,
                self.config.window.header_height,
            ))
            .with_initialization_script(chrome::RELOAD_SHORTCUT_SCRIPT)
            .with_devtools(self.config.app.devtools);
        if let Some(user_agent) = self.content_user_agent(engine_user_agent) {
            log::debug!("content user agent: {user_agent}");
            builder = builder.with_user_agent(user_agent);
        }
        builder
    }

    /// Create the content surface, size it, import cookies, then navigate.
    ///
    /// Later calls (the chrome page reloading and reporting again) are
    /// ignored.
    pub fn start_content<F>(
        &mut self,
        window: &dyn HostWindow,
        engine_user_agent: Option<&str>,
        create: F,
    ) -> Result<()>
    where
        F: FnOnce(SurfaceBuilder) -> Result<S>,
    {
        if self.phase != Phase::AwaitingChrome {
            log::debug!("content surface already started ({:?})", self.phase);
            return Ok(());
        }

        let builder = self.content_builder(window, engine_user_agent);
        let content = create(builder).context("failed to create the content surface")?;
        self.content = Some(content);
        self.phase = Phase::Running;
        self.resize(window);

        self.import_cookies();

        let url = &self.config.app.url;
        if let Some(content) = &self.content {
            content
                .navigate(url)
                .with_context(|| format!("failed to load {url}"))?;
            log::info!("Loading {}", url);
        }
        Ok(())
    }

    fn import_cookies(&self) {
        let Some(path) = &self.cookie_file else {
            return;
        };
        match self.content_session() {
            Some(session) => {
                shell_cookies::import(session, path);
            }
            None => log::warn!("content surface has no session; cookies not imported"),
        }
    }

    /// Lay both surfaces out for the window's current size.
    pub fn resize(&self, window: &dyn HostWindow) {
        let (width, height) = window.content_size();
        let header = self.config.window.header_height;
        if let Some(chrome) = &self.chrome
            && let Err(err) = chrome.set_bounds(layout::chrome_bounds(width, height, header))
        {
            log::warn!("failed to resize chrome surface: {err}");
        }
        if let Some(content) = &self.content
            && let Err(err) = content.set_bounds(layout::content_bounds(width, height, header))
        {
            log::warn!("failed to resize content surface: {err}");
        }
    }

    pub fn reload_content(&self) {
        match &self.content {
            Some(content) => {
                if let Err(err) = content.reload() {
                    log::warn!("reload failed: {err}");
                }
            }
            None => log::debug!("reload requested before the content surface exists"),
        }
    }

    pub fn show_context_menu(&self) {
        let Some(chrome) = &self.chrome else {
            return;
        };
        let script = match menu::show_menu_script(&menu::context_menu(&self.config.app.title)) {
            Ok(script) => script,
            Err(err) => {
                log::warn!("failed to encode context menu: {err}");
                return;
            }
        };
        if let Err(err) = chrome.evaluate_script(&script) {
            log::warn!("failed to show context menu: {err}");
        }
    }

    /// Save the window's geometry. A minimized window reports an empty size,
    /// which is skipped so the previous geometry survives.
    pub fn persist(&self, window: &dyn HostWindow) {
        let state = window.current_state();
        if !state.is_valid() {
            log::debug!("not persisting empty window size {}x{}", state.width, state.height);
            return;
        }
        self.store.save(&state);
    }

    /// Persist geometry and release every surface.
    pub fn close(&mut self, window: &dyn HostWindow) {
        if self.phase == Phase::Closed {
            return;
        }
        self.persist(window);
        self.content = None;
        self.chrome = None;
        self.phase = Phase::Closed;
    }

    /// Confirm, clear the content session's caches, persist geometry and
    /// start a new instance. `window` is `None` once the window is gone.
    pub fn clear_cache_and_restart(
        &self,
        window: Option<&dyn HostWindow>,
        prompt: &dyn Prompt,
        relauncher: &dyn Relauncher,
    ) -> MaintenanceOutcome {
        let alive = window.is_some() && self.phase != Phase::Closed;
        let persist_first = PersistThenRelaunch {
            session: self,
            window,
            relauncher,
        };
        maintenance::clear_cache_and_restart(alive, self.content_session(), prompt, &persist_first)
    }
}

struct PersistThenRelaunch<'a, S: ContentSurface> {
    session: &'a ShellSession<S>,
    window: Option<&'a dyn HostWindow>,
    relauncher: &'a dyn Relauncher,
}

impl<S: ContentSurface> Relauncher for PersistThenRelaunch<'_, S> {
    fn relaunch(&self) -> Result<()> {
        if let Some(window) = self.window {
            self.session.persist(window);
        }
        self.relauncher.relaunch()
    }
}
