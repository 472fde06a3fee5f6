//! The desktop shell on winit + wry.
//!
//! Webview callbacks only forward [`ShellEvent`]s through the event-loop
//! proxy; every state change happens in [`DesktopShell`]'s handler methods
//! on the loop thread.

use crate::chrome::POPUP_SCRIPT;
use crate::ipc::{self, ChromeMessage, ContentMessage, PopupMessage, WindowAction};
use crate::maintenance::{self, MaintenanceOutcome, ProcessRelauncher, RfdPrompt};
use crate::menu::MenuAction;
use crate::navigation::{NavigationDecision, NavigationPolicy, PopupSpec};
use crate::session::{HostWindow, ShellSession};
use anyhow::{Context, Result, anyhow};
use shell_config::ShellConfig;
use shell_state::WindowState;
use shell_surface::{
    Bounds, ContentSurface, PopupResponse, SurfaceBuilder, SurfaceHooks, WryProfile, WrySurface,
};
use shell_window::{
    EventHandler, IdleMode, LoopSettings, ShellWindow, ShellWindowEvent, WindowCtx, WindowOptions,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event_loop::EventLoopProxy;
use winit::window::{Window, WindowId};

/// Events posted from webview callbacks to the loop.
#[derive(Debug, Clone)]
pub enum ShellEvent {
    Chrome(String),
    Content(String),
    Popup { window: WindowId, body: String },
    OpenPopup { url: String, spec: PopupSpec },
    OpenExternal(String),
}

/// Cloneable, thread-safe sender for [`ShellEvent`]s.
#[derive(Clone)]
struct Notifier(Arc<Mutex<EventLoopProxy<ShellEvent>>>);

impl Notifier {
    fn new(proxy: EventLoopProxy<ShellEvent>) -> Self {
        Self(Arc::new(Mutex::new(proxy)))
    }

    fn send(&self, event: ShellEvent) {
        match self.0.lock() {
            Ok(proxy) => {
                if proxy.send_event(event).is_err() {
                    log::debug!("event loop closed; dropping shell event");
                }
            }
            Err(_) => log::warn!("event proxy lock poisoned"),
        }
    }
}

impl HostWindow for Window {
    fn content_size(&self) -> (u32, u32) {
        let size: LogicalSize<f64> = self.inner_size().to_logical(self.scale_factor());
        (size.width.round() as u32, size.height.round() as u32)
    }

    fn current_state(&self) -> WindowState {
        let (width, height) = self.content_size();
        let state = WindowState::sized(width, height);
        match self.outer_position() {
            Ok(position) => {
                let position: LogicalPosition<f64> = position.to_logical(self.scale_factor());
                state.with_position(position.x.round() as i32, position.y.round() as i32)
            }
            Err(_) => state,
        }
    }
}

struct PopupWindow {
    // Dropped before the window it is embedded in.
    surface: WrySurface,
    window: Window,
}

// Field order is drop order: surfaces go before the profile they use.
pub struct DesktopShell {
    session: ShellSession<WrySurface>,
    popups: HashMap<WindowId, PopupWindow>,
    profile: WryProfile,
    policy: NavigationPolicy,
    notifier: Notifier,
    engine_user_agent: Option<String>,
    failure: Rc<RefCell<Option<anyhow::Error>>>,
}

/// Build the window and surfaces from `config` and run until the main
/// window closes.
pub fn run(config: ShellConfig) -> Result<()> {
    shell_surface::init_platform().context("failed to initialise the webview runtime")?;

    let session: ShellSession<WrySurface> = ShellSession::new(config);
    let profile = WryProfile::open(session.config().profile_dir())
        .context("failed to open the browsing profile")?;
    let policy = NavigationPolicy::from_config(session.config());

    let shell_window = ShellWindow::with_settings(&session.window_options(), loop_settings())
        .context("failed to create the main window")?;
    let notifier = Notifier::new(shell_window.proxy());

    let failure = Rc::new(RefCell::new(None));
    let shell = DesktopShell {
        session,
        popups: HashMap::new(),
        profile,
        policy,
        notifier,
        engine_user_agent: None,
        failure: Rc::clone(&failure),
    };
    shell_window.run(shell)?;

    match failure.borrow_mut().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn loop_settings() -> LoopSettings {
    if cfg!(target_os = "linux") {
        // WebKitGTK progresses only while GTK is pumped from the idle hook.
        LoopSettings {
            idle: IdleMode::Tick(Duration::from_millis(8)),
            force_x11: true,
        }
    } else {
        LoopSettings::default()
    }
}

fn new_window_handler(
    policy: NavigationPolicy,
    notifier: Notifier,
) -> impl Fn(&str) -> PopupResponse + Send + Sync + 'static {
    move |url: &str| match policy.decide(url) {
        NavigationDecision::AllowInPlace => PopupResponse::Allow,
        NavigationDecision::AllowAsPopupWindow(spec) => {
            notifier.send(ShellEvent::OpenPopup {
                url: url.to_string(),
                spec,
            });
            PopupResponse::Deny
        }
        NavigationDecision::HandOffToSystemBrowser => {
            notifier.send(ShellEvent::OpenExternal(url.to_string()));
            PopupResponse::Deny
        }
        NavigationDecision::Deny => PopupResponse::Deny,
    }
}

impl DesktopShell {
    fn chrome_hooks(&self) -> SurfaceHooks {
        let notifier = self.notifier.clone();
        SurfaceHooks::new().on_ipc(move |body| notifier.send(ShellEvent::Chrome(body)))
    }

    fn content_hooks(&self) -> SurfaceHooks {
        let notifier = self.notifier.clone();
        SurfaceHooks::new()
            .on_ipc(move |body| notifier.send(ShellEvent::Content(body)))
            .on_new_window(new_window_handler(self.policy.clone(), self.notifier.clone()))
    }

    fn fail(&self, ctx: &WindowCtx<ShellEvent>, err: anyhow::Error) {
        log::error!("{err:#}");
        *self.failure.borrow_mut() = Some(err);
        ctx.exit();
    }

    fn start_content(&mut self, ctx: &WindowCtx<ShellEvent>) {
        let hooks = self.content_hooks();
        let window = ctx.window();
        let engine_user_agent = self.engine_user_agent.clone();
        let profile = &mut self.profile;
        let result = self
            .session
            .start_content(window, engine_user_agent.as_deref(), |builder| {
                Ok(builder.build_wry(window, profile, hooks)?)
            });
        if let Err(err) = result {
            self.fail(ctx, err);
        }
    }

    /// Persist and release every surface.
    fn release(&mut self, window: &Window) {
        self.popups.clear();
        self.session.close(window);
    }

    fn shut_down(&mut self, ctx: &WindowCtx<ShellEvent>) {
        self.release(ctx.window());
        ctx.exit();
    }

    fn handle_chrome(&mut self, ctx: &WindowCtx<ShellEvent>, message: ChromeMessage) {
        match message {
            ChromeMessage::Ready { user_agent } => {
                log::debug!("chrome ready, engine user agent: {user_agent}");
                if self.engine_user_agent.is_none() {
                    self.engine_user_agent = Some(user_agent);
                }
                self.start_content(ctx);
            }
            ChromeMessage::ShowContextMenu => self.session.show_context_menu(),
            ChromeMessage::ClearCacheRequest => self.clear_cache_and_restart(ctx),
            ChromeMessage::MenuAction { action } => match action {
                MenuAction::ClearCacheAndRestart => self.clear_cache_and_restart(ctx),
                MenuAction::Reload => self.session.reload_content(),
                MenuAction::Quit => self.shut_down(ctx),
            },
            ChromeMessage::ReloadShortcut => self.session.reload_content(),
            ChromeMessage::Window { action } => self.window_action(ctx, action),
        }
    }

    fn window_action(&mut self, ctx: &WindowCtx<ShellEvent>, action: WindowAction) {
        let window = ctx.window();
        match action {
            WindowAction::Minimize => window.set_minimized(true),
            WindowAction::ToggleMaximize => window.set_maximized(!window.is_maximized()),
            WindowAction::Close => self.shut_down(ctx),
            WindowAction::Drag => {
                if let Err(err) = window.drag_window() {
                    log::debug!("window drag unavailable: {err}");
                }
            }
        }
    }

    fn clear_cache_and_restart(&mut self, ctx: &WindowCtx<ShellEvent>) {
        let window = ctx.window();
        let prompt = RfdPrompt::new(window);
        let relauncher = ProcessRelauncher::new();
        let outcome =
            self.session
                .clear_cache_and_restart(Some(window as &dyn HostWindow), &prompt, &relauncher);
        log::info!("Cache maintenance finished: {:?}", outcome);
        if let MaintenanceOutcome::Restarted { .. } = outcome {
            // The new instance opens the same profile; start it only once
            // our webviews are gone.
            self.release(window);
            if let Err(err) = relauncher.spawn_pending() {
                maintenance::report_failure(&prompt, &err);
            }
            ctx.exit();
        }
    }

    fn open_popup(&mut self, ctx: &WindowCtx<ShellEvent>, url: String, spec: PopupSpec) -> Result<()> {
        let options = WindowOptions::new(spec.title.clone())
            .with_size(spec.width, spec.height)
            .with_decorations(spec.native_title_bar);
        let window = ctx.create_window(&options)?;
        let id = window.id();
        let (width, height) = window.content_size();

        let notifier = self.notifier.clone();
        let hooks = SurfaceHooks::new()
            .on_ipc(move |body| notifier.send(ShellEvent::Popup { window: id, body }))
            .on_new_window(new_window_handler(self.policy.clone(), self.notifier.clone()));

        let mut builder = SurfaceBuilder::new()
            .with_url(url.clone())
            .with_bounds(Bounds::new(0, 0, width, height))
            .with_initialization_script(POPUP_SCRIPT)
            .with_devtools(self.session.config().app.devtools);
        if let Some(user_agent) = self
            .session
            .content_user_agent(self.engine_user_agent.as_deref())
        {
            builder = builder.with_user_agent(user_agent);
        }
        let surface = builder
            .build_wry(&window, &mut self.profile, hooks)
            .with_context(|| format!("failed to open sign-in window for {url}"))?;
        surface.focus();

        log::info!("Opened sign-in window for {}", url);
        self.popups.insert(id, PopupWindow { surface, window });
        Ok(())
    }

    fn close_popup(&mut self, id: WindowId) {
        if self.popups.remove(&id).is_some() {
            log::debug!("closed sign-in window {id:?}");
        }
    }
}

impl EventHandler<ShellEvent> for DesktopShell {
    fn init(&mut self, ctx: &mut WindowCtx<ShellEvent>) -> Result<()> {
        let window = ctx.window();
        let hooks = self.chrome_hooks();
        let chrome = self
            .session
            .chrome_builder(window)
            .build_wry(window, &mut self.profile, hooks);
        match chrome {
            Ok(chrome) => self.session.attach_chrome(chrome),
            Err(err) => log::warn!("title bar unavailable: {err}"),
        }

        // Without a chrome page nobody reports the engine's user agent.
        if !self.session.needs_user_agent_probe() || self.session.chrome().is_none() {
            self.start_content(ctx);
        }
        Ok(())
    }

    fn on_resize(&mut self, ctx: &mut WindowCtx<ShellEvent>, _size: PhysicalSize<u32>) -> Result<()> {
        self.session.resize(ctx.window());
        Ok(())
    }

    fn on_close_requested(&mut self, ctx: &mut WindowCtx<ShellEvent>) -> Result<bool> {
        self.popups.clear();
        self.session.close(ctx.window());
        Ok(true)
    }

    fn on_secondary_event(
        &mut self,
        _ctx: &mut WindowCtx<ShellEvent>,
        window_id: WindowId,
        event: ShellWindowEvent,
    ) -> Result<()> {
        match event {
            ShellWindowEvent::CloseRequested => self.close_popup(window_id),
            ShellWindowEvent::Resized(_) => {
                if let Some(popup) = self.popups.get(&window_id) {
                    let (width, height) = popup.window.content_size();
                    popup
                        .surface
                        .set_bounds(Bounds::new(0, 0, width, height))
                        .map_err(|err| anyhow!("failed to resize sign-in window: {err}"))?;
                }
            }
        }
        Ok(())
    }

    fn on_user_event(&mut self, ctx: &mut WindowCtx<ShellEvent>, event: ShellEvent) -> Result<()> {
        match event {
            ShellEvent::Chrome(body) => {
                if let Some(message) = ipc::parse::<ChromeMessage>("chrome", &body) {
                    self.handle_chrome(ctx, message);
                }
            }
            ShellEvent::Content(body) => {
                if let Some(ContentMessage::ReloadShortcut) =
                    ipc::parse::<ContentMessage>("content", &body)
                {
                    self.session.reload_content();
                }
            }
            ShellEvent::Popup { window, body } => {
                if let Some(PopupMessage::Close) = ipc::parse::<PopupMessage>("popup", &body) {
                    self.close_popup(window);
                }
            }
            ShellEvent::OpenPopup { url, spec } => self.open_popup(ctx, url, spec)?,
            ShellEvent::OpenExternal(url) => crate::external::open_in_browser(&url)?,
        }
        Ok(())
    }

    fn on_idle(&mut self, _ctx: &mut WindowCtx<ShellEvent>) -> Result<()> {
        shell_surface::pump_platform_events();
        Ok(())
    }

    fn on_exit(&mut self) {
        self.popups.clear();
        log::info!("Shell exiting");
    }
}
