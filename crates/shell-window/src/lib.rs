//! shell-window: winit event loop and outer window for the desktop shell.
//!
//! Responsibilities:
//! - Create the event loop (with a user-event type) and the main window.
//! - Dispatch resize, close and user events to an [`EventHandler`].
//! - Route events of secondary windows (popups) to the same handler.
//! - Give the handler an idle hook for pumping toolkit events.

use anyhow::Result;
use std::time::{Duration, Instant};
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{
    ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget,
};
use winit::window::{Window, WindowBuilder, WindowId};

pub mod events;

pub use events::{ShellWindowEvent, translate_window_event};

/// Geometry and decoration of a window, in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub inner_size: (u32, u32),
    pub position: Option<(i32, i32)>,
    pub min_size: Option<(u32, u32)>,
    pub decorations: bool,
}

impl WindowOptions {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            inner_size: (800, 600),
            position: None,
            min_size: None,
            decorations: true,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.inner_size = (width, height);
        self
    }

    pub fn with_position(mut self, position: Option<(i32, i32)>) -> Self {
        self.position = position;
        self
    }

    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_size = Some((width, height));
        self
    }

    pub fn with_decorations(mut self, decorations: bool) -> Self {
        self.decorations = decorations;
        self
    }

    fn to_builder(&self) -> WindowBuilder {
        let (width, height) = self.inner_size;
        let mut builder = WindowBuilder::new()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_decorations(self.decorations);
        if let Some((x, y)) = self.position {
            builder = builder.with_position(LogicalPosition::new(x as f64, y as f64));
        }
        if let Some((w, h)) = self.min_size {
            builder = builder.with_min_inner_size(LogicalSize::new(w as f64, h as f64));
        }
        builder
    }
}

/// How the loop sleeps once all queued events are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleMode {
    /// Sleep until the next OS or user event.
    Wait,
    /// Wake at least this often, for toolkits that need their own pumping.
    Tick(Duration),
}

/// Event-loop settings that can't change once the loop exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    pub idle: IdleMode,
    /// Use the X11 backend even inside a Wayland session (Unix only).
    pub force_x11: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            idle: IdleMode::Wait,
            force_x11: false,
        }
    }
}

pub struct ShellWindow<T: 'static> {
    event_loop: EventLoop<T>,
    window: Window,
    idle: IdleMode,
}

pub struct WindowCtx<'a, T: 'static> {
    window: &'a Window,
    elwt: &'a EventLoopWindowTarget<T>,
}

impl<'a, T: 'static> WindowCtx<'a, T> {
    pub fn window(&self) -> &Window {
        self.window
    }

    /// Open another top-level window on the same loop.
    pub fn create_window(&self, options: &WindowOptions) -> Result<Window> {
        Ok(options.to_builder().build(self.elwt)?)
    }

    pub fn exit(&self) {
        self.elwt.exit();
    }
}

pub trait EventHandler<T: 'static> {
    fn init(&mut self, _ctx: &mut WindowCtx<T>) -> Result<()> {
        Ok(())
    }
    fn on_resize(&mut self, _ctx: &mut WindowCtx<T>, _size: PhysicalSize<u32>) -> Result<()> {
        Ok(())
    }
    /// Return `false` to keep the main window open.
    fn on_close_requested(&mut self, _ctx: &mut WindowCtx<T>) -> Result<bool> {
        Ok(true)
    }
    fn on_secondary_event(
        &mut self,
        _ctx: &mut WindowCtx<T>,
        _window_id: WindowId,
        _event: ShellWindowEvent,
    ) -> Result<()> {
        Ok(())
    }
    fn on_user_event(&mut self, _ctx: &mut WindowCtx<T>, _event: T) -> Result<()> {
        Ok(())
    }
    fn on_idle(&mut self, _ctx: &mut WindowCtx<T>) -> Result<()> {
        Ok(())
    }
    fn on_exit(&mut self) {}
}

impl<T: 'static> ShellWindow<T> {
    pub fn with_settings(options: &WindowOptions, settings: LoopSettings) -> Result<Self> {
        let mut builder = EventLoopBuilder::<T>::with_user_event();
        #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
        if settings.force_x11 {
            use winit::platform::x11::EventLoopBuilderExtX11;
            builder.with_x11();
        }
        let event_loop = builder.build()?;
        let window = options.to_builder().build(&event_loop)?;
        Ok(Self {
            event_loop,
            window,
            idle: settings.idle,
        })
    }

    /// Handle for posting user events from callbacks and other threads.
    pub fn proxy(&self) -> EventLoopProxy<T> {
        self.event_loop.create_proxy()
    }

    pub fn run(self, mut handler: impl EventHandler<T> + 'static) -> Result<()> {
        let Self {
            event_loop,
            window,
            idle,
        } = self;
        let main_id = window.id();
        let mut needs_init = true;

        Ok(event_loop.run(move |event, elwt| {
            let mut ctx = WindowCtx {
                window: &window,
                elwt,
            };
            match event {
                Event::Resumed => {
                    if needs_init {
                        needs_init = false;
                        if let Err(err) = handler.init(&mut ctx) {
                            log::error!("window initialisation failed: {err:#}");
                            elwt.exit();
                        }
                    }
                }
                Event::WindowEvent { window_id, event } if window_id == main_id => {
                    match event {
                        WindowEvent::Resized(new_size) => {
                            report(handler.on_resize(&mut ctx, new_size), "resize");
                        }
                        WindowEvent::CloseRequested => match handler.on_close_requested(&mut ctx) {
                            Ok(true) => elwt.exit(),
                            Ok(false) => {}
                            Err(err) => {
                                log::error!("close handler failed: {err:#}");
                                elwt.exit();
                            }
                        },
                        _ => {}
                    }
                }
                Event::WindowEvent { window_id, event } => {
                    if let Some(translated) = translate_window_event(&event) {
                        report(
                            handler.on_secondary_event(&mut ctx, window_id, translated),
                            "secondary window event",
                        );
                    }
                }
                Event::UserEvent(user) => {
                    report(handler.on_user_event(&mut ctx, user), "user event");
                }
                Event::AboutToWait => {
                    report(handler.on_idle(&mut ctx), "idle");
                    match idle {
                        IdleMode::Wait => elwt.set_control_flow(ControlFlow::Wait),
                        IdleMode::Tick(every) => {
                            elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + every))
                        }
                    }
                }
                Event::LoopExiting => handler.on_exit(),
                _ => {}
            }
        })?)
    }
}

fn report(result: Result<()>, what: &str) {
    if let Err(err) = result {
        log::error!("{what} handler failed: {err:#}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder() {
        let options = WindowOptions::new("TV Time")
            .with_size(658, 865)
            .with_position(Some((10, 20)))
            .with_min_size(360, 400)
            .with_decorations(false);

        assert_eq!(options.title, "TV Time");
        assert_eq!(options.inner_size, (658, 865));
        assert_eq!(options.position, Some((10, 20)));
        assert_eq!(options.min_size, Some((360, 400)));
        assert!(!options.decorations);
    }

    #[test]
    fn default_loop_sleeps_until_events() {
        let settings = LoopSettings::default();
        assert_eq!(settings.idle, IdleMode::Wait);
        assert!(!settings.force_x11);
    }

    #[test]
    fn options_default_to_decorated_without_position() {
        let options = WindowOptions::new("popup");
        assert!(options.decorations);
        assert_eq!(options.position, None);
        assert_eq!(options.min_size, None);
    }
}
