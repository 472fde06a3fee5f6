//! "Clear cache and restart".
//!
//! Drops the HTTP cache, service workers, Cache Storage and the shader
//! cache of the content session, then starts a fresh instance of the app.
//! Cookies and local storage survive, so the user stays signed in.

use anyhow::{Context, Result};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use shell_surface::{BrowsingSession, MAINTENANCE_STORAGES};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process::Command;
use winit::window::Window;

const CONFIRM_LABEL: &str = "Clear & Restart";
const CANCEL_LABEL: &str = "Cancel";
const ERROR_PREFIX: &str = "An error occurred while trying to clear the cache: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    /// No window to anchor the confirmation to.
    Aborted,
    Cancelled,
    /// A new instance was started; `cleared` is false when any clearing
    /// step failed or no session was available.
    Restarted { cleared: bool },
    /// The restart failed; the message was shown to the user.
    Failed(String),
}

/// Blocking dialogs shown during maintenance.
pub trait Prompt {
    /// Ask before clearing. Dismissing the dialog counts as "no".
    fn confirm_clear_cache(&self) -> bool;

    fn show_error(&self, message: &str);
}

/// Starts the replacement instance.
pub trait Relauncher {
    fn relaunch(&self) -> Result<()>;
}

pub fn clear_cache_and_restart(
    window_alive: bool,
    session: Option<&dyn BrowsingSession>,
    prompt: &dyn Prompt,
    relauncher: &dyn Relauncher,
) -> MaintenanceOutcome {
    if !window_alive {
        log::warn!("Main window is missing or destroyed; not clearing the cache.");
        return MaintenanceOutcome::Aborted;
    }

    if !prompt.confirm_clear_cache() {
        log::info!("Cache clear cancelled");
        return MaintenanceOutcome::Cancelled;
    }

    let cleared = match session {
        Some(session) => clear_session(session),
        None => {
            log::warn!("Content session is missing, proceeding to restart anyway.");
            false
        }
    };

    match relauncher.relaunch() {
        Ok(()) => MaintenanceOutcome::Restarted { cleared },
        Err(err) => MaintenanceOutcome::Failed(report_failure(prompt, &err)),
    }
}

/// Log a restart failure and show it to the user. Returns the bare message.
pub fn report_failure(prompt: &dyn Prompt, err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    log::error!("Cache clear and restart failed: {message}");
    prompt.show_error(&format!("{ERROR_PREFIX}{message}"));
    message
}

fn clear_session(session: &dyn BrowsingSession) -> bool {
    match session.cache_size() {
        Ok(bytes) => log::info!(
            "Current cache size: {:.2} MB",
            bytes as f64 / 1024.0 / 1024.0
        ),
        Err(err) => log::debug!("cache size unavailable: {err}"),
    }

    let mut cleared = true;
    match session.clear_http_cache() {
        Ok(()) => log::info!("HTTP cache cleared."),
        Err(err) => {
            log::warn!("Failed to clear HTTP cache: {err}");
            cleared = false;
        }
    }
    match session.clear_storage_data(&MAINTENANCE_STORAGES) {
        Ok(()) => log::info!("Service workers, cache storage and shader cache cleared."),
        Err(err) => {
            log::warn!("Failed to clear session storage: {err}");
            cleared = false;
        }
    }
    cleared
}

/// Native message boxes parented to the main window.
pub struct RfdPrompt<'a> {
    window: &'a Window,
}

impl<'a> RfdPrompt<'a> {
    pub fn new(window: &'a Window) -> Self {
        Self { window }
    }
}

impl Prompt for RfdPrompt<'_> {
    fn confirm_clear_cache(&self) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Warning)
            .set_title("Confirm Action")
            .set_description(
                "Are you sure you want to clear the cache?\n\n\
                 This will delete temporary files and restart the application. \
                 Cookies and site data are kept.",
            )
            .set_buttons(MessageButtons::OkCancelCustom(
                CONFIRM_LABEL.to_string(),
                CANCEL_LABEL.to_string(),
            ))
            .set_parent(self.window)
            .show();

        match result {
            MessageDialogResult::Ok => true,
            MessageDialogResult::Custom(label) => label == CONFIRM_LABEL,
            _ => false,
        }
    }

    fn show_error(&self, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title("Error")
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .set_parent(self.window)
            .show();
    }
}

/// Starts the current executable again with the same arguments.
///
/// `relaunch` only resolves the executable. The new process is spawned by
/// [`spawn_pending`](Self::spawn_pending) once this instance has dropped its
/// surfaces, so the two never hold the profile at the same time.
#[derive(Debug, Default)]
pub struct ProcessRelauncher {
    pending: RefCell<Option<PathBuf>>,
}

impl ProcessRelauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<PathBuf> {
        self.pending.borrow().clone()
    }

    /// Spawn the relaunch requested earlier, if any.
    pub fn spawn_pending(&self) -> Result<()> {
        let Some(exe) = self.pending.borrow_mut().take() else {
            return Ok(());
        };
        let child = Command::new(&exe)
            .args(std::env::args_os().skip(1))
            .spawn()
            .with_context(|| format!("failed to start {}", exe.display()))?;
        log::info!("Relaunched as pid {}", child.id());
        Ok(())
    }
}

impl Relauncher for ProcessRelauncher {
    fn relaunch(&self) -> Result<()> {
        let exe = std::env::current_exe().context("cannot locate the running executable")?;
        *self.pending.borrow_mut() = Some(exe);
        Ok(())
    }
}
