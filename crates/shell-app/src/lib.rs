//! Desktop shell around a single website.
//!
//! The pieces below are independent of the webview runtime and tested with
//! fakes; [`runtime`] wires them to winit and wry.

pub mod chrome;
pub mod external;
pub mod ipc;
pub mod layout;
pub mod maintenance;
pub mod menu;
pub mod navigation;
pub mod session;
pub mod user_agent;

#[cfg(feature = "wry")]
pub mod runtime;

pub use maintenance::MaintenanceOutcome;
pub use navigation::{NavigationDecision, NavigationPolicy, PopupSpec};
pub use session::{HostWindow, Phase, ShellSession};

#[cfg(feature = "wry")]
pub use runtime::run;
