//! Messages posted by the pages through `window.ipc.postMessage`.
//!
//! Each surface gets its own message type and only that type is accepted
//! from it: the chrome may drive the window, the content page may only ask
//! for a reload, and a pop-up may only close itself.

use crate::menu::MenuAction;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChromeMessage {
    /// The chrome page loaded; carries the engine's default user agent.
    Ready {
        #[serde(rename = "userAgent")]
        user_agent: String,
    },
    ShowContextMenu,
    ClearCacheRequest,
    MenuAction { action: MenuAction },
    ReloadShortcut,
    Window { action: WindowAction },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowAction {
    Minimize,
    ToggleMaximize,
    Close,
    Drag,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentMessage {
    ReloadShortcut,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PopupMessage {
    Close,
}

/// Decode a message body, logging and dropping anything malformed.
pub fn parse<T: DeserializeOwned>(source: &str, body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(message) => Some(message),
        Err(err) => {
            log::warn!("ignoring malformed {source} message {body:?}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_messages() {
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"ready","userAgent":"Mozilla/5.0 X"}"#),
            Some(ChromeMessage::Ready {
                user_agent: "Mozilla/5.0 X".into()
            })
        );
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"show-context-menu"}"#),
            Some(ChromeMessage::ShowContextMenu)
        );
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"clear-cache-request"}"#),
            Some(ChromeMessage::ClearCacheRequest)
        );
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"menu-action","action":"quit"}"#),
            Some(ChromeMessage::MenuAction {
                action: MenuAction::Quit
            })
        );
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"window","action":"toggle-maximize"}"#),
            Some(ChromeMessage::Window {
                action: WindowAction::ToggleMaximize
            })
        );
    }

    #[test]
    fn content_cannot_drive_the_window() {
        assert_eq!(
            parse::<ContentMessage>("content", r#"{"type":"reload-shortcut"}"#),
            Some(ContentMessage::ReloadShortcut)
        );
        assert_eq!(
            parse::<ContentMessage>("content", r#"{"type":"window","action":"close"}"#),
            None
        );
        assert_eq!(
            parse::<ContentMessage>("content", r#"{"type":"clear-cache-request"}"#),
            None
        );
    }

    #[test]
    fn malformed_messages_are_dropped() {
        assert_eq!(parse::<ChromeMessage>("chrome", "not json"), None);
        assert_eq!(parse::<ChromeMessage>("chrome", r#"{"type":"explode"}"#), None);
        assert_eq!(
            parse::<ChromeMessage>("chrome", r#"{"type":"menu-action","action":"format-disk"}"#),
            None
        );
        assert_eq!(parse::<PopupMessage>("popup", r#"{"type":"close"}"#), Some(PopupMessage::Close));
    }
}
