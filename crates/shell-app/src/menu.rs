//! Context menu shown from the title bar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuAction {
    ClearCacheAndRestart,
    Reload,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MenuEntry {
    Action { action: MenuAction, label: String },
    Separator,
}

impl MenuEntry {
    fn action(action: MenuAction, label: impl Into<String>) -> Self {
        MenuEntry::Action {
            action,
            label: label.into(),
        }
    }
}

/// Entries in display order.
pub fn context_menu(app_title: &str) -> Vec<MenuEntry> {
    vec![
        MenuEntry::action(MenuAction::ClearCacheAndRestart, "Clear Cache & Restart"),
        MenuEntry::Separator,
        MenuEntry::action(MenuAction::Reload, "Refresh Page"),
        MenuEntry::action(MenuAction::Quit, format!("Exit {app_title}")),
    ]
}

/// Script that opens `entries` in the chrome page's inline menu.
pub fn show_menu_script(entries: &[MenuEntry]) -> serde_json::Result<String> {
    Ok(format!(
        "window.__shell && window.__shell.showMenu({});",
        serde_json::to_string(entries)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_layout() {
        let menu = context_menu("TV Time");
        assert_eq!(menu.len(), 4);
        assert_eq!(
            menu[0],
            MenuEntry::action(MenuAction::ClearCacheAndRestart, "Clear Cache & Restart")
        );
        assert_eq!(menu[1], MenuEntry::Separator);
        assert_eq!(menu[2], MenuEntry::action(MenuAction::Reload, "Refresh Page"));
        assert_eq!(menu[3], MenuEntry::action(MenuAction::Quit, "Exit TV Time"));
    }

    #[test]
    fn script_carries_entries_as_json() {
        let script = show_menu_script(&context_menu("TV Time")).unwrap();
        assert!(script.contains(r#"{"kind":"action","action":"clear-cache-and-restart","label":"Clear Cache & Restart"}"#));
        assert!(script.contains(r#"{"kind":"separator"}"#));
        assert!(script.starts_with("window.__shell"));
    }
}
