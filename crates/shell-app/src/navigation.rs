//! Routing of new-window requests coming from the content surface.
//!
//! The wrapped site opens three kinds of windows:
//! - sign-in flows of identity providers, which must stay inside the app so
//!   the resulting session lands in the shared profile
//! - ordinary external links, which belong in the user's browser
//! - everything else (custom schemes, `about:`), left to the engine

use shell_config::ShellConfig;
use url::Url;

/// Window used for in-app sign-in pop-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Keep the platform title bar (the main window draws its own).
    pub native_title_bar: bool,
    pub auto_hide_menu_bar: bool,
}

impl PopupSpec {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            native_title_bar: true,
            auto_hide_menu_bar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    AllowInPlace,
    AllowAsPopupWindow(PopupSpec),
    HandOffToSystemBrowser,
    Deny,
}

/// Decides what happens to each new-window request.
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    auth_hosts: Vec<String>,
    popup: PopupSpec,
}

impl NavigationPolicy {
    pub fn new<S: AsRef<str>>(auth_hosts: &[S], popup: PopupSpec) -> Self {
        Self {
            auth_hosts: auth_hosts
                .iter()
                .map(|h| h.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            popup,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(
            &config.popups.auth_hosts,
            PopupSpec::new(
                &config.app.title,
                config.popups.width,
                config.popups.height,
            ),
        )
    }

    pub fn decide(&self, url: &str) -> NavigationDecision {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("refusing new window for unparseable url {url:?}: {err}");
                return NavigationDecision::Deny;
            }
        };

        let decision = match parsed.scheme() {
            "http" | "https" => {
                if parsed.host_str().is_some_and(|host| self.is_auth_host(host)) {
                    NavigationDecision::AllowAsPopupWindow(self.popup.clone())
                } else {
                    NavigationDecision::HandOffToSystemBrowser
                }
            }
            _ => NavigationDecision::AllowInPlace,
        };
        log::info!("New window requested: {} -> {:?}", url, decision);
        decision
    }

    fn is_auth_host(&self, host: &str) -> bool {
        self.auth_hosts.iter().any(|allowed| {
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> NavigationPolicy {
        NavigationPolicy::from_config(&ShellConfig::default())
    }

    fn popup() -> NavigationDecision {
        NavigationDecision::AllowAsPopupWindow(PopupSpec::new("TV Time", 600, 700))
    }

    #[test]
    fn auth_providers_open_in_app() {
        let policy = policy();
        assert_eq!(
            policy.decide("https://accounts.google.com/o/oauth2/auth?client_id=x"),
            popup()
        );
        assert_eq!(policy.decide("https://www.facebook.com/v12.0/dialog/oauth"), popup());
        assert_eq!(policy.decide("https://google.com/"), popup());
    }

    #[test]
    fn popup_has_fixed_size_and_native_title_bar() {
        let NavigationDecision::AllowAsPopupWindow(spec) =
            policy().decide("https://accounts.google.com/")
        else {
            panic!("expected popup");
        };
        assert_eq!((spec.width, spec.height), (600, 700));
        assert!(spec.native_title_bar);
        assert!(spec.auto_hide_menu_bar);
    }

    #[test]
    fn lookalike_hosts_go_to_browser() {
        let policy = policy();
        assert_eq!(
            policy.decide("https://example.com/google.com/"),
            NavigationDecision::HandOffToSystemBrowser
        );
        assert_eq!(
            policy.decide("https://notgoogle.com/login"),
            NavigationDecision::HandOffToSystemBrowser
        );
        assert_eq!(
            policy.decide("https://google.com.evil.net/"),
            NavigationDecision::HandOffToSystemBrowser
        );
    }

    #[test]
    fn plain_links_go_to_browser() {
        assert_eq!(
            policy().decide("http://example.com/foo"),
            NavigationDecision::HandOffToSystemBrowser
        );
    }

    #[test]
    fn other_schemes_stay_in_place() {
        let policy = policy();
        assert_eq!(
            policy.decide("tvtime://show/123"),
            NavigationDecision::AllowInPlace
        );
        assert_eq!(policy.decide("about:blank"), NavigationDecision::AllowInPlace);
        assert_eq!(
            policy.decide("mailto:someone@example.com"),
            NavigationDecision::AllowInPlace
        );
    }

    #[test]
    fn garbage_is_denied() {
        assert_eq!(policy().decide("not a url"), NavigationDecision::Deny);
        assert_eq!(policy().decide(""), NavigationDecision::Deny);
    }

    #[test]
    fn configured_hosts_are_normalised() {
        let policy = NavigationPolicy::new(&[".Example.ORG"], PopupSpec::new("x", 1, 1));
        assert!(matches!(
            policy.decide("https://login.example.org/"),
            NavigationDecision::AllowAsPopupWindow(_)
        ));
    }
}
