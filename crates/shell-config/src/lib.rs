//! siteshell configuration system
//!
//! Settings come from `shell.toml`, then environment variables, then the
//! command line. Every field has a default so an empty (or missing) file
//! yields a working shell pointed at the default site.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "shell.toml";

/// Environment variable that points at an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "SITESHELL_CONFIG";

const STATE_FILE: &str = "window-state.json";
const PROFILE_DIR: &str = "profile";
const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

/// Errors raised while reading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure for the shell
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    /// Which site to wrap and how the app identifies itself
    pub app: AppConfig,
    /// Outer window geometry and chrome
    pub window: WindowConfig,
    /// Netscape cookie file import
    pub cookies: CookieConfig,
    /// User-agent presented by the content surface
    pub user_agent: UserAgentConfig,
    /// Pop-up handling for sign-in flows
    pub popups: PopupConfig,
    /// Where state and the browsing profile live
    pub storage: StorageConfig,
    /// Logging defaults
    pub log: LogConfig,
}

/// Application identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory name used under the per-user config dir
    pub id: String,
    /// Window title and title-bar caption
    pub title: String,
    /// The single site loaded into the content surface
    pub url: String,
    /// Allow the engine's developer tools
    pub devtools: bool,
}

/// Outer window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Width used when no window state is stored
    pub width: u32,
    /// Height used when no window state is stored
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
    /// Height of the custom title bar strip in logical pixels
    pub header_height: u32,
    /// Keep the platform title bar instead of the borderless chrome
    pub native_decorations: bool,
    /// Title bar background (CSS color)
    pub header_background: String,
    /// Title bar caption and button color (CSS color)
    pub header_foreground: String,
}

/// Cookie import configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CookieConfig {
    pub enabled: bool,
    /// Cookie file; relative paths resolve against the executable's directory
    pub file: Option<PathBuf>,
}

/// User-agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Replace the runtime's user agent entirely
    pub custom: Option<String>,
    /// Product tokens (`Name/1.2.3`) removed from the runtime's user agent
    pub strip_products: Vec<String>,
}

/// Pop-up configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopupConfig {
    /// Hosts (and their subdomains) whose pop-ups open inside the app
    pub auth_hosts: Vec<String>,
    pub width: u32,
    pub height: u32,
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the window-state JSON file
    pub state_file: Option<PathBuf>,
    /// Override for the browsing profile directory
    pub profile_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            id: "siteshell".to_string(),
            title: "TV Time".to_string(),
            url: "https://app.tvtime.com".to_string(),
            devtools: false,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 658,
            height: 865,
            min_width: 360,
            min_height: 400,
            header_height: 30,
            native_decorations: false,
            header_background: "#1a1a1a".to_string(),
            header_foreground: "#ffffff".to_string(),
        }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            custom: None,
            strip_products: vec!["Electron".to_string(), "Edg".to_string()],
        }
    }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            auth_hosts: vec![
                "accounts.google.com".to_string(),
                "google.com".to_string(),
                "facebook.com".to_string(),
            ],
            width: 600,
            height: 700,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ShellConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`, or return defaults if the file doesn't
    /// exist. A file that exists but fails to parse is reported and ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let (config, error) = Self::load_or_report(path);
        if let Some(err) = error {
            log::warn!("{err}; using default configuration");
        }
        config
    }

    /// Like [`load_or_default`](Self::load_or_default), but a file that
    /// exists and can't be loaded is handed back instead of logged, for
    /// callers that set up logging from the configuration.
    pub fn load_or_report<P: AsRef<Path>>(path: P) -> (Self, Option<ConfigError>) {
        match Self::load_from_file(path) {
            Ok(config) => (config, None),
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                (Self::default(), None)
            }
            Err(err) => (Self::default(), Some(err)),
        }
    }

    /// `$SITESHELL_CONFIG`, or `shell.toml` in the working directory.
    pub fn config_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Merge configuration with values produced by `lookup`.
    ///
    /// `lookup` is consulted with the `SITESHELL_*` variable names; anything it
    /// returns takes precedence over the file.
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SITESHELL_URL") {
            self.app.url = url;
        }
        if let Some(title) = lookup("SITESHELL_TITLE") {
            self.app.title = title;
        }
        if let Some(val) = lookup("SITESHELL_DEVTOOLS") {
            self.app.devtools = parse_flag(&val);
        }
        if let Some(path) = lookup("SITESHELL_COOKIES") {
            self.cookies.file = Some(PathBuf::from(path));
            self.cookies.enabled = true;
        }
        if let Some(ua) = lookup("SITESHELL_USER_AGENT") {
            self.user_agent.custom = Some(ua);
        }
        if let Some(path) = lookup("SITESHELL_STATE_FILE") {
            self.storage.state_file = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("SITESHELL_PROFILE_DIR") {
            self.storage.profile_dir = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup("SITESHELL_LOG") {
            self.log.filter = filter;
        }
    }

    /// Merge configuration with environment variables
    pub fn merge_with_env(&mut self) {
        self.merge_from(|name| std::env::var(name).ok());
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from `$SITESHELL_CONFIG` or `shell.toml` (defaults if absent)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default(Self::config_path());
        config.merge_with_env();
        config
    }

    /// Per-user directory holding the window state and browsing profile.
    pub fn app_data_dir(&self) -> PathBuf {
        if let Some(mut dir) = dirs::config_dir() {
            dir.push(&self.app.id);
            dir
        } else if let Some(mut home) = dirs::home_dir() {
            home.push(format!(".{}", self.app.id));
            home
        } else {
            PathBuf::from(format!(".{}", self.app.id))
        }
    }

    /// Location of the window-state JSON file.
    pub fn state_file(&self) -> PathBuf {
        self.storage
            .state_file
            .clone()
            .unwrap_or_else(|| self.app_data_dir().join(STATE_FILE))
    }

    /// Location of the browsing profile (cookies, caches, storage).
    pub fn profile_dir(&self) -> PathBuf {
        self.storage
            .profile_dir
            .clone()
            .unwrap_or_else(|| self.app_data_dir().join(PROFILE_DIR))
    }

    /// Cookie file to import at startup, `None` when import is disabled.
    pub fn cookie_file(&self) -> Option<PathBuf> {
        if !self.cookies.enabled {
            return None;
        }
        let file = self
            .cookies
            .file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIE_FILE));
        if file.is_absolute() {
            return Some(file);
        }
        Some(resource_dir().join(file))
    }
}

/// Directory the shell's bundled resources live in: the executable's
/// directory, falling back to the working directory.
pub fn resource_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}
