use anyhow::Result;
use shell_config::{ConfigError, ShellConfig};
use std::path::PathBuf;

fn arg_value(prefix: &str) -> Option<String> {
    std::env::args().find_map(|a| a.strip_prefix(prefix).map(|s| s.to_string()))
}

/// The logger is configured from the result, so a bad file is handed back
/// for reporting once logging is up.
fn load_config() -> (ShellConfig, Option<ConfigError>) {
    let path = arg_value("--config=")
        .map(PathBuf::from)
        .unwrap_or_else(ShellConfig::config_path);
    let (mut config, error) = ShellConfig::load_or_report(path);
    config.merge_with_env();

    if let Some(url) = arg_value("--url=") {
        config.app.url = url;
    }
    if let Some(path) = arg_value("--cookies=") {
        config.cookies.file = Some(PathBuf::from(path));
        config.cookies.enabled = true;
    }
    if std::env::args().any(|a| a == "--devtools") {
        config.app.devtools = true;
    }
    (config, error)
}

fn main() -> Result<()> {
    let (config, config_error) = load_config();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log.filter.clone()),
    )
    .init();
    if let Some(err) = config_error {
        log::warn!("{err}; using default configuration");
    }

    log::info!("starting {} at {}", config.app.title, config.app.url);
    shell_app::run(config)
}
