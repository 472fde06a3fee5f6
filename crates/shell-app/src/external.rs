//! Hand-off of URLs to the user's default browser.

use anyhow::{Context, Result};
use std::process::Command;

fn browser_command(url: &str) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        // The empty argument is the window title `start` expects first, and
        // `&` would otherwise split the command line.
        cmd.args(["/C", "start", ""]).arg(url.replace('&', "^&"));
        cmd
    }
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    }
}

/// Open `url` with the system's default handler without waiting for it.
pub fn open_in_browser(url: &str) -> Result<()> {
    browser_command(url)
        .spawn()
        .with_context(|| format!("failed to open {url} in the system browser"))?;
    log::info!("Opened {} in the system browser", url);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn url_is_the_last_argument() {
        let cmd = browser_command("https://example.com/a?b=c");
        let last = cmd.get_args().last().map(|a| a.to_string_lossy().into_owned());
        assert_eq!(last.as_deref(), Some("https://example.com/a?b=c"));
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn uses_xdg_open() {
        assert_eq!(browser_command("https://example.com").get_program(), "xdg-open");
    }
}
