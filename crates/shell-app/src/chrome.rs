//! The title-bar page and the scripts injected into the surfaces.
//!
//! The chrome surface is exactly as tall as the header strip, so the context
//! menu is drawn inline: its entries replace the caption until an entry is
//! picked, Escape is pressed or the pointer leaves the strip.

/// Appearance of the title-bar strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeStyle {
    pub title: String,
    pub background: String,
    pub foreground: String,
    pub header_height: u32,
    /// Draw minimize / maximize / close buttons (borderless windows only).
    pub window_controls: bool,
}

const FALLBACK_BACKGROUND: &str = "#1a1a1a";
const FALLBACK_FOREGROUND: &str = "#ffffff";

const CHROME_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  html, body {
    margin: 0; height: 100%; overflow: hidden;
    background: @BACKGROUND@; color: @FOREGROUND@;
    font: 12px/1 system-ui, -apple-system, "Segoe UI", sans-serif;
    user-select: none; -webkit-user-select: none; cursor: default;
  }
  #bar { display: flex; align-items: center; height: @HEIGHT@px; }
  #caption { flex: 1; padding-left: 10px; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
  #menu { flex: 1; display: none; align-items: center; height: 100%; padding-left: 4px; }
  #menu button, #controls button {
    background: transparent; color: inherit; border: 0; height: 100%;
    font: inherit; padding: 0 10px;
  }
  #menu button:hover, #controls button:hover { background: rgba(255, 255, 255, 0.12); }
  #controls button.close:hover { background: #c42b1c; }
  #menu .separator { width: 1px; height: 60%; background: currentColor; opacity: 0.3; margin: 0 4px; }
  #controls { display: flex; height: 100%; }
  body.menu-open #caption { display: none; }
  body.menu-open #menu { display: flex; }
</style>
</head>
<body>
<div id="bar">
  <div id="caption">@TITLE@</div>
  <div id="menu"></div>
  <div id="controls">@CONTROLS@</div>
</div>
<script>
(function () {
  const post = (message) => window.ipc.postMessage(JSON.stringify(message));
  const bar = document.getElementById('bar');
  const menu = document.getElementById('menu');

  function hideMenu() {
    document.body.classList.remove('menu-open');
    menu.replaceChildren();
  }

  function showMenu(entries) {
    menu.replaceChildren();
    for (const entry of entries) {
      if (entry.kind === 'separator') {
        const sep = document.createElement('div');
        sep.className = 'separator';
        menu.appendChild(sep);
        continue;
      }
      const item = document.createElement('button');
      item.textContent = entry.label;
      item.addEventListener('click', (event) => {
        event.stopPropagation();
        hideMenu();
        post({ type: 'menu-action', action: entry.action });
      });
      menu.appendChild(item);
    }
    document.body.classList.add('menu-open');
  }

  window.__shell = { showMenu, hideMenu };

  bar.addEventListener('contextmenu', (event) => {
    event.preventDefault();
    post({ type: 'show-context-menu' });
  });
  bar.addEventListener('mousedown', (event) => {
    if (event.button !== 0 || event.target.closest('button')) return;
    if (document.body.classList.contains('menu-open')) { hideMenu(); return; }
    if (event.detail === 2) {
      post({ type: 'window', action: 'toggle-maximize' });
    } else {
      post({ type: 'window', action: 'drag' });
    }
  });
  document.addEventListener('keydown', (event) => {
    if (event.key === 'Escape') hideMenu();
  });
  document.addEventListener('mouseleave', hideMenu);
  window.addEventListener('blur', hideMenu);

  for (const button of document.querySelectorAll('#controls button')) {
    button.addEventListener('click', () => post({ type: 'window', action: button.dataset.action }));
  }

  post({ type: 'ready', userAgent: navigator.userAgent });
})();
</script>
</body>
</html>
"#;

const WINDOW_CONTROLS: &str = concat!(
    r#"<button data-action="minimize" title="Minimize">&#x2013;</button>"#,
    r#"<button data-action="toggle-maximize" title="Maximize">&#x25A1;</button>"#,
    r#"<button class="close" data-action="close" title="Close">&#x2715;</button>"#,
);

/// F5 and Ctrl+R / Cmd+R reload the content surface instead of the page the
/// keys were pressed in.
pub const RELOAD_SHORTCUT_SCRIPT: &str = r#"
window.addEventListener('keydown', (event) => {
  const key = event.key;
  const reload = key === 'F5' ||
    ((event.ctrlKey || event.metaKey) && !event.altKey && (key === 'r' || key === 'R'));
  if (!reload) return;
  event.preventDefault();
  event.stopImmediatePropagation();
  window.ipc.postMessage(JSON.stringify({ type: 'reload-shortcut' }));
}, true);
"#;

/// Lets a sign-in pop-up close its own window when the provider is done.
pub const POPUP_SCRIPT: &str = r#"
window.close = () => window.ipc.postMessage(JSON.stringify({ type: 'close' }));
"#;

/// Full document for the chrome surface.
pub fn chrome_html(style: &ChromeStyle) -> String {
    let controls = if style.window_controls {
        WINDOW_CONTROLS
    } else {
        ""
    };
    CHROME_TEMPLATE
        .replace(
            "@BACKGROUND@",
            css_color(&style.background).unwrap_or(FALLBACK_BACKGROUND),
        )
        .replace(
            "@FOREGROUND@",
            css_color(&style.foreground).unwrap_or(FALLBACK_FOREGROUND),
        )
        .replace("@HEIGHT@", &style.header_height.to_string())
        .replace("@CONTROLS@", controls)
        .replace("@TITLE@", &escape_html(&style.title))
}

/// Parse a `#rrggbb` color into the RGBA used to paint before first load.
pub fn hex_rgba(color: &str) -> Option<(u8, u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?, 255))
}

fn css_color(value: &str) -> Option<&str> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' '));
    valid.then_some(value)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
