//! User-agent clean-up.
//!
//! Embedding runtimes append their own product token (`Electron/28.1.0`,
//! `Edg/120.0.2210.91`) to the Chromium/WebKit user agent, which some sites
//! answer with an "unsupported browser" page. The tokens named in the
//! configuration are removed; everything else is kept in order.

/// Remove `Name/1.2.3` tokens whose name is listed in `products`.
pub fn strip_product_tokens<S: AsRef<str>>(user_agent: &str, products: &[S]) -> String {
    user_agent
        .split_whitespace()
        .filter(|token| !products.iter().any(|p| is_product_token(token, p.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_product_token(token: &str, product: &str) -> bool {
    let Some(version) = token
        .strip_prefix(product)
        .and_then(|rest| rest.strip_prefix('/'))
    else {
        return false;
    };
    !version.is_empty() && version.chars().all(|c| c.is_ascii_digit() || c == '.')
}
