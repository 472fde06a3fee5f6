//! Netscape cookie file import.
//!
//! The format is the one written by browser "export cookies" extensions and
//! `curl -c`: one cookie per line, seven tab-separated fields
//!
//! ```text
//! domain  include-subdomains  path  secure  expiry  name  value
//! ```
//!
//! Lines that are blank, start with `#`, or carry fewer than seven fields are
//! skipped. Importing is best effort: a cookie the session rejects is logged
//! and the rest of the file still goes in.

use shell_surface::{BrowsingSession, SessionCookie};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

const FIELD_COUNT: usize = 7;

#[derive(Error, Debug)]
pub enum CookieFileError {
    #[error("cookie file {0} does not exist")]
    NotFound(PathBuf),

    #[error("failed to read cookie file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One parsed line of a cookie file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    /// Domain exactly as written, leading dot included.
    pub domain: String,
    pub include_subdomains: bool,
    pub path: String,
    pub secure: bool,
    /// Unix seconds; zero or negative means a session cookie.
    pub expires_at: i64,
    pub name: String,
    pub value: String,
}

impl CookieRecord {
    /// Parse a single line, `None` for lines that carry no cookie.
    pub fn parse_line(line: &str) -> Option<Self> {
        if line.trim().is_empty() || line.starts_with('#') {
            return None;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < FIELD_COUNT {
            return None;
        }

        Some(Self {
            domain: fields[0].to_string(),
            include_subdomains: fields[1] == "TRUE",
            path: fields[2].to_string(),
            secure: fields[3] == "TRUE",
            expires_at: parse_leading_int(fields[4]),
            name: fields[5].to_string(),
            value: fields[6].trim().to_string(),
        })
    }

    /// Origin the cookie is installed for.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        let host = self.domain.strip_prefix('.').unwrap_or(&self.domain);
        format!("{scheme}://{host}{}", self.path)
    }

    pub fn to_session_cookie(&self) -> SessionCookie {
        SessionCookie {
            url: self.url(),
            name: self.name.clone(),
            value: self.value.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            secure: self.secure,
            expiration_date: (self.expires_at > 0).then_some(self.expires_at),
        }
    }
}

/// Every cookie in `contents`, in file order.
pub fn parse_file(contents: &str) -> Vec<CookieRecord> {
    contents.lines().filter_map(CookieRecord::parse_line).collect()
}

/// Counters from one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Cookies the session accepted.
    pub imported: usize,
    /// Lines without a cookie (blank, comment, too few fields).
    pub skipped: usize,
    /// Cookies the session rejected.
    pub failed: usize,
}

/// Import `path` into `session`, reporting what happened.
pub fn try_import(
    session: &dyn BrowsingSession,
    path: &Path,
) -> Result<ImportReport, CookieFileError> {
    let contents = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            CookieFileError::NotFound(path.to_path_buf())
        } else {
            CookieFileError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let mut report = ImportReport::default();
    for line in contents.lines() {
        let Some(record) = CookieRecord::parse_line(line) else {
            report.skipped += 1;
            continue;
        };
        match session.set_cookie(&record.to_session_cookie()) {
            Ok(()) => report.imported += 1,
            Err(err) => {
                log::debug!("skipping cookie {} for {}: {err}", record.name, record.domain);
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// Import `path` into `session`, returning the number of cookies set.
///
/// A missing file is not an error; an unreadable one is logged.
pub fn import(session: &dyn BrowsingSession, path: &Path) -> usize {
    match try_import(session, path) {
        Ok(report) => {
            if report.imported > 0 {
                log::info!("Imported {} cookies.", report.imported);
            }
            report.imported
        }
        Err(CookieFileError::NotFound(path)) => {
            log::debug!("no cookie file at {}", path.display());
            0
        }
        Err(err) => {
            log::warn!("{err}");
            0
        }
    }
}

/// `parseInt`-style: optional whitespace and sign, then the leading digits.
/// Anything without leading digits is 0.
fn parse_leading_int(field: &str) -> i64 {
    let s = field.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_line() {
        let record = CookieRecord::parse_line(
            ".example.com\tTRUE\t/\tTRUE\t1700000000\tsid\t  abc123 \r",
        )
        .unwrap();
        assert_eq!(record.domain, ".example.com");
        assert!(record.include_subdomains);
        assert_eq!(record.path, "/");
        assert!(record.secure);
        assert_eq!(record.expires_at, 1_700_000_000);
        assert_eq!(record.name, "sid");
        assert_eq!(record.value, "abc123");
    }

    #[test]
    fn url_strips_leading_dot_but_domain_keeps_it() {
        let record =
            CookieRecord::parse_line(".example.com\tTRUE\t/app\tFALSE\t0\tk\tv").unwrap();
        let cookie = record.to_session_cookie();
        assert_eq!(cookie.url, "http://example.com/app");
        assert_eq!(cookie.domain, ".example.com");
        assert!(!cookie.secure);
        assert_eq!(cookie.expiration_date, None);
    }

    #[test]
    fn secure_only_for_exact_true() {
        for flag in ["true", "True", "1", "yes", ""] {
            let line = format!("example.com\tFALSE\t/\t{flag}\t0\tk\tv");
            let record = CookieRecord::parse_line(&line).unwrap();
            assert!(!record.secure, "{flag:?} must not mark the cookie secure");
        }
    }

    #[test]
    fn skips_lines_without_cookie() {
        assert_eq!(CookieRecord::parse_line(""), None);
        assert_eq!(CookieRecord::parse_line("   \t "), None);
        assert_eq!(CookieRecord::parse_line("# Netscape HTTP Cookie File"), None);
        assert_eq!(
            CookieRecord::parse_line("#HttpOnly_.example.com\tTRUE\t/\tTRUE\t0\tk\tv"),
            None
        );
        assert_eq!(
            CookieRecord::parse_line("example.com\tTRUE\t/\tTRUE\t0\tk"),
            None
        );
    }

    #[test]
    fn expiry_uses_leading_integer() {
        assert_eq!(parse_leading_int("1700000000.5"), 1_700_000_000);
        assert_eq!(parse_leading_int(" 42abc"), 42);
        assert_eq!(parse_leading_int("-5"), -5);
        assert_eq!(parse_leading_int("never"), 0);
        assert_eq!(parse_leading_int(""), 0);
    }

    #[test]
    fn positive_expiry_is_kept() {
        let record =
            CookieRecord::parse_line("example.com\tFALSE\t/\tTRUE\t1700000000\tk\tv").unwrap();
        assert_eq!(
            record.to_session_cookie().expiration_date,
            Some(1_700_000_000)
        );
    }

    #[test]
    fn parse_file_keeps_order() {
        let contents = "# header\n\na.com\tFALSE\t/\tFALSE\t0\tone\t1\nb.com\tFALSE\t/\tFALSE\t0\ttwo\t2\n";
        let names: Vec<_> = parse_file(contents).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["one", "two"]);
    }
}
