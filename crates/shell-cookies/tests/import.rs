use proptest::prelude::*;
use shell_cookies::{CookieFileError, CookieRecord, import, try_import};
use shell_surface::{BrowsingSession, SessionCookie, StorageKind, SurfaceError};
use std::cell::RefCell;
use std::fs;

#[derive(Default)]
struct RecordingSession {
    cookies: RefCell<Vec<SessionCookie>>,
    reject: Option<&'static str>,
}

impl RecordingSession {
    fn rejecting(name: &'static str) -> Self {
        Self {
            reject: Some(name),
            ..Self::default()
        }
    }

    fn names(&self) -> Vec<String> {
        self.cookies.borrow().iter().map(|c| c.name.clone()).collect()
    }
}

impl BrowsingSession for RecordingSession {
    fn set_cookie(&self, cookie: &SessionCookie) -> shell_surface::Result<()> {
        if self.reject == Some(cookie.name.as_str()) {
            return Err(SurfaceError::Cookie {
                name: cookie.name.clone(),
                reason: "rejected".into(),
            });
        }
        self.cookies.borrow_mut().push(cookie.clone());
        Ok(())
    }

    fn clear_http_cache(&self) -> shell_surface::Result<()> {
        Ok(())
    }

    fn clear_storage_data(&self, _kinds: &[StorageKind]) -> shell_surface::Result<()> {
        Ok(())
    }

    fn cache_size(&self) -> shell_surface::Result<u64> {
        Ok(0)
    }
}

const SAMPLE: &str = "# Netscape HTTP Cookie File\n\
# https://curl.se/docs/http-cookies.html\n\
\n\
.tvtime.com\tTRUE\t/\tTRUE\t1893456000\tsession\tabc\n\
app.tvtime.com\tFALSE\t/api\tFALSE\t0\tlang\ten \n\
broken line without tabs\n\
.example.com\tTRUE\t/\tTRUE\tsoon\tpref\tdark\n";

#[test]
fn imports_every_well_formed_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    fs::write(&path, SAMPLE).unwrap();

    let session = RecordingSession::default();
    let report = try_import(&session, &path).unwrap();

    assert_eq!(report.imported, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 4);
    assert_eq!(session.names(), vec!["session", "lang", "pref"]);

    let cookies = session.cookies.borrow();
    assert_eq!(cookies[0].url, "https://tvtime.com/");
    assert_eq!(cookies[0].domain, ".tvtime.com");
    assert_eq!(cookies[0].expiration_date, Some(1_893_456_000));
    assert_eq!(cookies[1].url, "http://app.tvtime.com/api");
    assert_eq!(cookies[1].value, "en");
    assert_eq!(cookies[2].expiration_date, None);
}

#[test]
fn rejected_cookie_does_not_stop_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    fs::write(&path, SAMPLE).unwrap();

    let session = RecordingSession::rejecting("lang");
    assert_eq!(import(&session, &path), 2);
    assert_eq!(session.names(), vec!["session", "pref"]);
}

#[test]
fn missing_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    let session = RecordingSession::default();

    assert_eq!(import(&session, &path), 0);
    assert!(session.cookies.borrow().is_empty());
    assert!(matches!(
        try_import(&session, &path),
        Err(CookieFileError::NotFound(_))
    ));
}

#[test]
fn unreadable_path_yields_zero() {
    let dir = tempfile::tempdir().unwrap();
    let session = RecordingSession::default();
    // A directory cannot be read as text.
    assert_eq!(import(&session, dir.path()), 0);
}

#[test]
fn crlf_files_import_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.txt");
    fs::write(
        &path,
        "# header\r\nexample.com\tFALSE\t/\tTRUE\t0\tid\t42\r\n",
    )
    .unwrap();

    let session = RecordingSession::default();
    assert_eq!(import(&session, &path), 1);
    assert_eq!(session.cookies.borrow()[0].value, "42");
}

fn field() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.=/-]{1,12}"
}

proptest! {
    #[test]
    fn secure_flag_and_scheme_agree(
        domain in "\\.?[a-z]{1,10}\\.(com|net|org)",
        path in "/[a-z]{0,8}",
        secure in prop_oneof![Just("TRUE".to_string()), Just("FALSE".to_string()), field()],
        expiry in any::<i64>(),
        name in field(),
        value in field(),
    ) {
        let line = format!("{domain}\tTRUE\t{path}\t{secure}\t{expiry}\t{name}\t{value}");
        let record = CookieRecord::parse_line(&line).unwrap();
        let cookie = record.to_session_cookie();

        prop_assert_eq!(record.secure, secure == "TRUE");
        let scheme = if secure == "TRUE" { "https://" } else { "http://" };
        prop_assert!(cookie.url.starts_with(scheme));
        prop_assert!(!cookie.url[scheme.len()..].starts_with('.'));
        prop_assert_eq!(cookie.domain, domain);
        prop_assert_eq!(cookie.expiration_date, (expiry > 0).then_some(expiry));
    }

    #[test]
    fn short_lines_never_reach_the_session(fields in prop::collection::vec(field(), 0..7)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.txt");
        let good = "example.com\tFALSE\t/\tFALSE\t0\tafter\tv";
        fs::write(&path, format!("{}\n{good}\n", fields.join("\t"))).unwrap();

        let session = RecordingSession::default();
        prop_assert_eq!(import(&session, &path), 1);
        prop_assert_eq!(session.names(), vec!["after".to_string()]);
    }
}
