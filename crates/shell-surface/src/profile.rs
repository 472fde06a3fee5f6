//! On-disk browsing profile.
//!
//! The webview engines keep their data in well-known sub-directories of the
//! profile root: WebView2 under `EBWebView/`, WebKitGTK directly in the root
//! (with its disk cache under `WebKitCache`). Clearing a category removes the
//! matching entries for every engine; entries that don't exist are skipped.
//! An entry that can't be removed (a running engine may hold it locked) does
//! not stop the rest from being removed.

use crate::{Result, StorageKind, SurfaceError};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

const HTTP_CACHE: &[&str] = &[
    "EBWebView/Default/Cache",
    "EBWebView/Default/Code Cache",
    "WebKitCache",
    "cache/WebKitCache",
];

const SHADER_CACHE: &[&str] = &[
    "EBWebView/ShaderCache",
    "EBWebView/GrShaderCache",
    "EBWebView/Default/GPUCache",
];

const SERVICE_WORKERS: &[&str] = &[
    "EBWebView/Default/Service Worker/ScriptCache",
    "EBWebView/Default/Service Worker/Database",
    "serviceworkers",
];

const CACHE_STORAGE: &[&str] = &[
    "EBWebView/Default/Service Worker/CacheStorage",
    "CacheStorage",
];

const COOKIES: &[&str] = &[
    "EBWebView/Default/Network/Cookies",
    "EBWebView/Default/Network/Cookies-journal",
    "cookies.sqlite",
];

const LOCAL_STORAGE: &[&str] = &["EBWebView/Default/Local Storage", "localstorage"];

fn entries(kind: StorageKind) -> &'static [&'static str] {
    match kind {
        StorageKind::ShaderCache => SHADER_CACHE,
        StorageKind::ServiceWorkers => SERVICE_WORKERS,
        StorageKind::CacheStorage => CACHE_STORAGE,
        StorageKind::Cookies => COOKIES,
        StorageKind::LocalStorage => LOCAL_STORAGE,
    }
}

/// Root directory of a persistent browsing profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDirectory {
    root: PathBuf,
}

impl ProfileDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn clear_http_cache(&self) -> Result<()> {
        self.remove_entries(HTTP_CACHE)
    }

    /// Remove the on-disk data of each category in `kinds`.
    ///
    /// Every entry is attempted; the first failure is returned afterwards.
    pub fn clear(&self, kinds: &[StorageKind]) -> Result<()> {
        let mut first_error = None;
        for kind in kinds {
            log::debug!("clearing {} in {}", kind.as_str(), self.root.display());
            if let Err(err) = self.remove_entries(entries(*kind)) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Total bytes of the HTTP cache directories.
    pub fn http_cache_size(&self) -> Result<u64> {
        let mut total = 0;
        for rel in HTTP_CACHE {
            total += tree_size(&self.root.join(rel))?;
        }
        Ok(total)
    }

    fn remove_entries(&self, rels: &[&str]) -> Result<()> {
        let mut first_error = None;
        for rel in rels {
            let path = self.root.join(rel);
            if let Err(source) = remove_path(&path) {
                log::warn!("failed to remove {}: {source}", path.display());
                first_error.get_or_insert(SurfaceError::Storage { path, source });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn tree_size(path: &Path) -> Result<u64> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err.into()),
    };
    if !meta.is_dir() {
        return Ok(meta.len());
    }
    let mut total = 0;
    for entry in fs::read_dir(path)? {
        total += tree_size(&entry?.path())?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAINTENANCE_STORAGES;

    fn touch(root: &Path, rel: &str, bytes: usize) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; bytes]).unwrap();
    }

    fn populated() -> (tempfile::TempDir, ProfileDirectory) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "EBWebView/Default/Cache/Cache_Data/data_0", 100);
        touch(root, "EBWebView/Default/Code Cache/js/index", 20);
        touch(root, "WebKitCache/Version 16/Records/r1", 7);
        touch(root, "EBWebView/ShaderCache/data_1", 5);
        touch(root, "EBWebView/Default/Service Worker/ScriptCache/s", 5);
        touch(root, "EBWebView/Default/Service Worker/CacheStorage/c", 5);
        touch(root, "EBWebView/Default/Network/Cookies", 5);
        touch(root, "EBWebView/Default/Local Storage/leveldb/000003.log", 5);
        touch(root, "cookies.sqlite", 5);
        touch(root, "localstorage/https_app.example.com_0.localstorage", 5);
        let profile = ProfileDirectory::new(root);
        (dir, profile)
    }

    #[test]
    fn cache_size_counts_only_http_cache() {
        let (_dir, profile) = populated();
        assert_eq!(profile.http_cache_size().unwrap(), 127);
    }

    #[test]
    fn clear_http_cache_removes_cache_dirs() {
        let (dir, profile) = populated();
        profile.clear_http_cache().unwrap();

        assert_eq!(profile.http_cache_size().unwrap(), 0);
        assert!(!dir.path().join("WebKitCache").exists());
        assert!(dir.path().join("EBWebView/ShaderCache").exists());
    }

    #[test]
    fn maintenance_clear_preserves_cookies_and_local_storage() {
        let (dir, profile) = populated();
        let root = dir.path();

        profile.clear_http_cache().unwrap();
        profile.clear(&MAINTENANCE_STORAGES).unwrap();

        assert!(!root.join("EBWebView/ShaderCache").exists());
        assert!(!root.join("EBWebView/Default/Service Worker/ScriptCache").exists());
        assert!(!root.join("EBWebView/Default/Service Worker/CacheStorage").exists());

        assert!(root.join("EBWebView/Default/Network/Cookies").exists());
        assert!(root.join("EBWebView/Default/Local Storage/leveldb/000003.log").exists());
        assert!(root.join("cookies.sqlite").exists());
        assert!(root.join("localstorage").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failed_entry_does_not_stop_the_clear() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // Every `EBWebView/...` entry fails with "not a directory".
        touch(root, "EBWebView", 1);
        touch(root, "serviceworkers/registrations", 3);
        touch(root, "CacheStorage/salt", 3);
        touch(root, "WebKitCache/Version 16/Records/r1", 7);
        let profile = ProfileDirectory::new(root);

        assert!(profile.clear(&MAINTENANCE_STORAGES).is_err());
        assert!(profile.clear_http_cache().is_err());

        assert!(!root.join("serviceworkers").exists());
        assert!(!root.join("CacheStorage").exists());
        assert!(!root.join("WebKitCache").exists());
        assert!(root.join("EBWebView").is_file());
    }

    #[test]
    fn clearing_an_empty_profile_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ProfileDirectory::new(dir.path().join("never-created"));
        profile.clear(&[StorageKind::Cookies]).unwrap();
        assert_eq!(profile.http_cache_size().unwrap(), 0);
    }
}
