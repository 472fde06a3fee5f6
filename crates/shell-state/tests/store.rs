use shell_state::{WindowState, WindowStateStore};
use std::fs;

#[test]
fn save_then_load_returns_same_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let store = WindowStateStore::new(dir.path().join("window-state.json"));

    let state = WindowState::sized(800, 600).with_position(10, 20);
    store.try_save(&state).unwrap();

    assert_eq!(store.load(), state);
}

#[test]
fn missing_file_yields_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = WindowStateStore::new(dir.path().join("absent.json"));

    let state = store.load();
    assert_eq!(state, WindowState::sized(658, 865));
    assert_eq!(state.position(), None);
}

#[test]
fn deleted_file_yields_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window-state.json");
    let store = WindowStateStore::new(&path);

    store.save(&WindowState::sized(1024, 768));
    fs::remove_file(&path).unwrap();

    assert_eq!(store.load(), WindowState::default());
}

#[test]
fn invalid_json_yields_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window-state.json");
    fs::write(&path, "{ this is not json").unwrap();

    assert_eq!(WindowStateStore::new(&path).load(), WindowState::default());
}

#[test]
fn zero_size_yields_configured_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("window-state.json");
    fs::write(&path, r#"{"x":1,"y":2,"width":0,"height":300}"#).unwrap();

    let defaults = WindowState::sized(500, 400);
    let store = WindowStateStore::new(&path).with_defaults(defaults);
    assert_eq!(store.load(), defaults);
}

#[test]
fn save_creates_parent_directories_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("app").join("window-state.json");
    let store = WindowStateStore::new(&path);

    store.save(&WindowState::sized(700, 500));
    store.save(&WindowState::sized(900, 650).with_position(-40, 12));

    let raw = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["x"], -40);
    assert_eq!(value["y"], 12);
    assert_eq!(value["width"], 900);
    assert_eq!(value["height"], 650);
}

#[test]
fn unwritable_path_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "file, not a directory").unwrap();

    let store = WindowStateStore::new(blocker.join("window-state.json"));
    assert!(store.try_save(&WindowState::default()).is_err());
    // The logging variant swallows the same failure.
    store.save(&WindowState::default());
}
