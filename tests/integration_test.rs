//! Integration tests for the phototag core
//!
//! These tests drive the full pipeline (enumerate -> cache -> filter ->
//! sort -> export) through a `Session` wired to an in-memory metadata
//! backend, verifying the behavior a front-end observes end to end.

use phototag::cache::MetadataCache;
use phototag::config::AppConfig;
use phototag::metadata::{FormatTable, MetadataIo};
use phototag::session::{ListOptions, Session};
use phototag::sort::SortBy;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Metadata backend backed by a plain map, standing in for exiftool
struct StaticMetadata {
    formats: FormatTable,
    store: RefCell<HashMap<PathBuf, String>>,
}

impl StaticMetadata {
    fn new() -> Self {
        Self {
            formats: FormatTable::builtin(),
            store: RefCell::new(HashMap::new()),
        }
    }

    fn seed(&self, path: &Path, tags: &str) {
        self.store
            .borrow_mut()
            .insert(path.to_path_buf(), tags.to_string());
    }
}

impl MetadataIo for StaticMetadata {
    fn formats(&self) -> &FormatTable {
        &self.formats
    }

    fn read_tags(&self, path: &Path) -> String {
        self.store.borrow().get(path).cloned().unwrap_or_default()
    }

    fn write_tags(&self, path: &Path, tags: &str) -> bool {
        self.store
            .borrow_mut()
            .insert(path.to_path_buf(), tags.to_string());
        true
    }
}

fn create_image(folder: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(folder).unwrap();
    let path = folder.join(name);
    fs::write(&path, b"not a real image").unwrap();
    path
}

fn setup_session(dir: &TempDir) -> Session<StaticMetadata> {
    let cache = MetadataCache::load(dir.path().join("cache.json"));
    Session::with_backend(AppConfig::default(), cache, StaticMetadata::new())
}

#[test]
fn test_list_filter_sort_pipeline() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("gallery");
    create_image(&folder, "img10.jpg");
    create_image(&folder, "img2.jpg");
    create_image(&folder, "img1.jpg");
    create_image(&folder, "readme.txt");
    let folder = folder.canonicalize().unwrap();

    let mut session = setup_session(&dir);
    session.metadata().seed(&folder.join("img1.jpg"), "Cats, beach");
    session.metadata().seed(&folder.join("img2.jpg"), "dogs");
    session.metadata().seed(&folder.join("img10.jpg"), "cats");

    // AND query keeps only records carrying every term
    let options = ListOptions {
        recursive: false,
        filter: "cats".into(),
        sort: Some(SortBy::Name),
        descending: false,
    };
    let records = session.list_images(&folder, &options, None).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["img1.jpg", "img10.jpg"]);

    // OR query widens the match set
    let options = ListOptions {
        recursive: false,
        filter: "| dogs, beach".into(),
        sort: Some(SortBy::Name),
        descending: false,
    };
    let records = session.list_images(&folder, &options, None).unwrap();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["img1.jpg", "img2.jpg"]);
}

#[test]
fn test_cache_persists_across_sessions() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("gallery");
    create_image(&folder, "a.jpg");
    let folder = folder.canonicalize().unwrap();

    {
        let mut session = setup_session(&dir);
        session.metadata().seed(&folder.join("a.jpg"), "persisted");
        session
            .list_images(&folder, &ListOptions::default(), None)
            .unwrap();
    }

    // A brand-new session with an unseeded backend still sees the tags,
    // because the cache entry is fresh
    let mut session = setup_session(&dir);
    let records = session
        .list_images(&folder, &ListOptions::default(), None)
        .unwrap();
    assert_eq!(records[0].tags, "persisted");
}

#[test]
fn test_tag_write_then_search_roundtrip() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("gallery");
    create_image(&folder, "a.jpg");
    create_image(&folder, "b.jpg");
    let folder = folder.canonicalize().unwrap();

    let mut session = setup_session(&dir);
    let outcomes = session.write_tags(&[folder.join("a.jpg")], "holiday", false);
    assert!(outcomes[0].written);

    let options = ListOptions { filter: "holiday".into(), ..Default::default() };
    let records = session.list_images(&folder, &options, None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "a.jpg");
}

#[test]
fn test_export_rules_run_in_order_with_grouping() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("gallery");
    for i in 1..=5 {
        create_image(&folder, &format!("img{i}.jpg"));
    }
    let folder = folder.canonicalize().unwrap();

    let all_out = dir.path().join("exports").join("all.md");
    let none_out = dir.path().join("exports").join("none.md");
    fs::write(
        folder.join(".gallery_export.json"),
        format!(
            "{{\"{}\": \"pick\", \"{}\": \"nomatch\"}}",
            all_out.display(),
            none_out.display()
        ),
    )
    .unwrap();

    let mut config = AppConfig::default();
    config.export.heading = "# Picks".into();
    config.export.item_format = "$fn.$fe\n".into();
    config.export.group_by = 2;
    let cache = MetadataCache::load(dir.path().join("cache.json"));
    let meta = StaticMetadata::new();
    for i in 1..=5 {
        meta.seed(&folder.join(format!("img{i}.jpg")), "pick");
    }
    let mut session = Session::with_backend(config, cache, meta);

    let outcomes = session.export_folder(&folder, false).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(*outcomes[0].result.as_ref().unwrap(), 5);
    assert_eq!(*outcomes[1].result.as_ref().unwrap(), 0);

    let content = fs::read_to_string(&all_out).unwrap();
    assert_eq!(
        content,
        "# Picks\nimg1.jpg\nimg2.jpg\n\nimg3.jpg\nimg4.jpg\n\nimg5.jpg\n"
    );

    let empty = fs::read_to_string(&none_out).unwrap();
    assert_eq!(empty, "# Picks\n");
}

#[test]
fn test_refresh_picks_up_external_changes() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("gallery");
    create_image(&folder, "a.jpg");
    let folder = folder.canonicalize().unwrap();
    let image = folder.join("a.jpg");

    let mut session = setup_session(&dir);
    session.metadata().seed(&image, "before");
    let records = session
        .list_images(&folder, &ListOptions::default(), None)
        .unwrap();
    assert_eq!(records[0].tags, "before");

    // Simulate an external editor touching the file's metadata
    session.metadata().seed(&image, "after");
    std::thread::sleep(std::time::Duration::from_millis(250));
    fs::write(&image, b"modified bytes").unwrap();

    let summary = session.refresh_folder(&folder, false, false, None).unwrap();
    assert_eq!(summary.refreshed, 1);

    let records = session
        .list_images(&folder, &ListOptions::default(), None)
        .unwrap();
    assert_eq!(records[0].tags, "after");
}
