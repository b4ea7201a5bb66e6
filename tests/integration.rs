use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn waypost_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("waypost");
    path
}

/// Builds a content tree with folders, title files, markered and
/// unmarkered files, a hidden file, and non-text media:
///
/// ```text
/// content/               (root folder, title "Nature Trail")
///   titel.rtf
///   2-wald/              (title "The Forest")
///     titel.rtf
///     1-intro.md
///     photo.png
///     .hidden.md         (skipped)
///   10-wiese/            (title "The Meadow")
///     titel.rtf
///     song.mp3
///   anhang/              (no title file, label falls back to name)
///     notes.txt
/// ```
fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let content_dir = root.join("content");
    let wald = content_dir.join("2-wald");
    let wiese = content_dir.join("10-wiese");
    let anhang = content_dir.join("anhang");
    fs::create_dir_all(&wald).unwrap();
    fs::create_dir_all(&wiese).unwrap();
    fs::create_dir_all(&anhang).unwrap();

    fs::write(
        content_dir.join("titel.rtf"),
        r"{\rtf1\ansi Nature Trail\par}",
    )
    .unwrap();
    fs::write(wald.join("titel.rtf"), r"{\rtf1\ansi The Forest\par}").unwrap();
    fs::write(
        wald.join("1-intro.md"),
        "# Welcome\n\nAn introduction to the forest.",
    )
    .unwrap();
    fs::write(wald.join("photo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(wald.join(".hidden.md"), "never imported").unwrap();
    fs::write(wiese.join("titel.rtf"), r"{\rtf1\ansi The Meadow\par}").unwrap();
    fs::write(wiese.join("song.mp3"), [0xff, 0xfb, 0x90, 0x00]).unwrap();
    fs::write(anhang.join("notes.txt"), "Plain notes about the trail.").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/waypost.sqlite"

[import]
root = "{}/content"

[server]
bind = "127.0.0.1:7411"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("waypost.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_waypost(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = waypost_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run waypost binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_waypost(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data").join("waypost.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_waypost(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_waypost(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_counts_folders_and_files() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    let (stdout, stderr, success) = run_waypost(&config_path, &["import"]);
    assert!(
        success,
        "import failed: stdout={}, stderr={}",
        stdout, stderr
    );
    // 4 directories; 4 eligible files (3 title files consumed, 1 hidden skipped)
    assert!(
        stdout.contains("folders imported: 4"),
        "unexpected folder count: {}",
        stdout
    );
    assert!(
        stdout.contains("files imported: 4"),
        "unexpected file count: {}",
        stdout
    );
    assert!(stdout.contains("folders skipped: 0"));
    assert!(stdout.contains("ok"));
}

#[test]
fn test_import_missing_root_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    let (_, stderr, success) =
        run_waypost(&config_path, &["import", "--root", "/nonexistent/path"]);
    assert!(!success, "import of a missing root should fail");
    assert!(stderr.contains("Import root"));
}

#[test]
fn test_tree_shows_decoded_titles_with_filename_fallback() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);

    let (stdout, _, success) = run_waypost(&config_path, &["tree"]);
    assert!(success);
    // decoded RTF titles label the folders
    assert!(stdout.contains("Nature Trail"), "got: {}", stdout);
    assert!(stdout.contains("The Forest"));
    assert!(stdout.contains("The Meadow"));
    // no title file: label falls back to the folder name
    assert!(stdout.contains("anhang"));
    // file entries never appear in the site map
    assert!(!stdout.contains("photo.png"));

    // the root is the only unindented line
    let roots: Vec<&str> = stdout.lines().filter(|l| l.starts_with('[')).collect();
    assert_eq!(roots.len(), 1, "expected one top-level node: {}", stdout);
    assert!(roots[0].contains("Nature Trail"));
}

#[test]
fn test_second_import_adds_a_forest_root() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);
    run_waypost(&config_path, &["import"]);

    let (stdout, _, success) = run_waypost(&config_path, &["tree"]);
    assert!(success);
    let roots: Vec<&str> = stdout.lines().filter(|l| l.starts_with('[')).collect();
    assert_eq!(
        roots.len(),
        2,
        "expected two top-level nodes after two imports: {}",
        stdout
    );
}

#[test]
fn test_get_root_entry() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);

    // the import root is always the first row of its run
    let (stdout, _, success) = run_waypost(&config_path, &["get", "1"]);
    assert!(success, "get failed: {}", stdout);
    assert!(stdout.contains("parent_id: (top-level)"));
    assert!(stdout.contains("path:      /content"));
    assert!(stdout.contains("Nature Trail"));
    assert!(stdout.contains("3 folders, 0 images, 0 audio, 0 videos, 0 text, 0 other"));
}

#[test]
fn test_get_json_output() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);

    let (stdout, _, success) = run_waypost(&config_path, &["get", "1", "--json"]);
    assert!(success, "get --json failed: {}", stdout);

    let value: serde_json::Value = serde_json::from_str(&stdout).expect("output is valid JSON");
    assert_eq!(value["entry"]["id"], 1);
    assert_eq!(value["base_path"], "content");
    assert_eq!(value["breadcrumbs"].as_array().unwrap().len(), 1);
    assert_eq!(value["entries"]["folders"].as_array().unwrap().len(), 3);
}

#[test]
fn test_tree_json_output() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);

    let (stdout, _, success) = run_waypost(&config_path, &["tree", "--json"]);
    assert!(success, "tree --json failed: {}", stdout);

    let forest: serde_json::Value = serde_json::from_str(&stdout).expect("output is valid JSON");
    let roots = forest.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["display_name"], "Nature Trail");
    assert_eq!(roots[0]["children"].as_array().unwrap().len(), 3);
}

#[test]
fn test_get_missing_entry_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    let (_, stderr, success) = run_waypost(&config_path, &["get", "999"]);
    assert!(!success, "get with missing id should fail");
    assert!(stderr.contains("not found"), "got: {}", stderr);
}

#[test]
fn test_set_updates_content_idempotently() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    run_waypost(&config_path, &["import"]);

    let (stdout, _, success) = run_waypost(&config_path, &["set", "1", "Renamed Trail"]);
    assert!(success, "set failed: {}", stdout);
    assert!(stdout.contains("updated entry 1"));

    // setting the same value again changes nothing
    let (_, _, success) = run_waypost(&config_path, &["set", "1", "Renamed Trail"]);
    assert!(success);

    let (stdout, _, _) = run_waypost(&config_path, &["get", "1"]);
    assert!(stdout.contains("Renamed Trail"));
    assert!(!stdout.contains("Nature Trail"));

    // last writer wins
    let (_, _, success) = run_waypost(&config_path, &["set", "1", "Final Trail"]);
    assert!(success);
    let (stdout, _, _) = run_waypost(&config_path, &["get", "1"]);
    assert!(stdout.contains("Final Trail"));
}

#[test]
fn test_set_missing_entry_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_waypost(&config_path, &["init"]);
    let (_, stderr, success) = run_waypost(&config_path, &["set", "999", "x"]);
    assert!(!success, "set with missing id should fail");
    assert!(stderr.contains("not found"));
}

#[test]
fn test_import_creates_schema_on_demand() {
    let (_tmp, config_path) = setup_test_env();

    // no prior init: the importer sets up the schema itself
    let (stdout, stderr, success) = run_waypost(&config_path, &["import"]);
    assert!(
        success,
        "import without init failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("folders imported: 4"));
}

#[test]
fn test_bad_config_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("waypost.toml");
    fs::write(&config_path, "this is not toml at all [[[").unwrap();

    let (_, stderr, success) = run_waypost(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("parse"), "got: {}", stderr);
}
