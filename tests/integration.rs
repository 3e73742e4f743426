use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn bhx_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("bhx");
    path
}

fn write_post(root: &Path, folder: &str, content: &str) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.mdx"), content).unwrap();
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let blog = root.join("content/blog");
    write_post(
        &blog,
        "winter-heat",
        "---\ntitle: \"Winter heat rules\"\ndate: 2024-11-01\ntags: [\"Heat\", \"Rights\"]\n---\n<p>Between October 1 and May 31 landlords must keep apartments warm.</p>",
    );
    write_post(
        &blog,
        "bedbug-checklist",
        "---\ntitle: Bedbug checklist\ndate: 2024-09-15\ntags: [\"Pests\"]\n---\n<p>Check seams and outlets before you sign.</p>",
    );
    write_post(
        &blog,
        "boiler-basics",
        "---\ntitle: Boiler basics\ndate: 2024-10-01\ntags: [\"Heat\"]\n---\n<p>How building boilers work.</p>",
    );

    let config_content = format!(
        r#"[content]
root = "{}/content/blog"

[server]
bind = "127.0.0.1:3000"

[site]
url = "https://bhx.example"
"#,
        root.display()
    );

    let config_path = config_dir.join("bhx.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_bhx(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = bhx_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run bhx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_posts_list_newest_first() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_bhx(&config_path, &["posts", "list"]);
    assert!(success, "list failed: stdout={}, stderr={}", stdout, stderr);

    let winter = stdout.find("winter-heat").unwrap();
    let boiler = stdout.find("boiler-basics").unwrap();
    let bedbug = stdout.find("bedbug-checklist").unwrap();
    assert!(winter < boiler && boiler < bedbug, "wrong order:\n{}", stdout);
    assert!(stdout.contains("page 1/1 (3 posts)"));
}

#[test]
fn test_posts_list_by_tag() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_bhx(&config_path, &["posts", "list", "--tag", "Pests"]);
    assert!(success);
    assert!(stdout.contains("bedbug-checklist"));
    assert!(!stdout.contains("winter-heat"));

    let (stdout, _, success) = run_bhx(&config_path, &["posts", "list", "--tag", "pests"]);
    assert!(success);
    assert!(stdout.contains("(0 posts)"));
}

#[test]
fn test_posts_get() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_bhx(&config_path, &["posts", "get", "winter-heat"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("title:     Winter heat rules"));
    assert!(stdout.contains("<p>Between October 1 and May 31"));
}

#[test]
fn test_posts_get_unknown_slug() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_bhx(&config_path, &["posts", "get", "nope"]);
    assert!(!success);
    assert!(
        stderr.contains("post not found"),
        "Should report not found, got: {}",
        stderr
    );
}

#[test]
fn test_related_and_tags() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_bhx(
        &config_path,
        &["posts", "related", "winter-heat", "--count", "1"],
    );
    assert!(success);
    assert!(stdout.contains("boiler-basics"));
    assert!(!stdout.contains("bedbug-checklist"));

    let (stdout, _, success) = run_bhx(&config_path, &["tags"]);
    assert!(success);
    let heat = stdout.find("Heat").unwrap();
    let pests = stdout.find("Pests").unwrap();
    assert!(heat < pests);

    let (stdout, _, success) = run_bhx(&config_path, &["tags", "--distinct"]);
    assert!(success);
    let names: Vec<&str> = stdout.lines().collect();
    assert_eq!(names, vec!["Heat", "Pests", "Rights"]);
}

#[test]
fn test_sitemap_lists_service_pages_before_posts() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_bhx(&config_path, &["sitemap"]);
    assert!(success);
    let service = stdout
        .find("<loc>https://bhx.example/services/building-inspectors/stapleton</loc>")
        .unwrap();
    let post = stdout
        .find("<loc>https://bhx.example/blog/winter-heat</loc>")
        .unwrap();
    assert!(service < post);
}

#[test]
fn test_sitemap() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_bhx(&config_path, &["sitemap"]);
    assert!(success);
    assert!(stdout.starts_with("<?xml"));
    assert!(stdout.contains("<loc>https://bhx.example/blog/winter-heat</loc>"));
}

#[test]
fn test_missing_content_root_lists_nothing() {
    let (tmp, config_path) = setup_test_env();
    fs::remove_dir_all(tmp.path().join("content")).unwrap();

    let (stdout, stderr, success) = run_bhx(&config_path, &["posts", "list"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("(0 posts)"));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_bhx(&tmp.path().join("absent.toml"), &["tags"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
