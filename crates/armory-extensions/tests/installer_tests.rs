//! End-to-end installer tests against a mock platform and a temp directory

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use armory_core::{Error, Result};
use armory_extensions::{AssumeNo, AssumeYes, GithubCatalog, Installer, Prompter};

/// Build an in-memory zip from (entry name, contents) pairs
fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, contents) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

fn catalog(server: &MockServer) -> GithubCatalog {
    GithubCatalog::new("acme")
        .with_api_url(server.uri())
        .with_host_url(server.uri())
}

/// Mount the releases listing for an extension
async fn mock_releases(server: &MockServer, name: &str, versions: &[&str]) {
    let body: Vec<serde_json::Value> = versions
        .iter()
        .map(|tag| serde_json::json!({ "tag_name": tag, "prerelease": false }))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/repos/acme/{}/releases", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the conventional release archive for an extension version
async fn mock_archive(server: &MockServer, name: &str, version: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/acme/{}/releases/download/{}/{}_{}.zip",
            name, version, name, version
        )))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

/// Names of the immediate subdirectories of `dir`, sorted
fn subdirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// All entries (files and directories) of `dir`, sorted
fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn installs_exact_version_into_empty_directory() {
    let server = MockServer::start().await;
    mock_releases(&server, "iis-orchestrator", &["2.2.2"]).await;
    mock_archive(
        &server,
        "iis-orchestrator",
        "2.2.2",
        zip_bytes(&[("manifest.json", b"{}"), ("bin/ext.dll", b"binary")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["iis-orchestrator@2.2.2"])
        .with_extension_dir(dir.path());

    installer.run(&AssumeYes).await.unwrap();

    let dest = dir.path().join("iis-orchestrator_2.2.2");
    assert!(dest.join("manifest.json").exists());
    assert!(dest.join("bin/ext.dll").exists());
    // The transient archive must be gone
    assert_eq!(entries(dir.path()), vec!["iis-orchestrator_2.2.2"]);
}

#[tokio::test]
async fn preflight_resolves_latest_to_newest_release() {
    let server = MockServer::start().await;
    mock_releases(&server, "foo-pam", &["3.0.0", "2.0.0"]).await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["foo-pam@latest"])
        .with_extension_dir(dir.path());

    installer.preflight().await.unwrap();

    let expected: BTreeMap<String, String> =
        [("foo-pam".to_string(), "3.0.0".to_string())].into();
    assert_eq!(installer.requested_versions(), &expected);
    assert!(!installer
        .requested_versions()
        .values()
        .any(|v| v == "latest"));
}

#[tokio::test]
async fn preflight_rejects_unknown_version() {
    let server = MockServer::start().await;
    mock_releases(&server, "ghost-orchestrator", &["1.0.0"]).await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["ghost-orchestrator@9.9.9"])
        .with_extension_dir(dir.path());

    let result = installer.preflight().await;
    assert!(matches!(result, Err(Error::UnknownExtension { .. })));
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn preflight_rejects_missing_repository() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/ghost-pam/releases"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["ghost-pam@1.0.0"])
        .with_extension_dir(dir.path());

    let result = installer.preflight().await;
    assert!(matches!(result, Err(Error::UnknownExtension { .. })));
}

#[tokio::test]
async fn preflight_requires_extension_directory() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-pam", &["1.0.0"]).await;

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist");
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["a-pam@1.0.0"])
        .with_extension_dir(&missing);

    let result = installer.preflight().await;
    assert!(matches!(result, Err(Error::MissingDirectory { .. })));
}

#[tokio::test]
async fn prune_removes_everything_unrequested() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-orchestrator", &["2.0.0", "1.0.0"]).await;
    mock_archive(
        &server,
        "a-orchestrator",
        "2.0.0",
        zip_bytes(&[("manifest.json", b"{}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("a-orchestrator_1.0.0")).unwrap();
    std::fs::create_dir(dir.path().join("b-orchestrator_1.0.0")).unwrap();

    let mut installer = Installer::new(catalog(&server))
        .with_request(&["a-orchestrator@2.0.0"])
        .with_extension_dir(dir.path())
        .prune(true);

    installer.run(&AssumeYes).await.unwrap();

    assert_eq!(subdirs(dir.path()), vec!["a-orchestrator_2.0.0"]);
}

#[tokio::test]
async fn upgrade_replaces_old_version_without_prune() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-orchestrator", &["2.0.0", "1.0.0"]).await;
    mock_archive(
        &server,
        "a-orchestrator",
        "2.0.0",
        zip_bytes(&[("manifest.json", b"{}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("a-orchestrator_1.0.0")).unwrap();
    std::fs::create_dir(dir.path().join("keep-pam_1.0.0")).unwrap();

    let mut installer = Installer::new(catalog(&server))
        .with_request(&["a-orchestrator@2.0.0"])
        .with_extension_dir(dir.path());

    installer.run(&AssumeYes).await.unwrap();

    // The old version always makes way; unrequested extensions survive
    assert_eq!(
        subdirs(dir.path()),
        vec!["a-orchestrator_2.0.0", "keep-pam_1.0.0"]
    );
}

#[tokio::test]
async fn upgrade_flag_refreshes_installed_extensions() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-orchestrator", &["3.0.0", "1.0.0"]).await;
    mock_archive(
        &server,
        "a-orchestrator",
        "3.0.0",
        zip_bytes(&[("manifest.json", b"{}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("a-orchestrator_1.0.0")).unwrap();

    let mut installer = Installer::new(catalog(&server))
        .with_extension_dir(dir.path())
        .upgrade(true);

    installer.run(&AssumeYes).await.unwrap();

    assert_eq!(subdirs(dir.path()), vec!["a-orchestrator_3.0.0"]);
}

#[tokio::test]
async fn upgrade_flag_does_not_override_explicit_request() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-orchestrator", &["3.0.0", "2.0.0", "1.0.0"]).await;
    mock_archive(
        &server,
        "a-orchestrator",
        "2.0.0",
        zip_bytes(&[("manifest.json", b"{}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("a-orchestrator_1.0.0")).unwrap();

    let mut installer = Installer::new(catalog(&server))
        .with_request(&["a-orchestrator@2.0.0"])
        .with_extension_dir(dir.path())
        .upgrade(true);

    installer.run(&AssumeYes).await.unwrap();

    // Pinned to 2.0.0 even though 3.0.0 is newest
    assert_eq!(subdirs(dir.path()), vec!["a-orchestrator_2.0.0"]);
}

#[tokio::test]
async fn consecutive_runs_are_idempotent() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-pam", &["1.0.0"]).await;
    mock_archive(
        &server,
        "a-pam",
        "1.0.0",
        zip_bytes(&[("manifest.json", b"{\"id\":1}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();

    for _ in 0..2 {
        let mut installer = Installer::new(catalog(&server))
            .with_request(&["a-pam@1.0.0"])
            .with_extension_dir(dir.path())
            .prune(true);
        installer.run(&AssumeYes).await.unwrap();
    }

    assert_eq!(entries(dir.path()), vec!["a-pam_1.0.0"]);
    assert_eq!(
        std::fs::read(dir.path().join("a-pam_1.0.0/manifest.json")).unwrap(),
        b"{\"id\":1}"
    );
}

/// Prompter that fails the test if any prompt fires
struct NoPrompts;

impl Prompter for NoPrompts {
    fn confirm(&self, _message: &str, _help: &str) -> Result<bool> {
        panic!("confirmation requested for an empty request set");
    }

    fn multi_select(&self, _message: &str, _options: &[String]) -> Result<Vec<String>> {
        panic!("selection requested outside interactive mode");
    }
}

#[tokio::test]
async fn empty_request_set_skips_confirmation() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut installer = Installer::new(catalog(&server)).with_extension_dir(dir.path());

    installer.run(&NoPrompts).await.unwrap();
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn declined_confirmation_exits_cleanly() {
    let server = MockServer::start().await;
    mock_releases(&server, "a-pam", &["1.0.0"]).await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_request(&["a-pam@1.0.0"])
        .with_extension_dir(dir.path());

    installer.run(&AssumeNo).await.unwrap();
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn traversal_archive_aborts_and_clears_destination() {
    let server = MockServer::start().await;
    mock_releases(&server, "evil-pam", &["1.0.0"]).await;

    // Hand-build a zip whose entry climbs out of the destination
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("../escape.txt", options).unwrap();
        zip.write_all(b"escape").unwrap();
        zip.finish().unwrap();
    }
    mock_archive(&server, "evil-pam", "1.0.0", cursor.into_inner()).await;

    let parent = TempDir::new().unwrap();
    let dir = parent.path().join("extensions");
    std::fs::create_dir(&dir).unwrap();

    let mut installer = Installer::new(catalog(&server))
        .with_request(&["evil-pam@1.0.0"])
        .with_extension_dir(&dir);

    let result = installer.run(&AssumeYes).await;
    assert!(matches!(result, Err(Error::PathTraversal { .. })));
    assert!(!parent.path().join("escape.txt").exists());
    assert!(!dir.join("escape.txt").exists());
    assert!(entries(&dir).is_empty());
}

/// Prompter that confirms and picks a fixed set of options
struct PickNames(Vec<String>);

impl Prompter for PickNames {
    fn confirm(&self, _message: &str, _help: &str) -> Result<bool> {
        Ok(true)
    }

    fn multi_select(&self, _message: &str, options: &[String]) -> Result<Vec<String>> {
        Ok(self
            .0
            .iter()
            .filter(|n| options.contains(n))
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn interactive_selection_installs_at_latest() {
    let server = MockServer::start().await;

    // Catalog pages
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(wiremock::matchers::query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "b-pam" },
            { "name": "a-orchestrator" },
            { "name": "unrelated" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(wiremock::matchers::query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    mock_releases(&server, "b-pam", &["2.1.0", "2.0.0"]).await;
    mock_archive(
        &server,
        "b-pam",
        "2.1.0",
        zip_bytes(&[("manifest.json", b"{}")]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut installer = Installer::new(catalog(&server))
        .with_extension_dir(dir.path())
        .interactive(true);

    let prompter = PickNames(vec!["b-pam".to_string()]);
    installer.run(&prompter).await.unwrap();

    assert_eq!(subdirs(dir.path()), vec!["b-pam_2.1.0"]);
}
