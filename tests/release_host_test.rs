//! Release lookups and source downloads against a mock upstream.

use apkforge::acquire::UpstreamSource;
use apkforge::artifact::ArtifactFinder;
use apkforge::build::BuildTool;
use apkforge::config::Settings;
use apkforge::host::{resolve_version, GitHubReleases, GitLabReleases, ReleaseHost, UpstreamHosts};
use apkforge::io::ForgePaths;
use apkforge::pipeline::{BuildOutcome, Pipeline};
use apkforge::registry::{AppDescriptor, Registry, RemoteKind};
use apkforge::{ForgeError, Result};
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_latest_release(server: &MockServer, repository: &str, tag: &str, branch: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{repository}/releases/latest")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": tag,
            "target_commitish": branch,
            "name": "Release",
            "draft": false
        })))
        .mount(server)
        .await;
}

fn source_tarball(root: &str) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let encoder = GzEncoder::new(&mut bytes, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let content = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{root}/gradlew"), &content[..])
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap();
    }
    bytes
}

#[tokio::test]
async fn test_github_latest_release() {
    let server = MockServer::start().await;
    mount_latest_release(&server, "acme/foo", "v1.2.0", "main").await;

    let host = GitHubReleases::new(&server.uri(), None).unwrap();
    let release = host.latest_release(RemoteKind::Github, "acme/foo").await.unwrap();

    assert_eq!(release.tag, "v1.2.0");
    assert_eq!(release.branch.as_deref(), Some("main"));
}

#[tokio::test]
async fn test_github_sends_token_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/foo/releases/latest"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tag_name": "2.0" })))
        .expect(1)
        .mount(&server)
        .await;

    let host = GitHubReleases::new(&server.uri(), Some("s3cret".to_string())).unwrap();
    let release = host.latest_release(RemoteKind::Github, "acme/foo").await.unwrap();

    assert_eq!(release.tag, "2.0");
    assert_eq!(release.branch, None);
}

#[tokio::test]
async fn test_github_without_releases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/empty/releases/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let host = GitHubReleases::new(&server.uri(), None).unwrap();
    let app = AppDescriptor::new("empty", "acme/empty", "master", RemoteKind::Github);

    match resolve_version(&host, &app).await {
        Err(ForgeError::VersionLookup { repository, reason }) => {
            assert_eq!(repository, "acme/empty");
            assert!(reason.contains("no published releases"));
        }
        other => panic!("Expected a version lookup error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_github_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/foo/releases/latest"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let host = GitHubReleases::new(&server.uri(), None).unwrap();
    let result = host.latest_release(RemoteKind::Github, "acme/foo").await;

    assert!(matches!(result, Err(ForgeError::VersionLookup { .. })));
}

#[tokio::test]
async fn test_github_malformed_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/foo/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "no tag here" })))
        .mount(&server)
        .await;

    let host = GitHubReleases::new(&server.uri(), None).unwrap();
    let result = host.latest_release(RemoteKind::Github, "acme/foo").await;

    assert!(matches!(result, Err(ForgeError::VersionLookup { .. })));
}

#[tokio::test]
async fn test_gitlab_latest_release_uses_encoded_project_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/projects/group%2Fapp/releases/permalink/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tag_name": "v3.1" })))
        .mount(&server)
        .await;

    let host = GitLabReleases::new(&server.uri()).unwrap();
    let release = host.latest_release(RemoteKind::Gitlab, "group/app").await.unwrap();

    assert_eq!(release.tag, "v3.1");
}

/// Drops a release artifact next to the wrapper
struct FakeGradle;

#[async_trait]
impl BuildTool for FakeGradle {
    async fn invoke(&self, _name: &str, tree: &Path) -> Result<()> {
        assert!(tree.join("gradlew").is_file());
        let outputs = tree.join("app/build/outputs/apk/release");
        std::fs::create_dir_all(&outputs)?;
        std::fs::write(outputs.join("app-release-unsigned.apk"), b"apk")?;
        Ok(())
    }
}

#[tokio::test]
async fn test_github_app_downloaded_built_and_published() {
    let server = MockServer::start().await;
    mount_latest_release(&server, "acme/foo", "v1.2.0", "main").await;
    Mock::given(method("GET"))
        .and(path("/acme/foo/archive/v1.2.0.tar.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(source_tarball("foo-1.2.0")))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let paths = ForgePaths::for_root(temp.path());
    Registry::new(paths.registry_file())
        .add(AppDescriptor::new("foo", "acme/foo", "main", RemoteKind::Github))
        .unwrap();

    let settings = Settings {
        github_api_url: server.uri(),
        github_download_url: server.uri(),
        ..Settings::default()
    };
    let pipeline = Pipeline::new(
        paths.clone(),
        Box::new(UpstreamHosts::from_settings(&settings).unwrap()),
        Box::new(UpstreamSource::from_settings(&settings).unwrap()),
        Box::new(FakeGradle),
        ArtifactFinder::from_settings(&settings).unwrap(),
    );

    let outcome = pipeline.build_app("foo").await.unwrap();
    assert!(matches!(outcome, BuildOutcome::Built { signed: false, .. }));
    assert!(paths
        .out_dir
        .join("foo-v1.2.0/foo-v1.2.0-unsigned.apk")
        .is_file());

    // Second run only asks for the latest release; the archive mock expects one hit
    let outcome = pipeline.build_app("foo").await.unwrap();
    assert!(matches!(outcome, BuildOutcome::AlreadyBuilt { .. }));
}
