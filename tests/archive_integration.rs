//! End-to-end tests for resolving a record and downloading its pages.
//!
//! A single wiremock server plays the landing page, the manifest host, and
//! the IIIF image server.

mod support;

use std::path::Path;

use antenati_core::{
    DownloadError, FailureType, HeaderSet, HttpClient, IdentifierError, MetadataError, NoProgress,
    PortalClient, PortalError, Quality, RecordDownloader, classify_error,
};
use support::portal_mock::{
    RecordFixture, image_body, image_path, manifest_path, mount_images, mount_page_and_manifest,
    mount_record, page_url,
};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpClient {
    HttpClient::new(&HeaderSet::browser()).expect("client should build")
}

fn portal(server: &MockServer) -> PortalClient {
    PortalClient::with_manifest_base_url(client(), server.uri())
}

/// Resolves the record on `server` and downloads it under `root`.
async fn run_record(
    server: &MockServer,
    root: &Path,
    quality: Quality,
    start_at: u32,
) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let client = client();
    let portal = PortalClient::with_manifest_base_url(client.clone(), server.uri());
    let archive = portal.fetch_archive(&page_url(server)).await?;
    let dest = root.join(archive.metadata.relative_dir());
    RecordDownloader::new(&client, quality)
        .download_all(&archive.image_urls, &dest, start_at, &NoProgress)
        .await?;
    Ok(dest)
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("dest dir should exist")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_fetch_archive_derives_metadata_and_urls() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_page_and_manifest(&server, &fixture).await;

    let archive = portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap();

    assert_eq!(archive.id.as_str(), "abc1234");
    assert_eq!(archive.metadata.city, "Milano");
    assert_eq!(archive.metadata.record_type, "Nascita");
    assert_eq!(archive.metadata.year, "1887");
    assert_eq!(archive.metadata.archive, "ArchivioX");
    assert_eq!(archive.metadata.source, "FondoY");
    assert_eq!(archive.metadata.pages, 3);
    assert_eq!(archive.image_urls.len(), 3);
    assert!(archive.image_urls[0].ends_with("/iiif/2/p1/full/full/0/default.jpg"));
}

#[tokio::test]
async fn test_three_page_record_lands_in_city_type_year() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_record(&server, &fixture, 1024).await;
    let temp = TempDir::new().unwrap();

    let dest = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();

    assert_eq!(dest, temp.path().join("Milano").join("Nascita").join("1887"));
    assert_eq!(file_names(&dest), vec!["1.jpg", "2.jpg", "3.jpg"]);
    for n in 1..=3 {
        let content = std::fs::read(dest.join(format!("{n}.jpg"))).unwrap();
        assert_eq!(content, image_body(n));
    }
}

#[tokio::test]
async fn test_start_offset_pads_to_last_page_width() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_record(&server, &fixture, 1024).await;
    let temp = TempDir::new().unwrap();

    let dest = run_record(&server, temp.path(), Quality::Mid, 8)
        .await
        .unwrap();

    assert_eq!(file_names(&dest), vec!["08.jpg", "09.jpg", "10.jpg"]);
    assert_eq!(std::fs::read(dest.join("08.jpg")).unwrap(), image_body(1));
    assert_eq!(std::fs::read(dest.join("10.jpg")).unwrap(), image_body(3));
}

#[tokio::test]
async fn test_twelve_pages_are_two_digit_padded() {
    let server = MockServer::start().await;
    let fixture = RecordFixture {
        pages: 12,
        ..RecordFixture::default()
    };
    mount_record(&server, &fixture, 1024).await;
    let temp = TempDir::new().unwrap();

    let dest = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();

    let names = file_names(&dest);
    assert_eq!(names.len(), 12);
    assert_eq!(names.first().map(String::as_str), Some("01.jpg"));
    assert_eq!(names.last().map(String::as_str), Some("12.jpg"));
}

#[tokio::test]
async fn test_second_run_makes_no_image_requests() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_record(&server, &fixture, 1024).await;
    let temp = TempDir::new().unwrap();

    run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();
    server.verify().await;
    server.reset().await;

    mount_page_and_manifest(&server, &fixture).await;
    Mock::given(method("GET"))
        .and(path_regex("^/iiif/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dest = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();
    assert_eq!(std::fs::read(dest.join("2.jpg")).unwrap(), image_body(2));
}

#[tokio::test]
async fn test_high_quality_requests_2048_wide_images() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_record(&server, &fixture, 2048).await;
    let temp = TempDir::new().unwrap();

    let dest = run_record(&server, temp.path(), Quality::High, 1)
        .await
        .unwrap();
    assert_eq!(file_names(&dest).len(), 3);
}

#[tokio::test]
async fn test_explicit_pixel_width_is_requested() {
    let server = MockServer::start().await;
    let fixture = RecordFixture {
        pages: 1,
        ..RecordFixture::default()
    };
    mount_record(&server, &fixture, 777).await;
    let temp = TempDir::new().unwrap();

    let quality: Quality = "777".parse().unwrap();
    let dest = run_record(&server, temp.path(), quality, 1).await.unwrap();
    assert_eq!(file_names(&dest), vec!["1.jpg"]);
}

#[tokio::test]
async fn test_header_set_accompanies_every_request() {
    let server = MockServer::start().await;
    let fixture = RecordFixture {
        pages: 2,
        ..RecordFixture::default()
    };
    // Only requests carrying the portal headers are answered.
    Mock::given(method("GET"))
        .and(header("referer", "https://antenati.cultura.gov.it/"))
        .and(header("origin", "https://antenati.cultura.gov.it"))
        .and(header("pragma", "no-cache"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(support::portal_mock::viewer_html()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("referer", "https://antenati.cultura.gov.it/"))
        .and(header("origin", "https://antenati.cultura.gov.it"))
        .and(path(manifest_path()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(support::portal_mock::manifest_json(&server, &fixture)),
        )
        .expect(1)
        .mount(&server)
        .await;
    for n in 1..=2 {
        Mock::given(method("GET"))
            .and(header("referer", "https://antenati.cultura.gov.it/"))
            .and(header("pragma", "no-cache"))
            .and(path(image_path(n, 1024)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body(n)))
            .expect(1)
            .mount(&server)
            .await;
    }
    let temp = TempDir::new().unwrap();

    let dest = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();
    assert_eq!(file_names(&dest), vec!["1.jpg", "2.jpg"]);
}

#[tokio::test]
async fn test_page_without_marker_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no viewer</html>"))
        .mount(&server)
        .await;

    let err = portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap_err();

    match err {
        PortalError::Identifier { source, .. } => {
            assert_eq!(source, IdentifierError::MarkerNotFound);
        }
        other => panic!("expected identifier error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_manifest_server_error_is_typed_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(support::portal_mock::viewer_html()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(manifest_path()))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap_err();

    let transport = err.as_transport().expect("should be a transport error");
    assert!(matches!(
        transport,
        DownloadError::HttpStatus { status: 503, .. }
    ));
    assert_eq!(classify_error(transport), FailureType::Transient);
}

#[tokio::test]
async fn test_malformed_manifest_json_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(support::portal_mock::viewer_html()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(manifest_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"metadata\": ["))
        .mount(&server)
        .await;

    let err = portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::ManifestJson { .. }), "{err:?}");
}

#[tokio::test]
async fn test_manifest_missing_context_entry_is_structural_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(support::portal_mock::viewer_html()),
        )
        .mount(&server)
        .await;
    let mut manifest = support::portal_mock::manifest_json(&server, &RecordFixture::default());
    manifest["metadata"].as_array_mut().unwrap().truncate(3);
    Mock::given(method("GET"))
        .and(path(manifest_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
        .mount(&server)
        .await;

    let err = portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap_err();
    assert!(matches!(err, PortalError::Metadata(_)), "{err:?}");
}

/// Serves the default fixture with `edit` applied to the manifest JSON and
/// returns the resolution error.
async fn resolve_with_manifest_edit(edit: impl FnOnce(&mut serde_json::Value)) -> PortalError {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(support::portal_mock::PAGE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(support::portal_mock::viewer_html()),
        )
        .mount(&server)
        .await;
    let mut manifest = support::portal_mock::manifest_json(&server, &RecordFixture::default());
    edit(&mut manifest);
    Mock::given(method("GET"))
        .and(path(manifest_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
        .mount(&server)
        .await;

    portal(&server)
        .fetch_archive(&page_url(&server))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_manifest_without_sequences_is_structural_error() {
    let err = resolve_with_manifest_edit(|m| {
        m.as_object_mut().unwrap().remove("sequences");
    })
    .await;
    assert!(
        matches!(err, PortalError::Metadata(MetadataError::MissingSequence)),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_metadata_entry_without_value_is_structural_error() {
    let err = resolve_with_manifest_edit(|m| {
        m["metadata"][1].as_object_mut().unwrap().remove("value");
    })
    .await;
    assert!(
        matches!(err, PortalError::Metadata(MetadataError::NotText { index: 1 })),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_image_resource_without_id_is_structural_error() {
    let err = resolve_with_manifest_edit(|m| {
        m["sequences"][0]["canvases"][1]["images"][0]["resource"]
            .as_object_mut()
            .unwrap()
            .remove("@id");
    })
    .await;
    assert!(
        matches!(err, PortalError::Metadata(MetadataError::MissingImage { index: 1 })),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_failure_mid_batch_keeps_earlier_pages_and_resumes() {
    let server = MockServer::start().await;
    let fixture = RecordFixture::default();
    mount_page_and_manifest(&server, &fixture).await;
    Mock::given(method("GET"))
        .and(path(image_path(1, 1024)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(image_path(2, 1024)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("Milano/Nascita/1887");

    let err = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"), "{err}");
    assert_eq!(file_names(&dest), vec!["1.jpg"]);
    server.verify().await;

    // Server recovers: the rerun fetches only the missing pages.
    server.reset().await;
    mount_page_and_manifest(&server, &fixture).await;
    Mock::given(method("GET"))
        .and(path(image_path(1, 1024)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body(1)))
        .expect(0)
        .mount(&server)
        .await;
    for n in 2..=3 {
        Mock::given(method("GET"))
            .and(path(image_path(n, 1024)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image_body(n)))
            .expect(1)
            .mount(&server)
            .await;
    }

    run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap();
    assert_eq!(file_names(&dest), vec!["1.jpg", "2.jpg", "3.jpg"]);
}

#[tokio::test]
async fn test_images_without_matching_quality_mock_fail_the_run() {
    // Images mounted for 2048 only; a mid-quality run must not silently succeed.
    let server = MockServer::start().await;
    let fixture = RecordFixture {
        pages: 1,
        ..RecordFixture::default()
    };
    mount_page_and_manifest(&server, &fixture).await;
    mount_images(&server, 1, 2048, 0).await;
    let temp = TempDir::new().unwrap();

    let err = run_record(&server, temp.path(), Quality::Mid, 1)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}
