//! Mock Portale Antenati: landing page, manifest host, and IIIF image server
//! on one wiremock server.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Identifier embedded in the mock landing page.
pub const ARCHIVE_ID: &str = "abc1234";

/// Path of the mock landing page.
pub const PAGE_PATH: &str = "/ark:/12657/an_ua19944535";

/// Shape of the record served by the mock.
#[derive(Debug, Clone)]
pub struct RecordFixture {
    pub record_type: &'static str,
    pub year: &'static str,
    pub context: &'static str,
    pub pages: usize,
}

impl Default for RecordFixture {
    fn default() -> Self {
        Self {
            record_type: "Nascita",
            year: "1887 - 1888/12",
            context: "ArchivioX > FondoY > Milano",
            pages: 3,
        }
    }
}

/// Landing page URL on the mock server.
pub fn page_url(server: &MockServer) -> String {
    format!("{}{PAGE_PATH}", server.uri())
}

/// Manifest path for [`ARCHIVE_ID`].
pub fn manifest_path() -> String {
    format!("/antenati/containers/{ARCHIVE_ID}/manifest")
}

/// Image path requested for page `n` (1-based canvas index) at `pixels`.
pub fn image_path(n: usize, pixels: u32) -> String {
    format!("/iiif/2/p{n}/full/{pixels},/0/default.jpg")
}

/// Body served for page `n`.
pub fn image_body(n: usize) -> Vec<u8> {
    format!("JPEG page {n}").into_bytes()
}

/// Viewer HTML carrying the identifier marker.
pub fn viewer_html() -> String {
    format!(
        "<html><head><script>\n  let windowsId = '{ARCHIVE_ID}';\n</script></head><body>viewer</body></html>"
    )
}

/// Manifest JSON whose image URLs point back at `server`.
pub fn manifest_json(server: &MockServer, fixture: &RecordFixture) -> serde_json::Value {
    let canvases: Vec<_> = (1..=fixture.pages)
        .map(|n| {
            json!({
                "@id": format!("{}/canvas/p{n}", server.uri()),
                "label": format!("pag. {n}"),
                "images": [{
                    "resource": {
                        "@id": format!("{}/iiif/2/p{n}/full/full/0/default.jpg", server.uri()),
                        "format": "image/jpeg"
                    }
                }]
            })
        })
        .collect();

    json!({
        "@context": "http://iiif.io/api/presentation/2/context.json",
        "@id": format!("{}{}", server.uri(), manifest_path()),
        "label": "Registro",
        "metadata": [
            {"label": "Titolo", "value": "Registro"},
            {"label": "Tipologia", "value": fixture.record_type},
            {"label": "Datazione", "value": fixture.year},
            {"label": "Contesto archivistico", "value": fixture.context}
        ],
        "sequences": [{"canvases": canvases}]
    })
}

/// Mounts the landing page and manifest.
pub async fn mount_page_and_manifest(server: &MockServer, fixture: &RecordFixture) {
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(viewer_html()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(manifest_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_json(server, fixture)))
        .mount(server)
        .await;
}

/// Mounts one image endpoint per page at `pixels`, each expected `expected_hits` times.
pub async fn mount_images(server: &MockServer, pages: usize, pixels: u32, expected_hits: u64) {
    for n in 1..=pages {
        Mock::given(method("GET"))
            .and(path(image_path(n, pixels)))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "image/jpeg")
                    .set_body_bytes(image_body(n)),
            )
            .expect(expected_hits)
            .mount(server)
            .await;
    }
}

/// Mounts a complete record: page, manifest, and images at `pixels`.
pub async fn mount_record(server: &MockServer, fixture: &RecordFixture, pixels: u32) {
    mount_page_and_manifest(server, fixture).await;
    mount_images(server, fixture.pages, pixels, 1).await;
}
