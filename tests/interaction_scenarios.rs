//! End-to-end form interactions against stubbed station lists and generators.

use actix_web::{http::header, test, web, App};
use amy_epw::{
    AmyEpw, AmyEpwBackend, AmyRequest, AmyRunResult, BackendError, CatalogSource,
    DataSourceError,
};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const TABLE: &str = "\
WMO-Station ID;StationName;Latitude;Longitude;Height;Country
10384;Berlin-Tempelhof                        ;  52.47;  13.40;   48;Germany
10147;Hamburg-Fuhlsbuettel                    ;  53.63;  10.00;   11;Germany
06260;De Bilt                                 ;  52.10;   5.18;    2;Netherlands
";

struct TableSource {
    fetches: AtomicUsize,
}

#[async_trait]
impl CatalogSource for TableSource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, DataSourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(TABLE.as_bytes().to_vec())
    }
}

struct OfflineSource;

#[async_trait]
impl CatalogSource for OfflineSource {
    fn describe(&self) -> String {
        "offline".to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, DataSourceError> {
        Err(DataSourceError::DownloadIo(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }
}

enum Reply {
    Path(PathBuf),
    Raise(&'static str),
}

struct StubGenerator {
    reply: Reply,
    requests: Mutex<Vec<AmyRequest>>,
}

impl StubGenerator {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<AmyRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AmyEpwBackend for StubGenerator {
    async fn create_amy_epw_files(
        &self,
        request: &AmyRequest,
    ) -> Result<AmyRunResult, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Path(path) => Ok(AmyRunResult::single(
                request.years[0],
                request.wmo_indices[0],
                "ok",
                path,
            )),
            Reply::Raise(message) => Err(BackendError::Raised(message.to_string())),
        }
    }
}

fn service(source: Arc<dyn CatalogSource>, generator: Arc<StubGenerator>) -> web::Data<AmyEpw> {
    web::Data::new(
        AmyEpw::builder()
            .catalog_source(source)
            .backend(generator)
            .build(),
    )
}

fn table_source() -> Arc<TableSource> {
    Arc::new(TableSource {
        fetches: AtomicUsize::new(0),
    })
}

fn generate_request() -> test::TestRequest {
    test::TestRequest::post().uri("/generate").set_form([
        ("country", "Germany"),
        ("city", "Berlin-Tempelhof"),
        ("year", "2020"),
    ])
}

/// The `href` of the download link on a success page.
fn download_link(html: &str) -> String {
    let start = html.find("href=\"/download/").expect("download link") + "href=\"".len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].to_string()
}

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn scenario_a_success_offers_download() {
    let outside = TempDir::new().unwrap();
    let epw_path = outside.path().join("berlin_2020.epw");
    std::fs::write(&epw_path, b"EPW-DATA").unwrap();
    let generator = StubGenerator::new(Reply::Path(epw_path));

    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator.clone()))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request().to_request()).await;
    assert!(resp.status().is_success());
    let html = body_text(resp).await;

    assert!(html.contains("EPW file for Berlin-Tempelhof, Germany (2020) is ready."));
    assert!(html.contains("download=\"berlin_2020.epw\""));
    assert!(!html.contains("class=\"error\""));

    let link = download_link(&html);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&link).to_request()).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("filename=\"berlin_2020.epw\""));
    assert_eq!(test::read_body(resp).await.as_ref(), b"EPW-DATA");

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].years, vec![2020]);
    assert_eq!(requests[0].wmo_indices, vec![10384]);
    assert!(requests[0].allow_downloads);
    assert!(!requests[0].amy_epw_dir.exists());
}

#[actix_web::test]
async fn unknown_download_token_is_not_found() {
    let generator = StubGenerator::new(Reply::Raise("unused"));
    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/download/0000000000000000")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
    let html = body_text(resp).await;
    assert!(html.contains("this download has expired"));
}

#[actix_web::test]
async fn scenario_b_missing_file_is_reported() {
    let outside = TempDir::new().unwrap();
    let generator = StubGenerator::new(Reply::Path(outside.path().join("missing.epw")));

    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request().to_request()).await;
    let html = body_text(resp).await;

    assert!(html.contains("class=\"error\""));
    assert!(html.contains("generation failed"));
    assert!(!html.contains("Download EPW"));
    assert!(!html.contains("class=\"success\""));
}

#[actix_web::test]
async fn scenario_c_generator_exception_is_reported() {
    let generator = StubGenerator::new(Reply::Raise("network timeout"));

    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(&app, generate_request().to_request()).await;
    let html = body_text(resp).await;

    assert!(html.contains("Exception during generation: network timeout"));
    assert!(!html.contains("Download EPW"));
}

#[actix_web::test]
async fn scenario_d_catalog_failure_hides_selectors() {
    let generator = StubGenerator::new(Reply::Raise("unused"));

    let app = test::init_service(
        App::new()
            .app_data(service(Arc::new(OfflineSource), generator.clone()))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status().as_u16(), 503);
    let html = body_text(resp).await;
    assert!(html.contains("Station list unavailable"));
    assert!(html.contains("connection refused"));
    assert!(!html.contains("<select"));

    let resp = test::call_service(&app, generate_request().to_request()).await;
    assert_eq!(resp.status().as_u16(), 503);
    assert!(generator.requests().is_empty());
}

#[actix_web::test]
async fn form_narrows_cities_and_memoizes_catalog() {
    let source = table_source();
    let generator = StubGenerator::new(Reply::Raise("unused"));
    let app = test::init_service(
        App::new()
            .app_data(service(source.clone(), generator))
            .configure(amy_epw::web::configure),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let html = body_text(resp).await;
    assert!(html.contains("<option value=\"Germany\" selected>Germany</option>"));
    assert!(html.contains("<option value=\"Berlin-Tempelhof\" selected>"));
    assert!(html.contains("Hamburg-Fuhlsbuettel"));
    assert!(!html.contains("De Bilt"));
    assert!(html.contains("value=\"2020\""));

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/?country=Netherlands&city=Hamburg-Fuhlsbuettel&year=1800")
            .to_request(),
    )
    .await;
    let html = body_text(resp).await;
    assert!(html.contains("<option value=\"De Bilt\" selected>De Bilt</option>"));
    assert!(!html.contains("Hamburg-Fuhlsbuettel"));
    assert!(html.contains("value=\"1979\""));

    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
}

#[actix_web::test]
async fn out_of_range_year_is_rejected() {
    let generator = StubGenerator::new(Reply::Raise("unused"));
    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator.clone()))
            .configure(amy_epw::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_form([
            ("country", "Germany"),
            ("city", "Berlin-Tempelhof"),
            ("year", "2031"),
        ])
        .to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("Year 2031 is outside the supported range 1979-2025"));
    assert!(generator.requests().is_empty());
}

#[actix_web::test]
async fn incomplete_form_renders_error_page() {
    let generator = StubGenerator::new(Reply::Raise("unused"));
    let app = test::init_service(
        App::new()
            .app_data(service(table_source(), generator.clone()))
            .configure(amy_epw::web::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/generate")
        .set_form([("country", "Germany"), ("year", "2020")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let html = body_text(resp).await;
    assert!(html.contains("class=\"error\""));
    assert!(html.contains("Please select a city before generating."));
    assert!(!html.contains("Download EPW"));
    // The form is still there, preselected from what was posted.
    assert!(html.contains("<option value=\"Germany\" selected>Germany</option>"));
    assert!(generator.requests().is_empty());
}

#[actix_web::test]
async fn json_api_and_refresh() {
    let source = table_source();
    let generator = StubGenerator::new(Reply::Raise("unused"));
    let app = test::init_service(
        App::new()
            .app_data(service(source.clone(), generator))
            .configure(amy_epw::web::configure),
    )
    .await;

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/countries").to_request(),
    )
    .await;
    assert_eq!(body["data"], serde_json::json!(["Germany", "Netherlands"]));

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/cities?country=Germany")
            .to_request(),
    )
    .await;
    assert_eq!(
        body["data"],
        serde_json::json!(["Berlin-Tempelhof", "Hamburg-Fuhlsbuettel"])
    );

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/station?country=Germany&city=Berlin-Tempelhof")
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["wmoId"], 10384);
    assert_eq!(body["data"]["heightMeters"], 48.0);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/cities?country=Atlantis")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/catalog/refresh")
            .to_request(),
    )
    .await;
    assert_eq!(body["data"]["stations"], 3);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/health").to_request(),
    )
    .await;
    assert_eq!(body["data"]["catalog_loaded"], true);
}
