use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use chemviz::{
    config::Config,
    database::Database,
    ingestor::CsvParser,
    report::PdfReportGenerator,
    repositories::DatasetRepository,
    services::DatasetService,
    web::{AppState, WebServer},
};

const BOUNDARY: &str = "chemviz-test-boundary";

const SAMPLE_CSV: &str = "\
Name,Type,Flowrate,Pressure,Temperature
Pump-1,Pump,120.5,4.2,65.0
Pump-2,Pump,98.0,3.8,70.5
";

async fn test_app_with(config: Config) -> Router {
    let database = Database::new(&config.database).await.unwrap();
    database.migrate().await.unwrap();

    let service = DatasetService::new(
        CsvParser::new(config.ingestion.max_rows),
        Arc::new(DatasetRepository::new(
            database,
            config.storage.retention(),
        )),
        Arc::new(PdfReportGenerator::new()),
    );

    WebServer::router(AppState { service, config })
}

async fn test_app() -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    test_app_with(config).await
}

fn multipart_body(field: &str, filename: &str, contents: &str) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        filename = filename,
        contents = contents
    )
}

// Helper function to send requests to the app
async fn send_request(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, body_bytes.to_vec(), content_type)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send_request(app, request).await;
    let json = if body.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body).unwrap_or(json!({}))
    };
    (status, json)
}

async fn upload(app: &Router, field: &str, filename: &str, contents: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, filename, contents)))
        .unwrap();
    let (status, body, _) = send_request(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(json!({})))
}

fn assert_close(actual: &Value, expected: f64) {
    let actual = actual.as_f64().unwrap();
    assert!(
        (actual - expected).abs() <= 1e-9 * expected.abs(),
        "{} != {}",
        actual,
        expected
    );
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app().await;

    let (status, response) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert!(response.get("timestamp").is_some());
}

#[tokio::test]
async fn test_upload_returns_created_dataset() {
    let app = test_app().await;

    let (status, dataset) = upload(&app, "file", "plant-a.csv", SAMPLE_CSV).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dataset["name"], "plant-a.csv");
    assert_eq!(dataset["row_count"], 2);
    assert_eq!(dataset["summary"]["total_count"], 2);
    assert_eq!(dataset["summary"]["type_distribution"], json!({"Pump": 2}));
    assert_close(&dataset["summary"]["avg_flowrate"], 109.25);
    assert_close(&dataset["summary"]["avg_pressure"], 4.0);
    assert_close(&dataset["summary"]["avg_temperature"], 67.75);
    assert_eq!(dataset["equipment"][0]["equipment_name"], "Pump-1");
    assert_eq!(dataset["equipment"][1]["equipment_name"], "Pump-2");
    assert!(dataset["id"].is_i64());
    assert!(dataset["upload_time"].is_string());
}

#[tokio::test]
async fn test_header_only_upload_is_rejected() {
    let app = test_app().await;

    let (status, response) = upload(
        &app,
        "file",
        "empty.csv",
        "Equipment Name,Type,Flowrate,Pressure,Temperature\n",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "CSV file contains no data rows");
}

#[tokio::test]
async fn test_invalid_row_creates_no_dataset() {
    let app = test_app().await;
    let csv = "Equipment Name,Type,Flowrate,Pressure,Temperature\nPump-1,Pump,abc,4.2,65.0\n";

    let (status, response) = upload(&app, "file", "bad.csv", csv).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = response["error"].as_str().unwrap();
    assert!(message.contains("row 1"), "{}", message);
    assert!(message.contains("flowrate"), "{}", message);

    let (status, listed) = get_json(&app, "/api/datasets/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = test_app().await;

    let (status, response) = upload(&app, "attachment", "plant.csv", SAMPLE_CSV).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "No file uploaded");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/upload/")
        .body(Body::empty())
        .unwrap();
    let (status, body, _) = send_request(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["error"], "No file uploaded");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.web.max_upload_bytes = 256;
    let app = test_app_with(config).await;

    let mut csv = String::from("Equipment Name,Type,Flowrate,Pressure,Temperature\n");
    for i in 0..50 {
        csv.push_str(&format!("Pump-{},Pump,120.5,4.2,65.0\n", i));
    }

    let (status, _) = upload(&app, "file", "big.csv", &csv).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let app = test_app().await;

    let (_, first) = upload(&app, "file", "first.csv", SAMPLE_CSV).await;
    let (_, second) = upload(&app, "file", "second.csv", SAMPLE_CSV).await;

    let (status, listed) = get_json(&app, "/api/datasets").await;

    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second["id"]);
    assert_eq!(listed[1]["id"], first["id"]);
    assert_eq!(listed[0]["name"], "second.csv");
    assert_eq!(listed[0]["row_count"], 2);
    assert_eq!(listed[0]["summary"], second["summary"]);
    assert_close(&listed[1]["summary"]["avg_flowrate"], 109.25);
    assert!(listed[0].get("equipment").is_none());
}

#[tokio::test]
async fn test_detail_matches_upload_response() {
    let app = test_app().await;
    let (_, uploaded) = upload(&app, "file", "plant-a.csv", SAMPLE_CSV).await;

    let id = uploaded["id"].as_i64().unwrap();
    for uri in [format!("/api/datasets/{}/", id), format!("/api/datasets/{}", id)] {
        let (status, fetched) = get_json(&app, &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, uploaded);
    }
}

#[tokio::test]
async fn test_unknown_dataset_is_not_found() {
    let app = test_app().await;

    let (status, response) = get_json(&app, "/api/datasets/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "Dataset with id '999' not found");

    let (status, _) = get_json(&app, "/api/datasets/not-a-number/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(&app, "/api/datasets/999/pdf/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pdf_report_download() {
    let app = test_app().await;
    let (_, uploaded) = upload(&app, "file", "plant-a.csv", SAMPLE_CSV).await;
    let id = uploaded["id"].as_i64().unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/api/datasets/{}/pdf/", id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("inline; filename=\"dataset_{}_report.pdf\"", id).as_str()
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_history_keeps_most_recent_datasets() {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.storage.history_limit = 2;
    let app = test_app_with(config).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let (status, dataset) = upload(&app, "file", &format!("plant-{}.csv", i), SAMPLE_CSV).await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(dataset["id"].as_i64().unwrap());
    }

    let (_, listed) = get_json(&app, "/api/datasets/").await;
    let listed_ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed_ids, vec![ids[2], ids[1]]);

    let (status, _) = get_json(&app, &format!("/api/datasets/{}/", ids[0])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zero_history_limit_keeps_every_dataset() {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.storage.history_limit = 0;
    let app = test_app_with(config).await;

    for i in 0..7 {
        let (status, _) = upload(&app, "file", &format!("plant-{}.csv", i), SAMPLE_CSV).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = get_json(&app, "/api/datasets/").await;
    assert_eq!(listed.as_array().unwrap().len(), 7);
}
