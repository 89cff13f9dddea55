use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::AppState;
use crate::errors::AppError;
use crate::models::{Dataset, DatasetListItem};

/// Name recorded when the multipart part carries no filename
const DEFAULT_UPLOAD_NAME: &str = "upload.csv";

fn multipart_error(state: &AppState, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge {
            limit: state.config.web.max_upload_bytes,
        }
    } else {
        AppError::validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Unknown and non-numeric ids both resolve to 404
fn parse_dataset_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found("Dataset", raw))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn upload_dataset(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Dataset>), AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Upload without multipart body: {}", rejection);
        AppError::validation("No file uploaded")
    })?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&state, e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&state, e))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or_else(|| AppError::validation("No file uploaded"))?;
    info!("Received upload '{}' ({} bytes)", file_name, data.len());

    let dataset = state.service.upload(&file_name, &data).await?;
    Ok((StatusCode::CREATED, Json(dataset)))
}

pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<DatasetListItem>>, AppError> {
    Ok(Json(state.service.list_datasets().await?))
}

pub async fn get_dataset(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Dataset>, AppError> {
    let dataset_id = parse_dataset_id(&id)?;
    state
        .service
        .get_dataset(dataset_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Dataset", id))
}

pub async fn get_dataset_report(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let dataset_id = parse_dataset_id(&id)?;
    let bytes = state.service.get_report(dataset_id).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            state.service.report_content_type().to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename=\"{}\"",
                state.service.report_filename(dataset_id)
            ),
        ),
    ];
    Ok((StatusCode::OK, headers, bytes).into_response())
}
