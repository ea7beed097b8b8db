#![cfg(not(tarpaulin_include))]

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::downloader;
use crate::graph::{self, GraphOptions, GraphType};
use crate::loader;
use crate::timesheet::{Timesheet, total_hours};

/// Shown whenever an API call arrives before any workbook has been uploaded
const UPLOAD_PROMPT: &str = "Please upload an Excel file to view the dashboard";

/// Shown when a sheet yields no usable month values after cleaning
const NO_MONTHS_MESSAGE: &str = "No valid month data found in the selected worksheet";

/// The workbook most recently uploaded to this server process
pub struct UploadedWorkbook {
    pub filename: String,
    pub data: Vec<u8>,
    pub projects: Vec<String>,
}

/// Server state: at most one uploaded workbook, shared across handlers
///
/// Everything else (sheets, months, filtered slices) is re-derived from the
/// stored bytes on every request, so a new upload fully replaces the old
/// dashboard contents.
#[derive(Default)]
pub struct AppState {
    workbook: Mutex<Option<UploadedWorkbook>>,
}

#[derive(Deserialize)]
struct ProjectQuery {
    project: String,
}

#[derive(Deserialize)]
struct SliceQuery {
    project: String,
    month: String,
}

#[derive(Deserialize)]
struct ChartQuery {
    project: String,
    month: String,
    kind: Option<String>,
}

#[derive(Deserialize)]
struct DownloadQuery {
    project: String,
    month: String,
    format: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

impl StatusResponse {
    fn error(message: impl Into<String>) -> Json<Self> {
        Json(StatusResponse {
            status: "error".to_string(),
            message: Some(message.into()),
        })
    }
}

/// Build the dashboard router over the given state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/upload", post(upload_workbook))
        .route("/api/projects", get(list_projects))
        .route("/api/months", get(list_months))
        .route("/api/timesheet", get(get_timesheet))
        .route("/api/chart", get(get_chart))
        .route("/api/download", get(download_slice))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
}

/// Start the dashboard server on the given address
pub async fn run(addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::default());
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("./static/dashboard.html"))
}

/// Receive a workbook upload and remember it for later selections
///
/// Expects a multipart form with the file in a `timesheet` field. The upload
/// is validated by listing its sheets; an unreadable file is reported back
/// as an error message and the previous workbook (if any) is kept.
async fn upload_workbook(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut file_data = Vec::new();
    let mut filename = String::new();

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        if field.name().unwrap_or("unknown") == "timesheet" {
            filename = field.file_name().unwrap_or("timesheet.xlsx").to_string();
            file_data = field.bytes().await.unwrap_or_default().to_vec();
        }
    }

    if file_data.is_empty() {
        return StatusResponse::error("No file data received").into_response();
    }

    match loader::sheet_names(&file_data) {
        Ok(projects) if !projects.is_empty() => {
            info!(
                "Stored workbook '{}' with {} project sheet(s)",
                filename,
                projects.len()
            );

            let mut workbook = state.workbook.lock().unwrap();
            *workbook = Some(UploadedWorkbook {
                filename,
                data: file_data,
                projects: projects.clone(),
            });

            Json(serde_json::json!({
                "status": "ok",
                "projects": projects,
            }))
            .into_response()
        }
        Ok(_) => StatusResponse::error("Workbook contains no sheets").into_response(),
        Err(e) => {
            error!("Rejected upload '{}': {}", filename, e);
            StatusResponse::error(e.to_string()).into_response()
        }
    }
}

async fn list_projects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let workbook = state.workbook.lock().unwrap();

    match workbook.as_ref() {
        Some(uploaded) => Json(serde_json::json!({
            "status": "ok",
            "filename": uploaded.filename,
            "projects": uploaded.projects,
        }))
        .into_response(),
        None => StatusResponse::error(UPLOAD_PROMPT).into_response(),
    }
}

async fn list_months(
    Query(params): Query<ProjectQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sheet = match cleaned_sheet(&state, &params.project) {
        Ok(sheet) => sheet,
        Err(message) => return StatusResponse::error(message).into_response(),
    };

    let months = sheet.months();
    if months.is_empty() {
        return StatusResponse::error(NO_MONTHS_MESSAGE).into_response();
    }

    Json(serde_json::json!({
        "status": "ok",
        "project": sheet.project,
        "months": months,
    }))
    .into_response()
}

async fn get_timesheet(
    Query(params): Query<SliceQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sheet = match cleaned_sheet(&state, &params.project) {
        Ok(sheet) => sheet,
        Err(message) => return StatusResponse::error(message).into_response(),
    };

    let entries = sheet.for_month(&params.month);
    let total = total_hours(&entries);

    Json(serde_json::json!({
        "status": "ok",
        "project": params.project,
        "month": params.month,
        "entries": entries,
        "total": total,
    }))
    .into_response()
}

async fn get_chart(
    Query(params): Query<ChartQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sheet = match cleaned_sheet(&state, &params.project) {
        Ok(sheet) => sheet,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    let graph_type = match params.kind.as_deref() {
        None => GraphType::Bar,
        Some(kind) => match GraphType::from_name(kind) {
            Some(graph_type) => graph_type,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("Unknown chart type: {}", kind),
                );
            }
        },
    };

    let entries = sheet.for_month(&params.month);
    let options = GraphOptions {
        title: format!("Hours for {} - {}", params.project, params.month),
        graph_type,
        ..GraphOptions::default()
    };

    match graph::create_graph(&entries, &options) {
        Ok(png_data) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(png_data))
            .unwrap(),
        Err(e) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    }
}

/// Serve the filtered slice as a downloadable file
///
/// The `format` query parameter picks CSV (default) or XLSX; either way the
/// attachment is named `{project}_{month}_timesheet.{ext}`.
async fn download_slice(
    Query(params): Query<DownloadQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sheet = match cleaned_sheet(&state, &params.project) {
        Ok(sheet) => sheet,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    let entries = sheet.for_month(&params.month);

    match params.format.as_deref().unwrap_or("csv") {
        "csv" => {
            let csv = downloader::to_csv(&entries);
            let filename = downloader::export_filename(&params.project, &params.month, "csv");
            attachment_response(csv.into_bytes(), "text/csv", &filename)
        }
        "xlsx" => match downloader::to_xlsx(&entries) {
            Ok(data) => {
                let filename =
                    downloader::export_filename(&params.project, &params.month, "xlsx");
                attachment_response(
                    data,
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                    &filename,
                )
            }
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        },
        other => error_response(
            StatusCode::BAD_REQUEST,
            &format!("Unknown download format: {}", other),
        ),
    }
}

// Load the selected project sheet from the stored workbook bytes and clean
// it. The bytes are cloned out so the state lock is not held while parsing.
fn cleaned_sheet(state: &AppState, project: &str) -> Result<Timesheet, String> {
    let data = {
        let workbook = state.workbook.lock().unwrap();
        match workbook.as_ref() {
            Some(uploaded) => uploaded.data.clone(),
            None => return Err(UPLOAD_PROMPT.to_string()),
        }
    };

    let mut sheet = loader::load_sheet(&data, project).map_err(|e| e.to_string())?;
    sheet.clean();
    Ok(sheet)
}

fn attachment_response(data: Vec<u8>, content_type: &str, filename: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(data))
        .unwrap()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "status": "error",
                "message": message,
            })
            .to_string(),
        ))
        .unwrap()
}
