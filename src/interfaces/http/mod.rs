use crate::application::use_cases::{
    combine_map_points, render_view, IngestionUseCase, SessionStore, ViewParams,
};
use crate::domain::dataset::{DashboardView, DecimalHint, IngestConfig, RawDocument};
use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use actix_cors::Cors;
use actix_web::{
    dev::Server, get, http::StatusCode, patch, post, web, App, HttpResponse, HttpServer, Responder,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::error;
use uuid::Uuid;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    /// Defaults for every upload; query parameters override per request
    pub ingest_defaults: IngestConfig,
    pub sessions: SessionStore,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl HttpState {
    pub fn new(ingest_defaults: IngestConfig, logs: Arc<Mutex<Vec<LogEntry>>>) -> Self {
        Self {
            ingest_defaults,
            sessions: SessionStore::new(),
            logs,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: String,
    #[serde(default)]
    pub decimal_separator: Option<String>,
    #[serde(default)]
    pub strict_row_length: Option<bool>,
    /// Encoding label, e.g. `windows-1252`
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Deserialize)]
pub struct CellEdit {
    pub column: String,
    pub row: usize,
    /// `null` or an empty string clears the cell
    #[serde(default)]
    pub value: Option<String>,
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AppError::EmptyDataset | AppError::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) | AppError::ColumnNotFound(_) => StatusCode::NOT_FOUND,
        AppError::Config(_) | AppError::IoError(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Log the failure and turn it into a JSON error body
fn error_response(logs: &Mutex<Vec<LogEntry>>, source: &str, err: &AppError) -> HttpResponse {
    let status = status_for(err);
    if status.is_server_error() {
        error!(source, error = %err, "Request failed");
    }
    add_log(logs, "ERROR", source, &err.to_string());

    HttpResponse::build(status).json(serde_json::json!({
        "error": err.kind(),
        "message": err.to_string(),
    }))
}

#[post("/sessions")]
async fn create_session(data: web::Data<HttpState>) -> impl Responder {
    match data.sessions.create_session() {
        Ok(session_id) => {
            add_log(
                &data.logs,
                "INFO",
                "Session",
                &format!("Session {} created", session_id),
            );
            HttpResponse::Created().json(SessionCreated { session_id })
        }
        Err(e) => error_response(&data.logs, "Session", &e),
    }
}

#[post("/sessions/{session_id}/files")]
async fn upload_file(
    data: web::Data<HttpState>,
    path: web::Path<Uuid>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> impl Responder {
    let session_id = path.into_inner();
    let query = query.into_inner();

    // Fail fast before doing any parsing work
    if let Err(e) = data.sessions.list(session_id) {
        return error_response(&data.logs, "Ingestion", &e);
    }

    let mut config = data.ingest_defaults.clone();
    if let Some(hint) = &query.decimal_separator {
        match hint.parse::<DecimalHint>() {
            Ok(hint) => config = config.with_decimal_separator(hint),
            Err(e) => return error_response(&data.logs, "Ingestion", &e),
        }
    }
    if let Some(strict) = query.strict_row_length {
        config = config.with_strict_row_length(strict);
    }

    let mut document = RawDocument::new(query.filename.clone(), body.to_vec());
    if let Some(label) = query.encoding {
        document = document.with_encoding(label);
    }

    add_log(
        &data.logs,
        "INFO",
        "Ingestion",
        &format!("Ingesting {} ({} bytes)", query.filename, body.len()),
    );

    let result = IngestionUseCase::new(config)
        .ingest_blocking(document)
        .await
        .and_then(|report| data.sessions.insert(session_id, report));

    match result {
        Ok(report) => {
            add_log(
                &data.logs,
                "INFO",
                "Ingestion",
                &format!(
                    "{}: {} rows, {} columns, {} row-length issues ({} ms)",
                    report.filename,
                    report.table.row_count(),
                    report.table.columns().len(),
                    report.diagnostics.len(),
                    report.processing_time_ms
                ),
            );
            HttpResponse::Ok().json(&*report)
        }
        Err(e) => error_response(&data.logs, "Ingestion", &e),
    }
}

#[get("/sessions/{session_id}/files")]
async fn list_files(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    match data.sessions.list(path.into_inner()) {
        Ok(files) => HttpResponse::Ok().json(files),
        Err(e) => error_response(&data.logs, "Session", &e),
    }
}

#[get("/sessions/{session_id}/files/{filename}/views/{view}")]
async fn file_view(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, String, String)>,
    query: web::Query<ViewParams>,
) -> impl Responder {
    let (session_id, filename, view) = path.into_inner();

    let result = view.parse::<DashboardView>().and_then(|view| {
        let report = data.sessions.get(session_id, &filename)?;
        let payload = render_view(&report, view, &query)?;
        Ok(HttpResponse::Ok().json(payload))
    });

    match result {
        Ok(response) => response,
        Err(e) => error_response(&data.logs, "Dashboard", &e),
    }
}

/// All datasets of a session on a single map
#[get("/sessions/{session_id}/map")]
async fn session_map(data: web::Data<HttpState>, path: web::Path<Uuid>) -> impl Responder {
    let result = data
        .sessions
        .reports(path.into_inner())
        .and_then(|reports| combine_map_points(&reports));

    match result {
        Ok(map) => HttpResponse::Ok().json(map),
        Err(e) => error_response(&data.logs, "Dashboard", &e),
    }
}

#[patch("/sessions/{session_id}/files/{filename}/cells")]
async fn edit_cell(
    data: web::Data<HttpState>,
    path: web::Path<(Uuid, String)>,
    req: web::Json<CellEdit>,
) -> impl Responder {
    let (session_id, filename) = path.into_inner();

    match data.sessions.edit_cell(
        session_id,
        &filename,
        &req.column,
        req.row,
        req.value.as_deref(),
    ) {
        Ok(report) => {
            add_log(
                &data.logs,
                "INFO",
                "Dashboard",
                &format!("{}: edited {}[{}]", filename, req.column, req.row),
            );
            HttpResponse::Ok().json(&*report)
        }
        Err(e) => error_response(&data.logs, "Dashboard", &e),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    match data.logs.lock() {
        Ok(logs) => HttpResponse::Ok().json(&*logs),
        Err(_) => HttpResponse::InternalServerError().finish(),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    if let Ok(mut logs) = logs.lock() {
        logs.push(entry);
        if logs.len() > MAX_LOG_ENTRIES {
            logs.remove(0);
        }
    }
}

/// Register every route under `/api`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(create_session)
            .service(upload_file)
            .service(list_files)
            .service(file_view)
            .service(session_map)
            .service(edit_cell)
            .service(get_logs)
            .service(health),
    );
}

pub fn start_server(state: web::Data<HttpState>, config: &ServerConfig) -> std::io::Result<Server> {
    let upload_limit = config.max_upload_bytes;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(upload_limit))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
