use crate::config::ServerConfig;
use crate::constants;
use crate::error::{LeadError, Result};
use crate::pipeline::{LeadPipeline, RunPaths};
use axum::{
    body::Bytes,
    extract::Multipart,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use hyper::Server;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

const INVALID_UPLOAD: &str = "Please upload a valid CSV file";

/// Shared state for request handlers
pub struct AppState {
    pub pipeline: Arc<LeadPipeline>,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: Arc<LeadPipeline>, config: &ServerConfig) -> Self {
        Self {
            pipeline,
            upload_dir: PathBuf::from(&config.upload_dir),
            output_dir: PathBuf::from(&config.output_dir),
        }
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lead-router",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Pull the `file` field out of the form, rejecting anything not named `*.csv`.
async fn read_csv_upload(multipart: &mut Multipart) -> Result<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LeadError::Upload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.ends_with(".csv") {
            warn!(file_name = %file_name, "Rejected non-CSV upload");
            return Err(LeadError::Upload(INVALID_UPLOAD.to_string()));
        }
        return field
            .bytes()
            .await
            .map_err(|e| LeadError::Upload(e.to_string()));
    }
    Err(LeadError::Upload(INVALID_UPLOAD.to_string()))
}

/// Save the upload, run the pipeline on it and return the output artifact.
///
/// The per-request input, cleaned and output files are deleted before returning, whether the
/// run succeeded or not.
async fn run_upload(state: &AppState, bytes: Bytes) -> Result<Vec<u8>> {
    let run_id = format!(
        "{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        Uuid::new_v4().simple()
    );
    tokio::fs::create_dir_all(&state.upload_dir).await?;

    let paths = RunPaths {
        input: state
            .upload_dir
            .join(format!("uploaded_leads_{}.csv", run_id)),
        cleaned: state.upload_dir.join(format!("leads_clean_{}.csv", run_id)),
        output: state
            .output_dir
            .join(format!("output_enriched_leads_{}.json", run_id)),
    };

    let result = process_saved_upload(state, &paths, &run_id, bytes).await;
    remove_run_files(&paths).await;
    result
}

async fn process_saved_upload(
    state: &AppState,
    paths: &RunPaths,
    run_id: &str,
    bytes: Bytes,
) -> Result<Vec<u8>> {
    tokio::fs::write(&paths.input, &bytes).await?;

    let summary = state.pipeline.run(paths).await?;
    info!(
        run_id = %run_id,
        leads = summary.total_leads,
        fallbacks = summary.fallbacks,
        "Processed uploaded leads"
    );

    Ok(tokio::fs::read(&paths.output).await?)
}

async fn remove_run_files(paths: &RunPaths) {
    for path in [&paths.input, &paths.cleaned, &paths.output] {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove upload run file"),
        }
    }
}

async fn process_leads(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    let bytes = match read_csv_upload(&mut multipart).await {
        Ok(bytes) => bytes,
        Err(LeadError::Upload(message)) => {
            return error_response(StatusCode::BAD_REQUEST, &message)
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match run_upload(&state, bytes).await {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                constants::DEFAULT_OUTPUT_FILE
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Lead processing failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/process-leads", post(process_leads))
        .layer(Extension(state))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    state: Arc<AppState>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = create_server(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📤 Upload:       POST http://localhost:{port}/process-leads");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
