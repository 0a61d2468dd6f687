//! HTTP server for the gradebook formatter.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                                 |
//! |--------|-------------------|---------------------------------------------|
//! | GET    | `/health`         | Health check                                |
//! | POST   | `/api/transform`  | Upload gradebook, download formatted sheet  |
//! | POST   | `/api/preview`    | Upload gradebook, get the table as JSON     |
//! | GET    | `/api/logs`       | SSE stream for real-time logs               |
//!
//! Upload fields: `file`, `teacher`, `subject`, `grade`, `term`,
//! `language` (`en` | `es`), `format` (`xlsx` | `csv`).

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{download_name, error_response, PreviewResponse, UploadForm};
use crate::config::TransformConfig;
use crate::error::ServerError;
use crate::transform::pipeline::{process_bytes, transform_bytes};

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

type ApiError = (StatusCode, Json<Value>);

/// Build the router. Split from [`start_server`] so it can be served on any
/// listener.
pub fn router(config: TransformConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/transform", post(transform_upload))
        .route("/api/preview", post(preview_upload))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(Arc::new(config))
}

/// Start the HTTP server
pub async fn start_server(port: u16, config: TransformConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(config);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Gradebook server running on http://localhost:{}", port);
    println!("   POST /api/transform - Upload gradebook, get formatted sheet");
    println!("   POST /api/preview   - Upload gradebook, get JSON preview");
    println!("   GET  /api/logs      - SSE log stream");
    println!("   GET  /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "gradebook",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "transform": "POST /api/transform",
            "preview": "POST /api/preview",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers just skip the missed entries.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint returning the formatted file as an attachment
async fn transform_upload(
    State(config): State<Arc<TransformConfig>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(multipart).await.map_err(reject)?;
    let file_name = form.file_name.clone();
    let (bytes, request) = form.into_request().map_err(reject)?;

    println!(
        "\nNew upload: {} ({} bytes, {})",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len(),
        request.language
    );

    let result = tokio::task::spawn_blocking(move || process_bytes(&bytes, &request, &config))
        .await
        .map_err(|e| reject(ServerError::Internal(e.to_string())))?
        .map_err(|e| reject(ServerError::Pipeline(e)))?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        download_name(file_name.as_deref(), result.format)
    );
    Ok((
        [
            (header::CONTENT_TYPE, result.format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.bytes,
    )
        .into_response())
}

/// Upload endpoint returning the transformed table as JSON
async fn preview_upload(
    State(config): State<Arc<TransformConfig>>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, ApiError> {
    let form = read_form(multipart).await.map_err(reject)?;
    let (bytes, request) = form.into_request().map_err(reject)?;

    let language = request.language;
    let (gradebook, csv_info) =
        tokio::task::spawn_blocking(move || transform_bytes(&bytes, language, &config))
            .await
            .map_err(|e| reject(ServerError::Internal(e.to_string())))?
            .map_err(|e| reject(ServerError::Pipeline(e)))?;

    Ok(Json(PreviewResponse::new(gradebook, csv_info)))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ServerError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            form.file_name = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            form.file = Some(data.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

/// Map a failure to one status code and one JSON message.
fn reject(err: ServerError) -> ApiError {
    let status = match &err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log_error(err.to_string());
    (status, Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvError, PipelineError};

    #[test]
    fn test_reject_status_codes() {
        let (status, body) = reject(ServerError::BadRequest("No file provided".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["error"], "Invalid request: No file provided");

        let (status, _) = reject(ServerError::Pipeline(PipelineError::Csv(CsvError::EmptyFile)));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let export = crate::error::ExportError::TooManyColumns(20_000);
        let (status, _) = reject(ServerError::Pipeline(export.into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_router_builds() {
        let _ = router(TransformConfig::default());
    }
}
