use crate::config::Config;
use crate::error::{PhotodeckError, Result};
use crate::scan::links::IMAGE_ROUTE;
use crate::scan::Library;
use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

/// HTTP front end of the media library
pub struct HttpServer {
    library: Arc<Library>,
    allowed_origins: Vec<String>,
    bind_addr: String,
}

impl HttpServer {
    /// Create a new HTTP server from configuration
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_library(
            Library::from_config(config)?,
            config.http_server.allowed_origins.clone(),
            config.bind_addr(),
        ))
    }

    pub fn with_library(library: Library, allowed_origins: Vec<String>, bind_addr: String) -> Self {
        Self {
            library: Arc::new(library),
            allowed_origins,
            bind_addr,
        }
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<()> {
        let app = self.create_router();

        log::info!("Starting Photodeck HTTP server on http://{}", self.bind_addr);
        log::info!("Media root: {}", self.library.media_root().display());
        log::info!("Metadata root: {}", self.library.metadata_root().display());

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| {
                let error_msg = if e.kind() == std::io::ErrorKind::AddrInUse {
                    format!(
                        "Address {} is already in use. Stop the other process or set \
                         http_server.port in config.toml (or PHOTODECK_PORT)",
                        self.bind_addr
                    )
                } else {
                    format!("Failed to bind to {}: {}", self.bind_addr, e)
                };
                PhotodeckError::Io(std::io::Error::new(e.kind(), error_msg))
            })?;

        axum::serve(listener, app)
            .await
            .map_err(|e| PhotodeckError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e)
            )))?;

        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        create_router(Arc::clone(&self.library), &self.allowed_origins)
    }
}

/// Build the router over `library`
pub fn create_router(library: Arc<Library>, allowed_origins: &[String]) -> Router {
    // No origins configured: allow any, the usual setup for a LAN photo browser
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/all-files", get(handle_all_files_root))
        .route("/all-files/", get(handle_all_files_root))
        .route("/all-files/*target", get(handle_all_files))
        .route("/single-scan", get(handle_single_scan_root))
        .route("/single-scan/", get(handle_single_scan_root))
        .route("/single-scan/*target", get(handle_single_scan))
        .route(&format!("/{}/*path", IMAGE_ROUTE), get(handle_image))
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(AppState { library })
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    library: Arc<Library>,
}

async fn handle_all_files_root(State(state): State<AppState>) -> Response {
    all_files(state, String::new()).await
}

async fn handle_all_files(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Response {
    all_files(state, target).await
}

/// Recursive listing joined with sidecar metadata
async fn all_files(state: AppState, target: String) -> Response {
    let library = Arc::clone(&state.library);
    let scan_target = target.clone();
    let result = tokio::task::spawn_blocking(move || library.list_all(&scan_target)).await;

    match result {
        Ok(Ok(records)) => (StatusCode::OK, Json(records)).into_response(),
        Ok(Err(e)) => {
            log::error!("Listing {:?} failed: {}", target, e);
            error_response(&e)
        }
        Err(e) => join_error_response(e),
    }
}

async fn handle_single_scan_root(State(state): State<AppState>) -> Response {
    single_scan(state, String::new()).await
}

async fn handle_single_scan(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Response {
    single_scan(state, target).await
}

/// Files and folders directly inside one directory
async fn single_scan(state: AppState, target: String) -> Response {
    let library = Arc::clone(&state.library);
    let scan_target = target.clone();
    let result = tokio::task::spawn_blocking(move || library.scan_single(&scan_target)).await;

    match result {
        Ok(Ok(listing)) => (StatusCode::OK, Json(listing)).into_response(),
        Ok(Err(e)) => {
            log::error!("Scanning {:?} failed: {}", target, e);
            error_response(&e)
        }
        Err(e) => join_error_response(e),
    }
}

/// Stream a media file; `ServeFile` answers `Range` requests and sets the
/// content type from the extension
async fn handle_image(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request,
) -> Response {
    let library = Arc::clone(&state.library);
    let target = path.clone();
    let file = match tokio::task::spawn_blocking(move || library.media_file(&target)).await {
        Ok(Ok(file)) => file,
        Ok(Err(e)) => {
            log::debug!("Image request {:?}: {}", path, e);
            return error_response(&e);
        }
        Err(e) => return join_error_response(e),
    };

    match ServeFile::new(&file).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    }
}

/// Handle health check endpoint
async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "photodeck",
            "version": env!("CARGO_PKG_VERSION")
        }))
    ).into_response()
}

fn status_for(err: &PhotodeckError) -> StatusCode {
    match err {
        PhotodeckError::FileNotFound(_) => StatusCode::NOT_FOUND,
        PhotodeckError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &PhotodeckError) -> Response {
    let message = match err {
        PhotodeckError::FileNotFound(_) => "File not found".to_string(),
        PhotodeckError::DirectoryUnreadable { .. } => "Unable to scan folder".to_string(),
        other => other.to_string(),
    };
    (
        status_for(err),
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn join_error_response(err: tokio::task::JoinError) -> Response {
    log::error!("Scan task failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Internal server error" })),
    )
        .into_response()
}
