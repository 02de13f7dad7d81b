use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pit_core::api::{ErrorBody, MessageResponse, StateResponse, StatusResponse};
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::PitService;
use crate::uploads::UploadError;

#[derive(Clone)]
pub struct AppState {
    svc: Arc<PitService>,
    frontend: Arc<PathBuf>,
}

pub fn router(svc: Arc<PitService>, frontend: PathBuf, max_upload_bytes: usize) -> Router {
    let state = AppState {
        svc,
        frontend: Arc::new(frontend),
    };
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/state", get(get_state))
        .route("/upload", post(upload))
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/reset", post(reset))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index(State(st): State<AppState>) -> Response {
    match tokio::fs::read_to_string(st.frontend.as_path()).await {
        Ok(html) => Html(html).into_response(),
        Err(_) => Json(MessageResponse::backend_running()).into_response(),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_state(State(st): State<AppState>) -> Json<StateResponse> {
    Json(st.svc.state().await)
}

async fn upload(
    State(st): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let bytes = field.bytes().await?;
        files.push((name, bytes));
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("no files in upload".into()));
    }

    st.svc.upload(files).await?;
    Ok(Json(StatusResponse::uploaded()))
}

async fn start(State(st): State<AppState>) -> Json<StatusResponse> {
    st.svc.start().await;
    Json(StatusResponse::started())
}

async fn stop(State(st): State<AppState>) -> Json<StatusResponse> {
    st.svc.stop().await;
    Json(StatusResponse::stopped())
}

async fn reset(State(st): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    st.svc.reset().await?;
    Ok(Json(StatusResponse::reset()))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::BadRequest(e.body_text())
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidName(_) => Self::BadRequest(e.to_string()),
            UploadError::Io { .. } => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(error = %self, "request failed");
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (code, body).into_response()
    }
}
