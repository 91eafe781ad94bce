//! The one inbound HTTP operation plus health, and the error → status
//! mapping at the service boundary.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use uuid::Uuid;

use kartochki_core::{
    ConceptBatch, KartochkiError, extract_concepts, generate_document_summary, partition,
    split_transcript, total_billable_units,
};

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/health", get(health))
        .route("/analyze_video", post(analyze_video))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    Summary,
    #[default]
    KeyConcepts,
}

#[derive(Deserialize)]
pub struct AnalyzeVideoRequest {
    pub youtube_link: String,
    #[serde(default)]
    pub mode: AnalysisMode,
    pub group_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeVideoResponse {
    Summary { summary: String },
    KeyConcepts { key_concepts: ConceptBatch },
}

pub async fn analyze_video(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeVideoRequest>,
) -> Result<Json<AnalyzeVideoResponse>, ApiError> {
    let analysis_id = Uuid::new_v4();
    info!(%analysis_id, url = %request.youtube_link, mode = ?request.mode, "analyzing video");

    let transcript = state.source.fetch(&request.youtube_link).await?;
    info!(
        %analysis_id,
        title = %transcript.title,
        author = %transcript.author,
        duration_seconds = transcript.duration_seconds,
        segments = transcript.segments.len(),
        "transcript fetched"
    );

    let chunks = split_transcript(&transcript, &state.chunker);
    if let Some(units) = total_billable_units(&chunks, state.estimator.as_ref()).await {
        info!(%analysis_id, chunks = chunks.len(), billable_units = units, "cost estimate");
    }

    let response = match request.mode {
        AnalysisMode::Summary => {
            let summary = generate_document_summary(&chunks, state.summarizer.as_ref()).await?;
            AnalyzeVideoResponse::Summary { summary }
        }
        AnalysisMode::KeyConcepts => {
            let group_count = request.group_count.unwrap_or(state.default_group_count);
            let groups = partition(chunks, group_count)?;
            let key_concepts = extract_concepts(&groups, state.extractor.as_ref()).await?;
            AnalyzeVideoResponse::KeyConcepts { key_concepts }
        }
    };

    info!(%analysis_id, "analysis complete");
    Ok(Json(response))
}

/// Boundary wrapper turning core errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub KartochkiError);

impl From<KartochkiError> for ApiError {
    fn from(err: KartochkiError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            KartochkiError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            KartochkiError::SourceUnavailable { .. }
            | KartochkiError::ExtractionParse { .. }
            | KartochkiError::ModelResponse { .. }
            | KartochkiError::ApiError(_) => StatusCode::BAD_GATEWAY,
            KartochkiError::MissingApiKey { .. }
            | KartochkiError::IoError(_)
            | KartochkiError::JsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(%status, error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
