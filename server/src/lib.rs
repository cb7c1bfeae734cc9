// PayGuard HTTP server
//
// Exposes the debt intake endpoint and serves generated audio files.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use payguard_core::audio::ElevenLabsBackend;
use payguard_core::followup::TracingSink;
use payguard_core::ledger::{CrossmintMinter, SolanaMemoRecorder};
use payguard_core::llm::MistralBackend;
use payguard_core::{
    DebtReportForm, FollowUpDispatcher, FollowUpOrchestrator, IntakeHandler, NoticeComposer,
    PayGuardConfig, SpeechBackend, SpeechRenderer, ValidationError,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeHandler>,
}

/// Wire production collaborators from configuration
pub fn build_intake(cfg: &PayGuardConfig) -> payguard_core::Result<IntakeHandler> {
    let composer = NoticeComposer::new(
        Arc::new(MistralBackend::new(&cfg.generation)?),
        cfg.generation.clone(),
    );
    let speech_backend = ElevenLabsBackend::new(&cfg.speech)?
        .map(|b| Arc::new(b) as Arc<dyn SpeechBackend>);
    let renderer = SpeechRenderer::new(cfg.speech.clone(), speech_backend);
    let dispatcher = FollowUpDispatcher::new(
        Arc::new(FollowUpOrchestrator::new(composer, renderer)),
        Arc::new(TracingSink),
    );

    Ok(IntakeHandler::new(
        Arc::new(SolanaMemoRecorder::new(cfg.ledger.clone())?),
        Arc::new(CrossmintMinter::new(cfg.mint.clone())?),
        dispatcher,
    ))
}

pub fn router(state: AppState, audio_dir: &Path) -> Router {
    Router::new()
        .route("/api/report-debt", post(report_debt_handler))
        .route("/health", get(health_handler))
        .nest_service("/static/audio", ServeDir::new(audio_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(cfg: PayGuardConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tokio::fs::create_dir_all(&cfg.speech.audio_dir).await?;
    let state = AppState {
        intake: Arc::new(build_intake(&cfg)?),
    };
    let app = router(state, &cfg.speech.audio_dir);

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(target: "server", url = %format!("http://{}", addr), "PayGuard server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!(target: "server", "Shutting down");
        })
        .await?;
    Ok(())
}

async fn health_handler() -> &'static str {
    "ok"
}

/// 400 on validation, 502 when the ledger record failed, 200 otherwise
async fn report_debt_handler(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(body) = body.map_err(|e| ServerError::InvalidBody(e.body_text()))?;
    // Only a JSON object names its fields; arrays would bind by position.
    if !body.is_object() {
        return Err(ServerError::InvalidBody("expected a JSON object".into()));
    }
    let form: DebtReportForm =
        serde_json::from_value(body).map_err(|e| ServerError::InvalidBody(e.to_string()))?;
    let resp = state.intake.handle(&form).await?;

    let status = if resp.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(resp)).into_response())
}
