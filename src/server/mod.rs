use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::event::S3Notification;
use crate::pipeline::LogIngestPipeline;
use crate::stats::IngestReport;

#[derive(Serialize)]
pub struct StatusResponse {
    pub processed: u64,
    pub failed: u64,
    pub lines: u64,
    pub rows_per_batch: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Default)]
struct Counters {
    processed: AtomicU64,
    failed: AtomicU64,
    lines: AtomicU64,
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<LogIngestPipeline>,
    counters: Arc<Counters>,
}

/// HTTP 宿主：接收 S3 事件通知并同步跑一遍处理流程
pub struct IngestServer {
    pub pipeline: Arc<LogIngestPipeline>,
}

impl IngestServer {
    pub fn new(pipeline: Arc<LogIngestPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn router(&self) -> Router {
        let state = AppState {
            pipeline: self.pipeline.clone(),
            counters: Arc::new(Counters::default()),
        };
        Router::new()
            .route("/notifications", post(notification_handler))
            .route("/status", get(status_handler))
            .with_state(state)
    }

    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
        tracing::info!("Notification server listening on port {}", port);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn reject(status: StatusCode, error: impl ToString) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

async fn notification_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestReport>, HandlerError> {
    // 通知本身不合法：4xx，不计入失败
    let object = S3Notification::from_json(&body)
        .and_then(|n| n.first_object())
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e))?;

    match state.pipeline.process_object(&object).await {
        Ok(report) => {
            state.counters.processed.fetch_add(1, Ordering::Relaxed);
            state
                .counters
                .lines
                .fetch_add(report.lines as u64, Ordering::Relaxed);
            Ok(Json(report))
        }
        Err(e) => {
            state.counters.failed.fetch_add(1, Ordering::Relaxed);
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, e))
        }
    }
}

async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        processed: state.counters.processed.load(Ordering::Relaxed),
        failed: state.counters.failed.load(Ordering::Relaxed),
        lines: state.counters.lines.load(Ordering::Relaxed),
        rows_per_batch: state.pipeline.rows_per_batch(),
    })
}
