//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};

use crate::{
    state::AppState,
    tasks::{CancelOutcome, StartOutcome},
    ui::validate_start,
};
use super::responses::{ApiResponse, HealthResponse, StartRequest, StatusResponse};

type ApiError = (StatusCode, Json<ApiResponse>);

fn api_error(status: StatusCode, message: String) -> ApiError {
    (status, Json(ApiResponse::error(message)))
}

/// Handle POST /timer/start - Validate and start a countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let adapter_state = state.adapter.state().await.map_err(|e| {
        error!("Failed to query adapter: {}", e);
        api_error(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
    })?;
    if !adapter_state.present {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Bluetooth not supported".to_string(),
        ));
    }

    let minutes = validate_start(&request.minutes.as_text(), adapter_state.enabled).map_err(|e| {
        warn!("Rejected start request: {}", e);
        api_error(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    match state.timer.start(minutes).await {
        Ok(StartOutcome::Started(session)) => {
            info!("Start endpoint called - timer started for {} minutes", minutes);
            state.record_action("start");
            Ok(Json(ApiResponse::started(session)))
        }
        Ok(StartOutcome::AlreadyRunning(session)) => {
            info!("Start endpoint called - timer already running");
            Ok(Json(ApiResponse::already_running(session)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Handle POST /timer/cancel - Cancel the running countdown
pub async fn cancel_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, ApiError> {
    match state.timer.cancel().await {
        Ok(CancelOutcome::Cancelled) => {
            info!("Cancel endpoint called - timer cancelled");
            state.record_action("cancel");
            Ok(Json(ApiResponse::cancelled()))
        }
        Ok(CancelOutcome::NotRunning) => Ok(Json(ApiResponse::not_running())),
        Err(e) => {
            error!("Failed to cancel timer: {}", e);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Handle GET /status - Return timer and adapter status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer.snapshot(),
        bluetooth: state.adapter_state(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream timer events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.timer.subscribe()).filter_map(|event| async move {
        // lagged receivers just skip what they missed
        let event = event.ok()?;
        Event::default()
            .event(event.name())
            .json_data(&event)
            .ok()
            .map(Ok)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
