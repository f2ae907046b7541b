//! REST API and SSE routes

use crate::state::{AppState, SinkConfig};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{delete, get, post},
    Json, Router,
};
use futures::stream::{Stream, StreamExt as FuturesStreamExt};
use machwatch_core::risk::Assessment;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::CorsLayer;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/machines", get(list_machines))
        .route("/api/machines/select", post(select_machine))
        .route("/api/status", get(current_status))
        .route("/api/history", get(history))
        .route("/api/monitor", get(monitor_state).post(monitor_control))
        .route("/api/stream", get(assessment_stream))
        .route("/api/sinks", get(list_sinks).post(create_sink))
        .route("/api/sinks/:id", delete(delete_sink))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Machine Endpoints ===

#[derive(Serialize)]
struct MachineInfo {
    machine_id: String,
    selected: bool,
    runtime_hours: f64,
    source: String,
}

async fn list_machines(State(state): State<AppState>) -> Json<Vec<MachineInfo>> {
    let machines = state.machines.read().await;
    let selected = state.selected.read().await;

    let info: Vec<MachineInfo> = machines
        .iter()
        .map(|slot| MachineInfo {
            machine_id: slot.machine_id.clone(),
            selected: selected.as_deref() == Some(slot.machine_id.as_str()),
            runtime_hours: slot.source.runtime_hours(),
            source: slot.source.name().to_string(),
        })
        .collect();

    Json(info)
}

#[derive(Deserialize)]
struct SelectMachineRequest {
    machine_id: String,
}

async fn select_machine(
    State(state): State<AppState>,
    Json(request): Json<SelectMachineRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let machine_id = request.machine_id.trim().to_lowercase();
    if !state.select_machine(&machine_id).await {
        return Err((
            StatusCode::NOT_FOUND,
            format!("Unknown machine: {}", request.machine_id),
        ));
    }

    Ok(Json(serde_json::json!({
        "status": "selected",
        "machine_id": machine_id
    })))
}

// === Assessment Endpoints ===

async fn current_status(
    State(state): State<AppState>,
) -> Result<Json<Assessment>, (StatusCode, String)> {
    let selected = state
        .selected_machine()
        .await
        .ok_or((StatusCode::NOT_FOUND, "No machine selected".to_string()))?;

    let machines = state.machines.read().await;
    machines
        .iter()
        .find(|m| m.machine_id == selected)
        .and_then(|m| m.latest.clone())
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("No assessment yet for {}", selected),
        ))
}

#[derive(Deserialize)]
struct HistoryQuery {
    machine: Option<String>,
}

async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<Assessment>>, (StatusCode, String)> {
    let machine_id = match query.machine {
        Some(m) => m.to_lowercase(),
        None => state
            .selected_machine()
            .await
            .ok_or((StatusCode::NOT_FOUND, "No machine selected".to_string()))?,
    };

    let machines = state.machines.read().await;
    let slot = machines
        .iter()
        .find(|m| m.machine_id == machine_id)
        .ok_or((
            StatusCode::NOT_FOUND,
            format!("Unknown machine: {}", machine_id),
        ))?;

    Ok(Json(slot.history.iter().cloned().collect()))
}

// === Monitor Control Endpoints ===

async fn monitor_state(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "monitoring": state.is_monitoring().await,
        "selected": state.selected_machine().await,
    }))
}

#[derive(Deserialize)]
struct MonitorControlRequest {
    action: String,
}

async fn monitor_control(
    State(state): State<AppState>,
    Json(request): Json<MonitorControlRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    match request.action.as_str() {
        "start" => {
            state.set_monitoring(true).await;
            Ok(Json(serde_json::json!({"status": "monitoring"})))
        }
        "stop" => {
            state.set_monitoring(false).await;
            Ok(Json(serde_json::json!({"status": "stopped"})))
        }
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("Unknown action: {}", request.action),
        )),
    }
}

// === Assessment Stream Endpoint ===

async fn assessment_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(assessment) => match serde_json::to_string(&assessment) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::error!("Failed to serialize assessment: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Broadcast stream error: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

// === Sink Management Endpoints ===

async fn list_sinks(State(state): State<AppState>) -> Json<Vec<SinkConfig>> {
    let sinks = state.sinks.read().await;
    Json(sinks.clone())
}

async fn create_sink(
    State(state): State<AppState>,
    Json(mut config): Json<SinkConfig>,
) -> Result<(StatusCode, Json<SinkConfig>), (StatusCode, String)> {
    let mut sinks = state.sinks.write().await;
    let taken = |id: &str| sinks.iter().any(|s| s.id == id);

    if config.id.is_empty() {
        // Skip past ids still held by sinks created before a delete
        let mut n = sinks.len() + 1;
        while taken(&format!("sink-{}", n)) {
            n += 1;
        }
        config.id = format!("sink-{}", n);
    } else if taken(&config.id) {
        return Err((
            StatusCode::CONFLICT,
            format!("Sink id already in use: {}", config.id),
        ));
    }

    sinks.push(config.clone());

    Ok((StatusCode::CREATED, Json(config)))
}

async fn delete_sink(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let mut sinks = state.sinks.write().await;

    if let Some(pos) = sinks.iter().position(|s| s.id == id) {
        sinks.remove(pos);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
