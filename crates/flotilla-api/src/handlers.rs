//! REST API handlers.
//!
//! Each handler calls one core operation and returns a JSON envelope.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::{error, info, warn};

use flotilla_autoscale::ScaleError;
use flotilla_core::{NodeGroup, ScaleDirection};
use flotilla_reschedule::{RescheduleError, WaitChannels};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn scale_error_status(e: &ScaleError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else if e.is_invalid_target() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

fn reschedule_error_status(e: &RescheduleError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else if e.is_invalid_target() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Marker supplied by the caller, or the current Unix time.
fn marker_or_now(marker: Option<String>) -> String {
    marker.filter(|m| !m.is_empty()).unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    })
}

// ── Scaling ────────────────────────────────────────────────────

/// Service scale request body.
#[derive(serde::Deserialize)]
pub struct ScaleServiceRequest {
    pub direction: ScaleDirection,
    /// Explicit step; 0 uses the service's labels or the defaults.
    #[serde(default)]
    pub delta: u64,
}

/// POST /api/v1/services/:id/scale
pub async fn scale_service(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(req): Json<ScaleServiceRequest>,
) -> impl IntoResponse {
    match state.services.scale(&id, req.delta, req.direction).await {
        Ok(outcome) => ApiResponse::ok(outcome).into_response(),
        Err(e) => {
            warn!(service = %id, error = %e, "service scale failed");
            error_response(&e.to_string(), scale_error_status(&e)).into_response()
        }
    }
}

/// Node scale request body.
#[derive(serde::Deserialize)]
pub struct ScaleNodesRequest {
    pub direction: ScaleDirection,
    #[serde(default)]
    pub delta: u64,
    /// Service whose labels override the node bounds.
    #[serde(default)]
    pub service_id: Option<String>,
}

/// POST /api/v1/nodes/:group/scale
pub async fn scale_nodes(
    State(state): State<ApiState>,
    Path(group): Path<String>,
    Json(req): Json<ScaleNodesRequest>,
) -> impl IntoResponse {
    let group: NodeGroup = match group.parse() {
        Ok(g) => g,
        Err(e) => {
            return error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response();
        }
    };

    match state
        .nodes
        .scale(req.delta, req.direction, group, req.service_id.as_deref())
        .await
    {
        Ok(outcome) => ApiResponse::ok(serde_json::json!({
            "message": outcome.message(),
            "group": outcome.group,
            "backend": outcome.backend,
            "before": outcome.before,
            "after": outcome.after,
            "min": outcome.min,
            "max": outcome.max,
        }))
        .into_response(),
        Err(e) => {
            warn!(%group, error = %e, "node scale failed");
            error_response(&e.to_string(), scale_error_status(&e)).into_response()
        }
    }
}

// ── Rescheduling ───────────────────────────────────────────────

/// Reschedule request body. The body itself may be omitted.
#[derive(serde::Deserialize, Default)]
pub struct MarkerRequest {
    #[serde(default)]
    pub marker: Option<String>,
}

/// POST /api/v1/services/:id/reschedule
pub async fn reschedule_service(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    body: Option<Json<MarkerRequest>>,
) -> impl IntoResponse {
    let marker = marker_or_now(body.and_then(|Json(req)| req.marker));
    match state.rescheduler.reschedule_one(&id, &marker).await {
        Ok(()) => ApiResponse::ok(serde_json::json!({
            "service": id,
            "marker": marker,
        }))
        .into_response(),
        Err(e) => {
            warn!(service = %id, error = %e, "reschedule failed");
            error_response(&e.to_string(), reschedule_error_status(&e)).into_response()
        }
    }
}

/// POST /api/v1/reschedule
pub async fn reschedule_all(
    State(state): State<ApiState>,
    body: Option<Json<MarkerRequest>>,
) -> impl IntoResponse {
    let marker = marker_or_now(body.and_then(|Json(req)| req.marker));
    match state.rescheduler.reschedule_all(&marker).await {
        Ok(summary) => ApiResponse::ok(serde_json::json!({
            "message": summary.message(),
            "rescheduled": summary.rescheduled,
            "marker": marker,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "reschedule all failed");
            error_response(&e.to_string(), reschedule_error_status(&e)).into_response()
        }
    }
}

/// Wait request body.
#[derive(serde::Deserialize)]
pub struct WaitRequest {
    pub group: NodeGroup,
    pub target: u64,
    #[serde(default)]
    pub marker: Option<String>,
}

/// POST /api/v1/reschedule/wait
///
/// Starts the wait and returns 202; the outcome is logged when it arrives.
pub async fn wait_for_nodes(
    State(state): State<ApiState>,
    Json(req): Json<WaitRequest>,
) -> impl IntoResponse {
    let marker = marker_or_now(req.marker);
    let channels = state
        .rescheduler
        .wait_for_node_count(req.group, req.target, &marker);
    tokio::spawn(report_wait(channels));

    (
        StatusCode::ACCEPTED,
        ApiResponse::ok(serde_json::json!({
            "group": req.group,
            "target": req.target,
            "marker": marker,
            "status": "waiting",
        })),
    )
        .into_response()
}

/// GET /api/v1/reschedule/wait
pub async fn wait_status(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(serde_json::json!({ "waiting": state.rescheduler.is_waiting() }))
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    ApiResponse::ok("ok")
}

/// Drain a wait's channels into the log.
async fn report_wait(mut channels: WaitChannels) {
    if let Some(status) = channels.status.recv().await {
        info!(%status, "node wait finished");
    }
    if let Some(Err(e)) = channels.errors.recv().await {
        error!(error = %e, "node wait failed");
    }
}
