//! flotilla-api: REST API for Flotilla.
//!
//! Maps HTTP requests onto the scalers and the rescheduler. Alerting
//! systems call the scale endpoints; deployment tooling calls the
//! reschedule endpoints after resizing a node group.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/services/{id}/scale` | Scale a service's replicas |
//! | POST | `/api/v1/nodes/{group}/scale` | Scale the manager or worker node group |
//! | POST | `/api/v1/services/{id}/reschedule` | Reschedule one labeled service |
//! | POST | `/api/v1/reschedule` | Reschedule every labeled service |
//! | POST | `/api/v1/reschedule/wait` | Wait for a node count, then reschedule |
//! | GET | `/api/v1/reschedule/wait` | Whether a wait is in progress |
//! | GET | `/healthz` | Liveness |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use flotilla_autoscale::{NodeScaler, ServiceScaler};
use flotilla_reschedule::Rescheduler;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub services: Arc<ServiceScaler>,
    pub nodes: Arc<NodeScaler>,
    pub rescheduler: Arc<Rescheduler>,
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/services/{id}/scale", post(handlers::scale_service))
        .route("/nodes/{group}/scale", post(handlers::scale_nodes))
        .route("/services/{id}/reschedule", post(handlers::reschedule_service))
        .route("/reschedule", post(handlers::reschedule_all))
        .route(
            "/reschedule/wait",
            post(handlers::wait_for_nodes).get(handlers::wait_status),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/healthz", get(handlers::healthz))
}
