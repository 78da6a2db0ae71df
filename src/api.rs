// Thin web layer over the planner: routing, CORS, and the mapping from the
// error taxonomy onto HTTP statuses.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::error;

use crate::config::Config;
use crate::error::PlanError;
use crate::models::PlanRequest;
use crate::orchestrator::Planner;

impl PlanError {
    fn status(&self) -> StatusCode {
        match self {
            PlanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PlanError::Unconfigured
            | PlanError::AllProvidersFailed(_)
            | PlanError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        // Internal detail stays in the logs; clients get the generic text
        // from the error's Display impl.
        if let PlanError::Internal(ref detail) = self {
            error!(error = %detail, "unexpected failure in planning pipeline");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

async fn plan_handler(
    State(planner): State<Arc<Planner>>,
    Json(request): Json<PlanRequest>,
) -> Result<impl IntoResponse, PlanError> {
    let response = planner.plan(request).await?;
    Ok(Json(response))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// Build the application router. CORS origins come from configuration; an
/// unparsable origin list falls back to allowing any origin rather than
/// refusing to serve.
pub fn router(planner: Arc<Planner>, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(allow_origin);

    Router::new()
        .route("/plan", post(plan_handler))
        .route("/health", get(health_handler))
        .with_state(planner)
        .layer(cors)
}
