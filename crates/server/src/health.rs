use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use smokesignal_discord::verify::RequestAuthenticator;

#[derive(Clone)]
pub struct HealthState {
    authenticator: Arc<RequestAuthenticator>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub public_key: HealthCheck,
    pub checked_at: String,
}

pub fn router(authenticator: Arc<RequestAuthenticator>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { authenticator })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let public_key = public_key_check(&state.authenticator);
    let ready = public_key.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "smokesignal-server accepting interactions".to_string(),
        },
        public_key,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn public_key_check(authenticator: &RequestAuthenticator) -> HealthCheck {
    if authenticator.is_configured() {
        HealthCheck { status: "ready", detail: "discord public key loaded".to_string() }
    } else {
        HealthCheck {
            status: "degraded",
            detail: "discord public key missing or malformed".to_string(),
        }
    }
}
