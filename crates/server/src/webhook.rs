use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use smokesignal_core::errors::InterfaceError;
use smokesignal_discord::events::{EventContext, EventDispatcher};
use smokesignal_discord::interactions::InteractionHeader;
use smokesignal_discord::verify::{RequestAuthenticator, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use tracing::{error, info, warn};
use uuid::Uuid;

pub const LIVENESS_TEXT: &str = "The SmokeBot is alive! But you must talk to it via Discord.";

#[derive(Clone)]
pub struct WebhookState {
    authenticator: Arc<RequestAuthenticator>,
    dispatcher: Arc<EventDispatcher>,
}

impl WebhookState {
    pub fn new(authenticator: Arc<RequestAuthenticator>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self { authenticator, dispatcher }
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new().route("/", get(liveness).post(interactions)).with_state(state)
}

pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Boundary rendering of an [`InterfaceError`]: status plus plain-text body.
pub struct Rejection(InterfaceError);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.0.user_message().to_owned()).into_response()
    }
}

/// Signature is checked over the raw bytes before the body is parsed at all.
pub async fn interactions(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, Rejection> {
    let signature = header_value(&headers, SIGNATURE_HEADER);
    let timestamp = header_value(&headers, TIMESTAMP_HEADER);

    if let Err(failure) = state.authenticator.authenticate(&body, signature, timestamp) {
        let correlation_id = Uuid::new_v4().to_string();
        if failure.status_code() == 500 {
            error!(
                event_name = "ingress.auth.misconfigured",
                correlation_id = %correlation_id,
                reason = %failure,
                "refusing interaction"
            );
        } else {
            warn!(
                event_name = "ingress.auth.rejected",
                correlation_id = %correlation_id,
                reason = %failure,
                timestamp = timestamp.unwrap_or("none"),
                body_len = body.len(),
                "refusing interaction"
            );
        }
        return Err(Rejection(InterfaceError::from(failure).with_correlation_id(correlation_id)));
    }

    let header = InteractionHeader::from_slice(&body).map_err(|unrecognized| {
        let correlation_id = Uuid::new_v4().to_string();
        warn!(
            event_name = "ingress.interaction.unparsable",
            correlation_id = %correlation_id,
            reason = %unrecognized,
            "interaction body has no readable type"
        );
        Rejection(InterfaceError::from(unrecognized).with_correlation_id(correlation_id))
    })?;

    let ctx = EventContext {
        correlation_id: header.correlation_id().unwrap_or_else(|| Uuid::new_v4().to_string()),
    };
    info!(
        event_name = "ingress.auth.admitted",
        correlation_id = %ctx.correlation_id,
        interaction_type = header.kind,
        "interaction admitted"
    );

    let outcome = match header.event(&body) {
        Ok(event) => state.dispatcher.dispatch(&event, &ctx).await,
        Err(unrecognized) => Err(unrecognized),
    };

    match outcome {
        Ok(response) => Ok(Json(response).into_response()),
        Err(unrecognized) => {
            warn!(
                event_name = "interaction.unrecognized",
                correlation_id = %ctx.correlation_id,
                reason = %unrecognized,
                "rejecting unrecognized interaction"
            );
            let error = InterfaceError::from(unrecognized);
            Err(Rejection(error.with_correlation_id(ctx.correlation_id)))
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
