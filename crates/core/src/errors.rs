use thiserror::Error;

use crate::negotiation::{GuardedAction, TokenError, UserId};

/// Rejection of an inbound request before any of its body is interpreted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("signature or timestamp header is missing")]
    MissingHeaders,
    #[error("application public key is not configured")]
    MissingPublicKey,
    #[error("application public key is malformed")]
    MalformedPublicKey,
    #[error("signature header is not a hex encoded ed25519 signature")]
    MalformedSignature,
    #[error("signature does not match timestamp and body")]
    BadSignature,
}

impl AuthFailure {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingPublicKey | Self::MalformedPublicKey => 500,
            Self::MissingHeaders | Self::MalformedSignature | Self::BadSignature => 401,
        }
    }

    pub fn response_text(&self) -> &'static str {
        match self {
            Self::MissingHeaders => "Missing headers",
            Self::MissingPublicKey | Self::MalformedPublicKey => "Missing Public Key",
            Self::MalformedSignature | Self::BadSignature => "Bad request signature",
        }
    }
}

/// Right step, wrong actor. Rendered as a private advisory, never as an error status.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{} may only be performed by {}", action.describe(), allowed_list(allowed))]
pub struct AuthorizationDenied {
    pub action: GuardedAction,
    pub allowed: Vec<UserId>,
}

fn allowed_list(allowed: &[UserId]) -> String {
    allowed.iter().map(UserId::as_str).collect::<Vec<_>>().join(" or ")
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UnrecognizedEvent {
    #[error("unsupported interaction type {0}")]
    UnsupportedType(u8),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error(transparent)]
    UnknownToken(#[from] TokenError),
    #[error("malformed interaction body: {0}")]
    MalformedBody(String),
    #[error("interaction does not identify an acting user")]
    MissingActor,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("unauthorized: {message}")]
    Unauthorized { message: String, correlation_id: String },
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized { .. } => 401,
            Self::BadRequest { .. } => 400,
            Self::Internal { .. } => 500,
        }
    }

    /// Text safe to return to the caller as the response body.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::BadRequest { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Unauthorized { correlation_id, .. }
            | Self::BadRequest { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        let correlation_id = correlation_id.into();
        match &mut self {
            Self::Unauthorized { correlation_id: id, .. }
            | Self::BadRequest { correlation_id: id, .. }
            | Self::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        self
    }
}

impl From<AuthFailure> for InterfaceError {
    fn from(value: AuthFailure) -> Self {
        let message = value.response_text().to_owned();
        let correlation_id = "unassigned".to_owned();
        if value.status_code() == 500 {
            Self::Internal { message, correlation_id }
        } else {
            Self::Unauthorized { message, correlation_id }
        }
    }
}

impl From<UnrecognizedEvent> for InterfaceError {
    fn from(_value: UnrecognizedEvent) -> Self {
        Self::BadRequest {
            message: "Unknown Type".to_owned(),
            correlation_id: "unassigned".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{AuthFailure, AuthorizationDenied, InterfaceError, UnrecognizedEvent};
    use crate::negotiation::{GuardedAction, UserId};

    #[test]
    fn missing_key_maps_to_internal_error() {
        let interface = InterfaceError::from(AuthFailure::MissingPublicKey);
        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.status_code(), 500);
    }

    #[test]
    fn signature_failures_map_to_unauthorized() {
        use AuthFailure::{BadSignature, MalformedSignature, MissingHeaders};

        for failure in [MissingHeaders, MalformedSignature, BadSignature] {
            let interface = InterfaceError::from(failure).with_correlation_id("req-1");
            assert_eq!(interface.status_code(), 401);
            assert_eq!(interface.correlation_id(), "req-1");
        }
    }

    #[test]
    fn unrecognized_event_maps_to_bad_request() {
        let interface = InterfaceError::from(UnrecognizedEvent::UnsupportedType(42));
        assert_eq!(interface.status_code(), 400);
        assert_eq!(interface.user_message(), "Unknown Type");
    }

    #[test]
    fn authorization_denied_names_allowed_identities() {
        let denied = AuthorizationDenied {
            action: GuardedAction::OnTheWay,
            allowed: vec![UserId::new("111"), UserId::new("222")],
        };
        assert_eq!(denied.to_string(), "heading out may only be performed by 111 or 222");
    }
}
