use std::sync::Arc;

use smokesignal_core::config::AppConfig;
use smokesignal_core::negotiation::{NegotiationEngine, WorkflowProfile};
use smokesignal_discord::events::{default_dispatcher, EventDispatcher};
use smokesignal_discord::verify::RequestAuthenticator;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub authenticator: Arc<RequestAuthenticator>,
    pub dispatcher: Arc<EventDispatcher>,
}

/// Wires the authenticator and dispatcher from an already loaded config. A missing public key
/// is not fatal here; every interaction is refused with a 500 until it is configured.
pub fn bootstrap_with_config(config: AppConfig) -> Application {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let authenticator = RequestAuthenticator::new(config.discord.public_key.as_deref());
    if !authenticator.is_configured() {
        warn!(
            event_name = "system.bootstrap.public_key_missing",
            correlation_id = "bootstrap",
            "discord public key is not configured; interactions will be refused"
        );
    }

    let profile = WorkflowProfile::from(&config.workflow);
    info!(
        event_name = "system.bootstrap.workflow_selected",
        correlation_id = "bootstrap",
        presentation = ?profile.presentation,
        time_request = ?profile.time_request,
        acknowledge_note = profile.acknowledge_note,
        "workflow profile selected"
    );

    Application {
        config,
        authenticator: Arc::new(authenticator),
        dispatcher: Arc::new(default_dispatcher(NegotiationEngine::new(profile))),
    }
}
