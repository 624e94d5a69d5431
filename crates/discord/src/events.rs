use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use smokesignal_core::errors::{AuthorizationDenied, UnrecognizedEvent};
use smokesignal_core::negotiation::{decode, Actor, NegotiationEngine, Transition};
use tracing::{info, warn};

use crate::commands::parse_invocation;
use crate::interactions::{InteractionEvent, InteractionKind, InteractionResponse};
use crate::render::{denial_notice, render_prompt, render_state};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

#[async_trait]
pub trait EventHandler: Send + Sync {
    fn kind(&self) -> InteractionKind;
    async fn handle(
        &self,
        event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent>;
}

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<InteractionKind, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, handler: H)
    where
        H: EventHandler + 'static,
    {
        self.handlers.insert(handler.kind(), Arc::new(handler));
    }

    pub async fn dispatch(
        &self,
        event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent> {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            warn!(
                event_name = "interaction.dispatch.unhandled",
                correlation_id = %ctx.correlation_id,
                kind = kind.as_str(),
                "no handler registered for interaction kind"
            );
            return Err(UnrecognizedEvent::MalformedBody(format!(
                "no handler for {} interactions",
                kind.as_str()
            )));
        };

        info!(
            event_name = "interaction.dispatch.routed",
            correlation_id = %ctx.correlation_id,
            kind = kind.as_str(),
            actor_id = event.actor().map(|actor| actor.id.as_str()).unwrap_or("none"),
            "interaction routed"
        );
        handler.handle(event, ctx).await
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

pub fn default_dispatcher(engine: NegotiationEngine) -> EventDispatcher {
    let engine = Arc::new(engine);
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(PingHandler);
    dispatcher.register(CommandHandler::new(engine.clone()));
    dispatcher.register(ComponentHandler::new(engine.clone()));
    dispatcher.register(ModalSubmitHandler::new(engine));
    dispatcher
}

pub struct PingHandler;

#[async_trait]
impl EventHandler for PingHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Ping
    }

    async fn handle(
        &self,
        _event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent> {
        info!(
            event_name = "interaction.ping.pong",
            correlation_id = %ctx.correlation_id,
            "sending pong"
        );
        Ok(InteractionResponse::pong())
    }
}

pub struct CommandHandler {
    engine: Arc<NegotiationEngine>,
}

impl CommandHandler {
    pub fn new(engine: Arc<NegotiationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for CommandHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Command
    }

    async fn handle(
        &self,
        event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent> {
        let InteractionEvent::Command(invocation) = event else {
            return Err(UnrecognizedEvent::UnsupportedType(2));
        };

        let request = parse_invocation(invocation)?;
        let state = self.engine.start(&invocation.actor, request.target);

        info!(
            event_name = "negotiation.started",
            correlation_id = %ctx.correlation_id,
            command = request.command.name(),
            actor_id = invocation.actor.id.as_str(),
            step = state.step().as_str(),
            "negotiation requested"
        );

        Ok(InteractionResponse::new_message(render_state(
            &state,
            &invocation.actor,
            self.engine.profile(),
        )))
    }
}

pub struct ComponentHandler {
    engine: Arc<NegotiationEngine>,
}

impl ComponentHandler {
    pub fn new(engine: Arc<NegotiationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for ComponentHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::Component
    }

    async fn handle(
        &self,
        event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent> {
        let InteractionEvent::Component(activation) = event else {
            return Err(UnrecognizedEvent::UnsupportedType(3));
        };

        let control = decode(&activation.custom_id)?;
        if control.tag().is_modal() {
            return Err(UnrecognizedEvent::MalformedBody(format!(
                "modal token `{}` activated as a button",
                activation.custom_id
            )));
        }

        let outcome = self.engine.apply(&control, &activation.actor, None);
        Ok(respond(&self.engine, outcome, &activation.actor, ctx))
    }
}

pub struct ModalSubmitHandler {
    engine: Arc<NegotiationEngine>,
}

impl ModalSubmitHandler {
    pub fn new(engine: Arc<NegotiationEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl EventHandler for ModalSubmitHandler {
    fn kind(&self) -> InteractionKind {
        InteractionKind::ModalSubmit
    }

    async fn handle(
        &self,
        event: &InteractionEvent,
        ctx: &EventContext,
    ) -> Result<InteractionResponse, UnrecognizedEvent> {
        let InteractionEvent::ModalSubmit(submission) = event else {
            return Err(UnrecognizedEvent::UnsupportedType(5));
        };

        let control = decode(&submission.custom_id)?;
        if !control.tag().is_modal() {
            return Err(UnrecognizedEvent::MalformedBody(format!(
                "button token `{}` submitted as a modal",
                submission.custom_id
            )));
        }

        let outcome = self.engine.apply(&control, &submission.actor, submission.value.as_deref());
        Ok(respond(&self.engine, outcome, &submission.actor, ctx))
    }
}

fn respond(
    engine: &NegotiationEngine,
    outcome: Result<Transition, AuthorizationDenied>,
    actor: &Actor,
    ctx: &EventContext,
) -> InteractionResponse {
    match outcome {
        Ok(Transition::Update(state)) => {
            info!(
                event_name = "negotiation.transition.applied",
                correlation_id = %ctx.correlation_id,
                actor_id = actor.id.as_str(),
                step = state.step().as_str(),
                terminal = state.step().is_terminal(),
                "negotiation advanced"
            );
            InteractionResponse::update_message(render_state(&state, actor, engine.profile()))
        }
        Ok(Transition::Prompt(prompt)) => {
            info!(
                event_name = "negotiation.prompt.opened",
                correlation_id = %ctx.correlation_id,
                actor_id = actor.id.as_str(),
                "opening modal prompt"
            );
            InteractionResponse::modal(render_prompt(&prompt))
        }
        Err(denied) => {
            info!(
                event_name = "negotiation.authorization.denied",
                correlation_id = %ctx.correlation_id,
                actor_id = actor.id.as_str(),
                action = ?denied.action,
                "actor is not allowed to perform this transition"
            );
            InteractionResponse::ephemeral(denial_notice(&denied))
        }
    }
}

#[cfg(test)]
mod tests {
    use smokesignal_core::config::TimeRequestMode;
    use smokesignal_core::errors::UnrecognizedEvent;
    use smokesignal_core::negotiation::{Actor, NegotiationEngine, UserId, WorkflowProfile};

    use super::{default_dispatcher, EventContext, EventDispatcher, PingHandler};
    use crate::components::Component;
    use crate::interactions::{
        CommandInvocation, ComponentActivation, InteractionEvent, InteractionResponse,
        ModalSubmission, ResponseData, ResponseType,
    };

    fn actor(id: &str, name: &str) -> Actor {
        Actor::new(UserId::new(id), name)
    }

    fn custom_ids(response: &InteractionResponse) -> Vec<String> {
        response
            .message()
            .and_then(|message| message.components.as_ref())
            .into_iter()
            .flatten()
            .flat_map(|row| row.components.iter())
            .filter_map(|component| match component {
                Component::Button(button) => Some(button.custom_id.clone()),
                Component::TextInput(_) => None,
            })
            .collect()
    }

    fn click(custom_id: &str, who: Actor) -> InteractionEvent {
        InteractionEvent::Component(ComponentActivation {
            custom_id: custom_id.to_owned(),
            actor: who,
        })
    }

    async fn send(event: InteractionEvent) -> InteractionResponse {
        default_dispatcher(NegotiationEngine::default())
            .dispatch(&event, &EventContext::default())
            .await
            .expect("dispatch")
    }

    #[test]
    fn default_dispatcher_registers_handlers() {
        assert_eq!(default_dispatcher(NegotiationEngine::default()).handler_count(), 4);
    }

    #[tokio::test]
    async fn ping_is_answered_with_pong() {
        let response = send(InteractionEvent::Ping).await;
        assert_eq!(response, InteractionResponse::pong());
    }

    #[tokio::test]
    async fn unregistered_kind_is_unrecognized() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(PingHandler);

        let result = dispatcher
            .dispatch(&click("smoke_v1_aqui_1", actor("1", "a")), &EventContext::default())
            .await;
        assert!(matches!(result, Err(UnrecognizedEvent::MalformedBody(_))));
    }

    #[tokio::test]
    async fn smoketime_without_target_posts_three_open_controls() {
        let response = send(InteractionEvent::Command(CommandInvocation {
            name: "smoketime".to_owned(),
            actor: actor("100", "alice"),
            target: None,
        }))
        .await;

        assert_eq!(response.kind, ResponseType::ChannelMessage);
        assert_eq!(
            custom_ids(&response),
            ["smoke_v1_acc_100_open", "smoke_v1_deny_100_open", "smoke_v1_time_100_open"]
        );
    }

    #[tokio::test]
    async fn accept_on_open_request_updates_with_otw_for_pair() {
        let response = send(click("smoke_v1_acc_100_open", actor("200", "bob"))).await;

        assert_eq!(response.kind, ResponseType::UpdateMessage);
        assert_eq!(custom_ids(&response), ["smoke_v1_otw_100_200"]);
    }

    #[tokio::test]
    async fn third_party_gets_private_advisory() {
        let response = send(click("smoke_v1_ack_100_200", actor("300", "carol"))).await;

        assert!(response.is_ephemeral());
        assert_eq!(response.kind, ResponseType::ChannelMessage);
        let content = response.message().and_then(|message| message.content.clone());
        assert_eq!(content.as_deref(), Some("❌ Only <@200> can acknowledge!"));
        assert!(custom_ids(&response).is_empty());
    }

    #[tokio::test]
    async fn deny_by_non_target_names_the_target() {
        let response = send(click("smoke_v1_deny_100_200", actor("300", "carol"))).await;

        assert!(response.is_ephemeral());
        let content = response.message().and_then(|message| message.content.clone());
        assert_eq!(content.as_deref(), Some("❌ Only <@200> can deny this request!"));
    }

    #[tokio::test]
    async fn acknowledge_then_aqui_reaches_terminal_message() {
        let acknowledged = send(click("smoke_v1_ack_100_200", actor("200", "bob"))).await;
        assert_eq!(custom_ids(&acknowledged), ["smoke_v1_aqui_100"]);

        let arrived = send(click("smoke_v1_aqui_100", actor("100", "alice"))).await;
        assert_eq!(arrived.kind, ResponseType::UpdateMessage);
        assert!(custom_ids(&arrived).is_empty());
        assert_eq!(
            arrived.message().and_then(|message| message.components.clone()),
            Some(Vec::new())
        );
    }

    #[tokio::test]
    async fn request_time_opens_modal_and_submission_proposes_duration() {
        let opened = send(click("smoke_v1_time_100_open", actor("200", "bob"))).await;
        assert_eq!(opened.kind, ResponseType::Modal);
        let Some(ResponseData::Modal(modal)) = &opened.data else {
            panic!("expected modal data");
        };
        assert_eq!(modal.custom_id, "smoke_v1_tmod_100_open_200");

        let proposed = send(InteractionEvent::ModalSubmit(ModalSubmission {
            custom_id: modal.custom_id.clone(),
            actor: actor("200", "bob"),
            value: Some("20 minutes".to_owned()),
        }))
        .await;

        assert_eq!(proposed.kind, ResponseType::UpdateMessage);
        assert_eq!(
            custom_ids(&proposed),
            ["smoke_v1_acct_100_open_200_20%20minutes", "smoke_v1_deny_100_100"]
        );
        let content = proposed.message().and_then(|message| message.content.clone());
        assert_eq!(content.as_deref(), Some("⏰ **bob needs 20 minutes.** \nHold tight!"));
    }

    #[tokio::test]
    async fn fixed_time_mode_proposes_without_modal() {
        let engine = NegotiationEngine::new(WorkflowProfile {
            time_request: TimeRequestMode::Fixed,
            ..WorkflowProfile::default()
        });
        let response = default_dispatcher(engine)
            .dispatch(
                &click("smoke_v1_time_100_open", actor("200", "bob")),
                &EventContext::default(),
            )
            .await
            .expect("dispatch");

        assert_eq!(response.kind, ResponseType::UpdateMessage);
        let content = response.message().and_then(|message| message.content.clone());
        assert_eq!(content.as_deref(), Some("⏰ **bob needs 15 minutes.** \nHold tight!"));
    }

    #[tokio::test]
    async fn foreign_or_mismatched_tokens_are_unrecognized() {
        let dispatcher = default_dispatcher(NegotiationEngine::default());
        let ctx = EventContext::default();

        let foreign = dispatcher.dispatch(&click("quote.refresh.v1", actor("1", "a")), &ctx).await;
        assert!(matches!(foreign, Err(UnrecognizedEvent::UnknownToken(_))));

        let modal_as_button =
            dispatcher.dispatch(&click("smoke_v1_amod_100_200", actor("200", "bob")), &ctx).await;
        assert!(matches!(modal_as_button, Err(UnrecognizedEvent::MalformedBody(_))));
    }
}
