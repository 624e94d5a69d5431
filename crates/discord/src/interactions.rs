use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use smokesignal_core::errors::UnrecognizedEvent;
use smokesignal_core::negotiation::{Actor, UserId};

use crate::components::{ActionRow, Embed};

pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// The fields read before anything else. A ping is answered from `type` alone, so nothing else
/// in its body can make it fail.
#[derive(Clone, Debug, Deserialize)]
pub struct InteractionHeader {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub id: Option<Value>,
}

impl InteractionHeader {
    pub fn from_slice(body: &[u8]) -> Result<Self, UnrecognizedEvent> {
        serde_json::from_slice(body)
            .map_err(|error| UnrecognizedEvent::MalformedBody(error.to_string()))
    }

    pub fn correlation_id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) if !id.is_empty() => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Builds the event for `body`. Only non-ping bodies are parsed in full.
    pub fn event(&self, body: &[u8]) -> Result<InteractionEvent, UnrecognizedEvent> {
        if InteractionKind::from_code(self.kind) == Some(InteractionKind::Ping) {
            return Ok(InteractionEvent::Ping);
        }
        Interaction::from_slice(body)?.into_event()
    }
}

/// Inbound interaction body, as delivered by the platform.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub data: Option<InteractionData>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub components: Vec<SubmittedRow>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmittedRow {
    #[serde(default)]
    pub components: Vec<SubmittedField>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmittedField {
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Ping,
    Command,
    Component,
    ModalSubmit,
}

impl InteractionKind {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::Command),
            3 => Some(Self::Component),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Command => "command",
            Self::Component => "component",
            Self::ModalSubmit => "modal_submit",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    pub actor: Actor,
    /// Raw value of the optional `user` option.
    pub target: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentActivation {
    pub custom_id: String,
    pub actor: Actor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalSubmission {
    pub custom_id: String,
    pub actor: Actor,
    pub value: Option<String>,
}

/// Closed set of events the router understands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    Ping,
    Command(CommandInvocation),
    Component(ComponentActivation),
    ModalSubmit(ModalSubmission),
}

impl InteractionEvent {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Ping => InteractionKind::Ping,
            Self::Command(_) => InteractionKind::Command,
            Self::Component(_) => InteractionKind::Component,
            Self::ModalSubmit(_) => InteractionKind::ModalSubmit,
        }
    }

    pub fn actor(&self) -> Option<&Actor> {
        match self {
            Self::Ping => None,
            Self::Command(invocation) => Some(&invocation.actor),
            Self::Component(activation) => Some(&activation.actor),
            Self::ModalSubmit(submission) => Some(&submission.actor),
        }
    }
}

impl Interaction {
    pub fn from_slice(body: &[u8]) -> Result<Self, UnrecognizedEvent> {
        serde_json::from_slice(body)
            .map_err(|error| UnrecognizedEvent::MalformedBody(error.to_string()))
    }

    /// Guild interactions carry the user under `member`, direct messages under `user`.
    pub fn acting_user(&self) -> Option<&User> {
        self.member.as_ref().and_then(|member| member.user.as_ref()).or(self.user.as_ref())
    }

    pub fn into_event(self) -> Result<InteractionEvent, UnrecognizedEvent> {
        let kind = InteractionKind::from_code(self.kind)
            .ok_or(UnrecognizedEvent::UnsupportedType(self.kind))?;
        if kind == InteractionKind::Ping {
            return Ok(InteractionEvent::Ping);
        }

        let actor = self.actor()?;
        let data = self
            .data
            .ok_or_else(|| UnrecognizedEvent::MalformedBody("interaction has no data".to_owned()))?;

        match kind {
            InteractionKind::Ping => Ok(InteractionEvent::Ping),
            InteractionKind::Command => {
                let name = data.name.ok_or_else(|| {
                    UnrecognizedEvent::MalformedBody("command interaction has no name".to_owned())
                })?;
                let target = data
                    .options
                    .into_iter()
                    .find(|option| option.name == "user")
                    .and_then(|option| option.value)
                    .and_then(|value| match value {
                        Value::String(id) => Some(id),
                        Value::Number(id) => Some(id.to_string()),
                        _ => None,
                    });
                Ok(InteractionEvent::Command(CommandInvocation { name, actor, target }))
            }
            InteractionKind::Component => {
                let custom_id = data.custom_id.ok_or_else(|| {
                    UnrecognizedEvent::MalformedBody(
                        "component interaction has no custom_id".to_owned(),
                    )
                })?;
                Ok(InteractionEvent::Component(ComponentActivation { custom_id, actor }))
            }
            InteractionKind::ModalSubmit => {
                let custom_id = data.custom_id.ok_or_else(|| {
                    UnrecognizedEvent::MalformedBody("modal submission has no custom_id".to_owned())
                })?;
                let value = data
                    .components
                    .into_iter()
                    .flat_map(|row| row.components)
                    .find_map(|field| field.value);
                Ok(InteractionEvent::ModalSubmit(ModalSubmission { custom_id, actor, value }))
            }
        }
    }

    fn actor(&self) -> Result<Actor, UnrecognizedEvent> {
        let user = self.acting_user().ok_or(UnrecognizedEvent::MissingActor)?;
        let id = UserId::parse(&user.id).ok_or(UnrecognizedEvent::MissingActor)?;
        let display_name = if user.username.is_empty() {
            user.global_name.clone().unwrap_or_else(|| user.id.clone())
        } else {
            user.username.clone()
        };
        Ok(Actor::new(id, display_name))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    Pong,
    ChannelMessage,
    UpdateMessage,
    Modal,
}

impl ResponseType {
    pub fn code(self) -> u8 {
        match self {
            Self::Pong => 1,
            Self::ChannelMessage => 4,
            Self::UpdateMessage => 7,
            Self::Modal => 9,
        }
    }
}

impl Serialize for ResponseType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MessageData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    /// `Some(vec![])` clears the controls of an updated message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModalData {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Message(MessageData),
    Modal(ModalData),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: ResponseType::Pong, data: None }
    }

    pub fn new_message(data: MessageData) -> Self {
        Self { kind: ResponseType::ChannelMessage, data: Some(ResponseData::Message(data)) }
    }

    pub fn update_message(data: MessageData) -> Self {
        Self { kind: ResponseType::UpdateMessage, data: Some(ResponseData::Message(data)) }
    }

    /// A reply only the acting user can see. The shared message is left untouched.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::new_message(MessageData {
            content: Some(content.into()),
            flags: Some(EPHEMERAL_FLAG),
            ..MessageData::default()
        })
    }

    pub fn modal(data: ModalData) -> Self {
        Self { kind: ResponseType::Modal, data: Some(ResponseData::Modal(data)) }
    }

    pub fn message(&self) -> Option<&MessageData> {
        match &self.data {
            Some(ResponseData::Message(message)) => Some(message),
            _ => None,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.message()
            .and_then(|message| message.flags)
            .is_some_and(|flags| flags & EPHEMERAL_FLAG != 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smokesignal_core::errors::UnrecognizedEvent;

    use super::{Interaction, InteractionEvent, InteractionHeader, InteractionResponse};

    fn parse(value: serde_json::Value) -> Interaction {
        serde_json::from_value(value).expect("interaction should deserialize")
    }

    #[test]
    fn ping_needs_no_actor_or_data() {
        let event = parse(json!({"type": 1, "id": "9"})).into_event().expect("ping");
        assert_eq!(event, InteractionEvent::Ping);
    }

    #[test]
    fn ping_is_read_from_the_type_alone() {
        let body = br#"{"type":1,"id":5,"member":"nobody","data":[1,2]}"#;
        assert!(Interaction::from_slice(body).is_err());

        let header = InteractionHeader::from_slice(body).expect("header");
        assert_eq!(header.correlation_id().as_deref(), Some("5"));
        assert_eq!(header.event(body).expect("ping"), InteractionEvent::Ping);
    }

    #[test]
    fn non_ping_bodies_are_still_parsed_in_full() {
        let body = br#"{"type":3,"id":"11","member":"nobody","data":{"custom_id":"x"}}"#;
        let header = InteractionHeader::from_slice(body).expect("header");

        assert_eq!(header.correlation_id().as_deref(), Some("11"));
        assert!(matches!(header.event(body), Err(UnrecognizedEvent::MalformedBody(_))));
    }

    #[test]
    fn command_reads_member_user_and_user_option() {
        let event = parse(json!({
            "type": 2,
            "id": "42",
            "member": {"user": {"id": "100", "username": "alice"}},
            "data": {
                "name": "smoketime",
                "options": [{"name": "user", "type": 6, "value": "200"}]
            }
        }))
        .into_event()
        .expect("command");

        let InteractionEvent::Command(invocation) = event else {
            panic!("expected command event");
        };
        assert_eq!(invocation.name, "smoketime");
        assert_eq!(invocation.actor.id.as_str(), "100");
        assert_eq!(invocation.actor.display_name, "alice");
        assert_eq!(invocation.target.as_deref(), Some("200"));
    }

    #[test]
    fn direct_message_user_is_used_without_member() {
        let event = parse(json!({
            "type": 3,
            "user": {"id": "300", "username": "", "global_name": "Carol"},
            "data": {"custom_id": "smoke_v1_aqui_300", "component_type": 2}
        }))
        .into_event()
        .expect("component");

        let InteractionEvent::Component(activation) = event else {
            panic!("expected component event");
        };
        assert_eq!(activation.actor.display_name, "Carol");
    }

    #[test]
    fn modal_submission_collects_first_text_value() {
        let event = parse(json!({
            "type": 5,
            "member": {"user": {"id": "200", "username": "bob"}},
            "data": {
                "custom_id": "smoke_v1_amod_100_200",
                "components": [
                    {"type": 1, "components": [{"type": 4, "custom_id": "ack_message", "value": "See you there!"}]}
                ]
            }
        }))
        .into_event()
        .expect("modal");

        let InteractionEvent::ModalSubmit(submission) = event else {
            panic!("expected modal submission");
        };
        assert_eq!(submission.value.as_deref(), Some("See you there!"));
    }

    #[test]
    fn unsupported_type_and_missing_actor_are_unrecognized() {
        assert_eq!(
            parse(json!({"type": 4})).into_event(),
            Err(UnrecognizedEvent::UnsupportedType(4))
        );
        assert_eq!(
            parse(json!({"type": 3, "data": {"custom_id": "smoke_v1_aqui_1"}})).into_event(),
            Err(UnrecognizedEvent::MissingActor)
        );
    }

    #[test]
    fn malformed_body_is_reported() {
        assert!(matches!(
            Interaction::from_slice(b"{not json"),
            Err(UnrecognizedEvent::MalformedBody(_))
        ));
    }

    #[test]
    fn pong_and_ephemeral_wire_shapes() {
        assert_eq!(
            serde_json::to_value(InteractionResponse::pong()).expect("pong"),
            json!({"type": 1})
        );

        let advisory = InteractionResponse::ephemeral("❌ nope");
        assert!(advisory.is_ephemeral());
        assert_eq!(
            serde_json::to_value(&advisory).expect("advisory"),
            json!({"type": 4, "data": {"content": "❌ nope", "flags": 64}})
        );
    }
}
