use smokesignal_core::config::{Presentation, TimeRequestMode};
use smokesignal_core::errors::AuthorizationDenied;
use smokesignal_core::negotiation::{
    encode, Actor, Control, GuardedAction, NegotiationState, Prompt, Target, UserId,
    WorkflowProfile, MAX_DURATION_CHARS, MAX_NOTE_CHARS,
};

use crate::components::{button_rows, ActionRow, Button, ButtonStyle, Embed, TextInput};
use crate::interactions::{MessageData, ModalData};

pub const DURATION_INPUT_ID: &str = "duration";
pub const NOTE_INPUT_ID: &str = "ack_message";

/// Headline and body of a rendered step, before a presentation strategy lays it out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Card {
    pub icon: &'static str,
    pub title: String,
    pub aside: Option<String>,
    pub body: String,
    pub color: u32,
}

impl Card {
    fn new(icon: &'static str, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self { icon, title: title.into(), aside: None, body: body.into(), color: 0x5865F2 }
    }

    fn color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    fn aside(mut self, aside: Option<String>) -> Self {
        self.aside = aside;
        self
    }
}

pub fn mention(id: &UserId) -> String {
    format!("<@{id}>")
}

/// The shared message for `state`, with `actor` being whoever caused it.
pub fn card(state: &NegotiationState, actor: &Actor) -> Card {
    let who = &actor.display_name;
    match state {
        NegotiationState::Requested { target, .. } => {
            let title = match target {
                Target::Open => "Smoke Break Requested!".to_owned(),
                Target::User(id) => format!("Smoke Break Requested for {}!", mention(id)),
            };
            Card::new("🚬", title, "What is the verdict?").color(0xE67E22)
        }
        NegotiationState::TimeProposed { duration, .. } => {
            let title = match duration {
                Some(duration) => format!("{who} needs {duration}."),
                None => format!("{who} needs a little more time."),
            };
            Card::new("⏰", title, "Hold tight!").color(0xF1C40F)
        }
        NegotiationState::Accepted { duration, .. } => {
            let body = match duration {
                Some(duration) => {
                    format!("Let's roll in {duration}. Click below when you are heading out.")
                }
                None => "Let's roll. Click below when you are heading out.".to_owned(),
            };
            Card::new("✅", format!("Accepted by {who}!"), body).color(0x2ECC71)
        }
        NegotiationState::EnRoute { waiter, .. } => Card::new(
            "🏃",
            format!("{who} is On The Way!"),
            format!("{}, acknowledge below!", mention(waiter)),
        ),
        NegotiationState::Acknowledged { note, .. } => {
            Card::new("👍", format!("{who} acknowledged!"), "Click when you have arrived.")
                .aside(note.as_ref().map(|note| format!("_\"{note}\"_")))
        }
        NegotiationState::Arrived { .. } => {
            Card::new("📍", format!("{who} is Aqui!"), "Session active. ☁️").color(0x95A5A6)
        }
        NegotiationState::Denied { .. } => {
            Card::new("🚫", format!("Denied by {who}."), "Maybe later!").color(0xE74C3C)
        }
    }
}

/// Renders the shared message for `state`: the card laid out per the profile's presentation,
/// plus one button per emitted control. Terminal states carry an empty component list so an
/// updated message loses its buttons.
pub fn render_state(
    state: &NegotiationState,
    actor: &Actor,
    profile: &WorkflowProfile,
) -> MessageData {
    let card = card(state, actor);
    let buttons = state
        .controls(profile)
        .iter()
        .filter_map(|control| button_for(control, profile))
        .collect::<Vec<_>>();

    let mut message = present(&card, profile.presentation);
    message.components = Some(button_rows(buttons));
    message
}

pub fn present(card: &Card, presentation: Presentation) -> MessageData {
    match presentation {
        Presentation::Content => {
            let aside = card.aside.as_ref().map(|aside| format!(" {aside}")).unwrap_or_default();
            MessageData {
                content: Some(format!("{} **{}**{aside} \n{}", card.icon, card.title, card.body)),
                ..MessageData::default()
            }
        }
        Presentation::Embed => {
            let description = match &card.aside {
                Some(aside) => format!("{aside}\n{}", card.body),
                None => card.body.clone(),
            };
            MessageData {
                embeds: vec![Embed {
                    title: format!("{} {}", card.icon, card.title),
                    description,
                    color: card.color,
                }],
                ..MessageData::default()
            }
        }
    }
}

/// Button for a control. Modal controls never appear as buttons.
pub fn button_for(control: &Control, profile: &WorkflowProfile) -> Option<Button> {
    let (label, style) = match control {
        Control::Accept { .. } => ("Accept".to_owned(), ButtonStyle::Success),
        Control::Deny { .. } => ("Deny".to_owned(), ButtonStyle::Danger),
        Control::RequestTime { .. } => match profile.time_request {
            TimeRequestMode::Fixed => {
                (format!("{} Minutes", profile.fixed_minutes), ButtonStyle::Secondary)
            }
            TimeRequestMode::Prompt | TimeRequestMode::Off => {
                ("Need Time".to_owned(), ButtonStyle::Secondary)
            }
        },
        Control::AcceptTime { .. } => ("Accept Now".to_owned(), ButtonStyle::Success),
        Control::OnTheWay { .. } => ("OTW 🏃".to_owned(), ButtonStyle::Primary),
        Control::Acknowledge { .. } => ("Copy That! 👍".to_owned(), ButtonStyle::Primary),
        Control::Arrive { .. } => ("Aqui! 📍".to_owned(), ButtonStyle::Success),
        Control::TimeModal { .. } | Control::AcknowledgeModal { .. } => return None,
    };
    Some(Button::new(encode(control), label, style))
}

pub fn render_prompt(prompt: &Prompt) -> ModalData {
    let custom_id = encode(&prompt.control());
    match prompt {
        Prompt::Duration { .. } => ModalData {
            custom_id,
            title: "⏰ Need More Time".to_owned(),
            components: vec![ActionRow::text_input(
                TextInput::short(DURATION_INPUT_ID, "How long do you need?", MAX_DURATION_CHARS)
                    .placeholder("e.g., 10 minutes")
                    .required(true),
            )],
        },
        Prompt::AcknowledgeNote { .. } => ModalData {
            custom_id,
            title: "🏃 OTW Acknowledgement".to_owned(),
            components: vec![ActionRow::text_input(
                TextInput::short(NOTE_INPUT_ID, "Quick response (optional)", MAX_NOTE_CHARS)
                    .placeholder("e.g., \"On my way too!\" or \"See you there!\""),
            )],
        },
    }
}

/// Private advisory naming who may perform the refused action.
pub fn denial_notice(denied: &AuthorizationDenied) -> String {
    let who = if denied.allowed.is_empty() {
        "someone else".to_owned()
    } else {
        denied.allowed.iter().map(mention).collect::<Vec<_>>().join(" or ")
    };
    format!("❌ Only {who} can {}!", action_phrase(denied.action))
}

fn action_phrase(action: GuardedAction) -> &'static str {
    match action {
        GuardedAction::Accept => "accept this request",
        GuardedAction::Deny => "deny this request",
        GuardedAction::RequestTime => "ask for more time",
        GuardedAction::ProposeTime => "propose a time here",
        GuardedAction::AcceptTime => "accept the proposed time",
        GuardedAction::OnTheWay => "click OTW",
        GuardedAction::Acknowledge => "acknowledge",
        GuardedAction::Arrive => "click Aqui",
    }
}
