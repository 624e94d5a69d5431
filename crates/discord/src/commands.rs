use serde::Serialize;
use smokesignal_core::errors::UnrecognizedEvent;
use smokesignal_core::negotiation::{Target, UserId};

use crate::interactions::CommandInvocation;

pub const TARGET_OPTION: &str = "user";
const CHAT_INPUT: u8 = 1;
const USER_OPTION: u8 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmokeCommand {
    SmokeTime,
    Smoke,
}

impl SmokeCommand {
    pub const ALL: [SmokeCommand; 2] = [Self::SmokeTime, Self::Smoke];

    pub fn name(self) -> &'static str {
        match self {
            Self::SmokeTime => "smoketime",
            Self::Smoke => "smoke",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::SmokeTime => "Initiate the smoke signal",
            Self::Smoke => "Quick smoke break request",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name.trim().trim_start_matches('/'))
    }
}

/// A slash command resolved to the negotiation it starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartRequest {
    pub command: SmokeCommand,
    pub target: Target,
}

pub fn parse_invocation(invocation: &CommandInvocation) -> Result<StartRequest, UnrecognizedEvent> {
    let command = SmokeCommand::from_name(&invocation.name)
        .ok_or_else(|| UnrecognizedEvent::UnknownCommand(invocation.name.clone()))?;

    let target = match invocation.target.as_deref().map(str::trim) {
        None | Some("") => Target::Open,
        Some(raw) => {
            let id = UserId::parse(raw).ok_or_else(|| {
                UnrecognizedEvent::MalformedBody(format!(
                    "`{TARGET_OPTION}` option `{raw}` is not a user id"
                ))
            })?;
            Target::User(id)
        }
    };

    Ok(StartRequest { command, target })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: u8,
    pub options: Vec<CommandOptionDefinition>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandOptionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: u8,
    pub required: bool,
}

/// Body for the bulk-overwrite of the application's global commands.
pub fn registration_payload() -> Vec<CommandDefinition> {
    SmokeCommand::ALL
        .into_iter()
        .map(|command| CommandDefinition {
            name: command.name(),
            description: command.description(),
            kind: CHAT_INPUT,
            options: vec![CommandOptionDefinition {
                name: TARGET_OPTION,
                description: "Tag a specific person for smoketime",
                kind: USER_OPTION,
                required: false,
            }],
        })
        .collect()
}
