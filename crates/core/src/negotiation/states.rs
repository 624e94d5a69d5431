use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Presentation, TimeRequestMode, WorkflowConfig};

pub const OPEN_SENTINEL: &str = "open";
pub const NONE_SENTINEL: &str = "none";
/// Digits in the largest 64-bit snowflake.
pub const MAX_USER_ID_LEN: usize = 20;

/// Platform identity of a participant. Parsed ids are 1 to 20 ASCII digits, so they never
/// contain the token delimiter and never collide with a token sentinel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wraps a platform id without validation.
    /// Callers holding untrusted input use [`UserId::parse`].
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Accepts only the platform's snowflake shape, which keeps every identity token field
    /// within [`MAX_USER_ID_LEN`] bytes.
    pub fn parse(value: &str) -> Option<Self> {
        let usable = (1..=MAX_USER_ID_LEN).contains(&value.len())
            && value.bytes().all(|byte| byte.is_ascii_digit());
        usable.then(|| Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity performing a transition, with the name shown in rendered messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub display_name: String,
}

impl Actor {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self { id, display_name: display_name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Open,
    User(UserId),
}

impl Target {
    pub fn admits(&self, actor: &UserId) -> bool {
        match self {
            Self::Open => true,
            Self::User(id) => id == actor,
        }
    }

    pub fn user(&self) -> Option<&UserId> {
        match self {
            Self::Open => None,
            Self::User(id) => Some(id),
        }
    }
}

impl From<Option<UserId>> for Target {
    fn from(value: Option<UserId>) -> Self {
        value.map(Self::User).unwrap_or(Self::Open)
    }
}

/// The two identities bound once a request is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pair {
    pub first: UserId,
    pub second: UserId,
}

impl Pair {
    pub fn new(first: UserId, second: UserId) -> Self {
        Self { first, second }
    }

    pub fn contains(&self, id: &UserId) -> bool {
        &self.first == id || &self.second == id
    }

    /// The member of the pair that is not `id`. Only meaningful when `contains(id)`.
    pub fn other(&self, id: &UserId) -> &UserId {
        if &self.first == id {
            &self.second
        } else {
            &self.first
        }
    }

    pub fn members(&self) -> Vec<UserId> {
        if self.first == self.second {
            vec![self.first.clone()]
        } else {
            vec![self.first.clone(), self.second.clone()]
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Requested,
    TimeProposed,
    Accepted,
    EnRoute,
    Acknowledged,
    Arrived,
    Denied,
}

impl Step {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Arrived | Self::Denied)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::TimeProposed => "time_proposed",
            Self::Accepted => "accepted",
            Self::EnRoute => "en_route",
            Self::Acknowledged => "acknowledged",
            Self::Arrived => "arrived",
            Self::Denied => "denied",
        }
    }
}

/// Transitions that are restricted to particular identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GuardedAction {
    Accept,
    Deny,
    RequestTime,
    ProposeTime,
    AcceptTime,
    OnTheWay,
    Acknowledge,
    Arrive,
}

impl GuardedAction {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Accept => "accepting this request",
            Self::Deny => "denying this request",
            Self::RequestTime => "asking for more time",
            Self::ProposeTime => "proposing a time",
            Self::AcceptTime => "accepting the proposed time",
            Self::OnTheWay => "heading out",
            Self::Acknowledge => "acknowledging",
            Self::Arrive => "checking in",
        }
    }
}

/// Every activatable element and modal the workflow emits, with the identity state it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Control {
    Accept { requester: UserId, target: Target },
    Deny { requester: UserId, target: Target },
    RequestTime { requester: UserId, target: Target },
    TimeModal { requester: UserId, target: Target, opener: UserId },
    AcceptTime { requester: UserId, target: Target, proposer: UserId, duration: Option<String> },
    OnTheWay { pair: Pair },
    Acknowledge { mover: UserId, waiter: UserId },
    AcknowledgeModal { mover: UserId, waiter: UserId },
    Arrive { mover: UserId },
}

/// The state rendered onto the shared message after a successful transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NegotiationState {
    Requested { requester: UserId, target: Target },
    TimeProposed { requester: UserId, target: Target, proposer: UserId, duration: Option<String> },
    Accepted { pair: Pair, duration: Option<String> },
    EnRoute { mover: UserId, waiter: UserId },
    Acknowledged { mover: UserId, waiter: UserId, note: Option<String> },
    Arrived { mover: UserId },
    Denied { requester: UserId },
}

impl NegotiationState {
    pub fn step(&self) -> Step {
        match self {
            Self::Requested { .. } => Step::Requested,
            Self::TimeProposed { .. } => Step::TimeProposed,
            Self::Accepted { .. } => Step::Accepted,
            Self::EnRoute { .. } => Step::EnRoute,
            Self::Acknowledged { .. } => Step::Acknowledged,
            Self::Arrived { .. } => Step::Arrived,
            Self::Denied { .. } => Step::Denied,
        }
    }

    /// Controls to attach to the rendered message. Terminal states carry none.
    pub fn controls(&self, profile: &WorkflowProfile) -> Vec<Control> {
        match self {
            Self::Requested { requester, target } => {
                let mut controls = vec![
                    Control::Accept { requester: requester.clone(), target: target.clone() },
                    Control::Deny { requester: requester.clone(), target: target.clone() },
                ];
                if profile.time_request != TimeRequestMode::Off {
                    controls.push(Control::RequestTime {
                        requester: requester.clone(),
                        target: target.clone(),
                    });
                }
                controls
            }
            Self::TimeProposed { requester, target, proposer, duration } => vec![
                Control::AcceptTime {
                    requester: requester.clone(),
                    target: target.clone(),
                    proposer: proposer.clone(),
                    duration: duration.clone(),
                },
                Control::Deny {
                    requester: requester.clone(),
                    target: confirmer_for(requester, target, proposer),
                },
            ],
            Self::Accepted { pair, .. } => vec![Control::OnTheWay { pair: pair.clone() }],
            Self::EnRoute { mover, waiter } => {
                vec![Control::Acknowledge { mover: mover.clone(), waiter: waiter.clone() }]
            }
            Self::Acknowledged { mover, .. } => vec![Control::Arrive { mover: mover.clone() }],
            Self::Arrived { .. } | Self::Denied { .. } => Vec::new(),
        }
    }
}

/// Who must confirm a time proposal: whichever of `{requester, target}` did not propose it.
pub fn confirmer_for(requester: &UserId, target: &Target, proposer: &UserId) -> Target {
    if proposer == requester {
        target.clone()
    } else {
        Target::User(requester.clone())
    }
}

/// A modal the actor must fill in before the shared message moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Duration { requester: UserId, target: Target, opener: UserId },
    AcknowledgeNote { mover: UserId, waiter: UserId },
}

impl Prompt {
    pub fn control(&self) -> Control {
        match self {
            Self::Duration { requester, target, opener } => Control::TimeModal {
                requester: requester.clone(),
                target: target.clone(),
                opener: opener.clone(),
            },
            Self::AcknowledgeNote { mover, waiter } => {
                Control::AcknowledgeModal { mover: mover.clone(), waiter: waiter.clone() }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Update(NegotiationState),
    Prompt(Prompt),
}

/// Workflow variant selected by configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowProfile {
    pub presentation: Presentation,
    pub time_request: TimeRequestMode,
    pub fixed_minutes: u16,
    pub acknowledge_note: bool,
}

impl Default for WorkflowProfile {
    fn default() -> Self {
        Self::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for WorkflowProfile {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            presentation: config.presentation,
            time_request: config.time_request,
            fixed_minutes: config.fixed_minutes,
            acknowledge_note: config.acknowledge_note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{UserId, MAX_USER_ID_LEN, NONE_SENTINEL, OPEN_SENTINEL};

    #[test]
    fn snowflake_ids_parse() {
        assert_eq!(UserId::parse("80351110224678912"), Some(UserId::new("80351110224678912")));
        assert!(UserId::parse(&"9".repeat(MAX_USER_ID_LEN)).is_some());
    }

    #[test]
    fn over_long_and_non_numeric_ids_are_rejected() {
        assert_eq!(UserId::parse(&"9".repeat(MAX_USER_ID_LEN + 1)), None);
        assert_eq!(UserId::parse(&"9".repeat(60)), None);
        for raw in ["", "alice", "12_34", "<@123>", " 123", OPEN_SENTINEL, NONE_SENTINEL] {
            assert_eq!(UserId::parse(raw), None, "accepted {raw:?}");
        }
    }
}
