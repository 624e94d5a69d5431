//! Custom-id codec for workflow controls.
//!
//! Every control carries its whole negotiation state in its custom id:
//! `smoke_v1_<tag>_<field>...`. Identity fields are positional; `open` marks a
//! request without a specific target and `none` an absent optional value.
//! The version segment lets a later schema decode alongside `v1`.

use thiserror::Error;

use super::states::{Control, Pair, Target, UserId, NONE_SENTINEL, OPEN_SENTINEL};

pub const NAMESPACE: &str = "smoke";
pub const SCHEMA_VERSION: &str = "v1";
pub const DELIMITER: char = '_';
/// Platform limit for a component custom id.
pub const MAX_TOKEN_LEN: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlTag {
    Accept,
    Deny,
    RequestTime,
    TimeModal,
    AcceptTime,
    OnTheWay,
    Acknowledge,
    AcknowledgeModal,
    Arrive,
}

impl ControlTag {
    pub const ALL: [ControlTag; 9] = [
        Self::Accept,
        Self::Deny,
        Self::RequestTime,
        Self::TimeModal,
        Self::AcceptTime,
        Self::OnTheWay,
        Self::Acknowledge,
        Self::AcknowledgeModal,
        Self::Arrive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "acc",
            Self::Deny => "deny",
            Self::RequestTime => "time",
            Self::TimeModal => "tmod",
            Self::AcceptTime => "acct",
            Self::OnTheWay => "otw",
            Self::Acknowledge => "ack",
            Self::AcknowledgeModal => "amod",
            Self::Arrive => "aqui",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == value)
    }

    fn field_count(self) -> usize {
        match self {
            Self::Accept | Self::Deny | Self::RequestTime => 2,
            Self::TimeModal => 3,
            Self::AcceptTime => 4,
            Self::OnTheWay | Self::Acknowledge | Self::AcknowledgeModal => 2,
            Self::Arrive => 1,
        }
    }

    /// True for custom ids that name a modal rather than a button.
    pub fn is_modal(self) -> bool {
        matches!(self, Self::TimeModal | Self::AcknowledgeModal)
    }
}

impl Control {
    pub fn tag(&self) -> ControlTag {
        match self {
            Self::Accept { .. } => ControlTag::Accept,
            Self::Deny { .. } => ControlTag::Deny,
            Self::RequestTime { .. } => ControlTag::RequestTime,
            Self::TimeModal { .. } => ControlTag::TimeModal,
            Self::AcceptTime { .. } => ControlTag::AcceptTime,
            Self::OnTheWay { .. } => ControlTag::OnTheWay,
            Self::Acknowledge { .. } => ControlTag::Acknowledge,
            Self::AcknowledgeModal { .. } => ControlTag::AcknowledgeModal,
            Self::Arrive { .. } => ControlTag::Arrive,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token `{0}` does not belong to this application")]
    ForeignNamespace(String),
    #[error("token schema version `{0}` is not supported")]
    UnsupportedVersion(String),
    #[error("unknown control tag `{0}`")]
    UnknownTag(String),
    #[error("control `{tag}` expects {expected} fields, found {found}")]
    FieldCount { tag: &'static str, expected: usize, found: usize },
    #[error("control `{tag}` has an invalid identity field")]
    InvalidField { tag: &'static str },
    #[error("control `{tag}` has an invalid escape sequence")]
    InvalidEscape { tag: &'static str },
}

pub fn encode(control: &Control) -> String {
    let tag = control.tag();
    let mut token = format!("{NAMESPACE}{DELIMITER}{SCHEMA_VERSION}{DELIMITER}{}", tag.as_str());

    match control {
        Control::Accept { requester, target }
        | Control::Deny { requester, target }
        | Control::RequestTime { requester, target } => {
            push_field(&mut token, requester.as_str());
            push_field(&mut token, target_field(target));
        }
        Control::TimeModal { requester, target, opener } => {
            push_field(&mut token, requester.as_str());
            push_field(&mut token, target_field(target));
            push_field(&mut token, opener.as_str());
        }
        Control::AcceptTime { requester, target, proposer, duration } => {
            push_field(&mut token, requester.as_str());
            push_field(&mut token, target_field(target));
            push_field(&mut token, proposer.as_str());
            token.push(DELIMITER);
            let budget = MAX_TOKEN_LEN.saturating_sub(token.len());
            token.push_str(&encode_free_text(duration.as_deref(), budget));
        }
        Control::OnTheWay { pair } => {
            push_field(&mut token, pair.first.as_str());
            push_field(&mut token, pair.second.as_str());
        }
        Control::Acknowledge { mover, waiter } | Control::AcknowledgeModal { mover, waiter } => {
            push_field(&mut token, mover.as_str());
            push_field(&mut token, waiter.as_str());
        }
        Control::Arrive { mover } => push_field(&mut token, mover.as_str()),
    }

    token
}

pub fn decode(token: &str) -> Result<Control, TokenError> {
    let mut segments = token.split(DELIMITER);
    let namespace = segments.next().unwrap_or_default();
    if namespace != NAMESPACE {
        return Err(TokenError::ForeignNamespace(token.to_owned()));
    }

    let version = segments.next().unwrap_or_default();
    if version != SCHEMA_VERSION {
        return Err(TokenError::UnsupportedVersion(version.to_owned()));
    }

    let raw_tag = segments.next().unwrap_or_default();
    let tag = ControlTag::parse(raw_tag).ok_or_else(|| TokenError::UnknownTag(raw_tag.to_owned()))?;
    let fields = segments.collect::<Vec<_>>();
    if fields.len() != tag.field_count() {
        return Err(TokenError::FieldCount {
            tag: tag.as_str(),
            expected: tag.field_count(),
            found: fields.len(),
        });
    }

    let user = |index: usize| {
        UserId::parse(fields[index]).ok_or(TokenError::InvalidField { tag: tag.as_str() })
    };
    let target = |index: usize| match fields[index] {
        OPEN_SENTINEL => Ok(Target::Open),
        other => UserId::parse(other)
            .map(Target::User)
            .ok_or(TokenError::InvalidField { tag: tag.as_str() }),
    };

    let control = match tag {
        ControlTag::Accept => Control::Accept { requester: user(0)?, target: target(1)? },
        ControlTag::Deny => Control::Deny { requester: user(0)?, target: target(1)? },
        ControlTag::RequestTime => {
            Control::RequestTime { requester: user(0)?, target: target(1)? }
        }
        ControlTag::TimeModal => {
            Control::TimeModal { requester: user(0)?, target: target(1)?, opener: user(2)? }
        }
        ControlTag::AcceptTime => Control::AcceptTime {
            requester: user(0)?,
            target: target(1)?,
            proposer: user(2)?,
            duration: decode_free_text(fields[3])
                .ok_or(TokenError::InvalidEscape { tag: tag.as_str() })?,
        },
        ControlTag::OnTheWay => Control::OnTheWay { pair: Pair::new(user(0)?, user(1)?) },
        ControlTag::Acknowledge => Control::Acknowledge { mover: user(0)?, waiter: user(1)? },
        ControlTag::AcknowledgeModal => {
            Control::AcknowledgeModal { mover: user(0)?, waiter: user(1)? }
        }
        ControlTag::Arrive => Control::Arrive { mover: user(0)? },
    };

    Ok(control)
}

fn push_field(token: &mut String, field: &str) {
    token.push(DELIMITER);
    token.push_str(field);
}

fn target_field(target: &Target) -> &str {
    match target {
        Target::Open => OPEN_SENTINEL,
        Target::User(id) => id.as_str(),
    }
}

/// Percent-encodes free text so it never contains the delimiter, truncating on a
/// character boundary to fit `budget` bytes.
fn encode_free_text(value: Option<&str>, budget: usize) -> String {
    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return NONE_SENTINEL.to_owned();
    };

    let mut encoded = String::new();
    for (index, ch) in value.chars().enumerate() {
        let mut piece = String::new();
        // a literal "none" must not read back as the sentinel
        let escape_sentinel = index == 0 && value == NONE_SENTINEL;
        if (ch.is_ascii_alphanumeric() && !escape_sentinel) || matches!(ch, '-' | '.' | '~') {
            piece.push(ch);
        } else {
            let mut buffer = [0u8; 4];
            for byte in ch.encode_utf8(&mut buffer).bytes() {
                piece.push_str(&format!("%{byte:02X}"));
            }
        }

        if encoded.len() + piece.len() > budget {
            break;
        }
        encoded.push_str(&piece);
    }

    if encoded.is_empty() {
        NONE_SENTINEL.to_owned()
    } else {
        encoded
    }
}

fn decode_free_text(value: &str) -> Option<Option<String>> {
    if value == NONE_SENTINEL {
        return Some(None);
    }

    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0usize;

    while index < bytes.len() {
        match bytes[index] {
            b'%' => {
                if index + 2 >= bytes.len() {
                    return None;
                }

                let high = hex_nibble(bytes[index + 1])?;
                let low = hex_nibble(bytes[index + 2])?;
                decoded.push((high << 4) | low);
                index += 3;
            }
            byte => {
                decoded.push(byte);
                index += 1;
            }
        }
    }

    String::from_utf8(decoded).ok().map(Some)
}

fn hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}
