use crate::config::TimeRequestMode;
use crate::errors::AuthorizationDenied;
use crate::negotiation::states::{
    confirmer_for, Actor, Control, GuardedAction, NegotiationState, Pair, Prompt, Target,
    Transition, UserId, WorkflowProfile,
};

/// Longest free-text duration accepted from the time modal.
pub const MAX_DURATION_CHARS: usize = 16;
/// Longest acknowledgement note accepted from the acknowledge modal.
pub const MAX_NOTE_CHARS: usize = 100;

/// Stateless transition function over token-encoded negotiations.
#[derive(Clone, Debug, Default)]
pub struct NegotiationEngine {
    profile: WorkflowProfile,
}

impl NegotiationEngine {
    pub fn new(profile: WorkflowProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &WorkflowProfile {
        &self.profile
    }

    pub fn start(&self, requester: &Actor, target: Target) -> NegotiationState {
        NegotiationState::Requested { requester: requester.id.clone(), target }
    }

    /// Applies the activation of `control` by `actor`. `submitted` carries the text-input value
    /// when `control` names a modal.
    pub fn apply(
        &self,
        control: &Control,
        actor: &Actor,
        submitted: Option<&str>,
    ) -> Result<Transition, AuthorizationDenied> {
        let actor_id = &actor.id;

        let transition = match control {
            Control::Accept { requester, target } => {
                authorize_target(GuardedAction::Accept, target, actor_id)?;
                Transition::Update(NegotiationState::Accepted {
                    pair: Pair::new(requester.clone(), actor_id.clone()),
                    duration: None,
                })
            }
            Control::Deny { requester, target } => {
                authorize_target(GuardedAction::Deny, target, actor_id)?;
                Transition::Update(NegotiationState::Denied { requester: requester.clone() })
            }
            Control::RequestTime { requester, target } => {
                authorize_target(GuardedAction::RequestTime, target, actor_id)?;
                match self.profile.time_request {
                    TimeRequestMode::Fixed => Transition::Update(NegotiationState::TimeProposed {
                        requester: requester.clone(),
                        target: target.clone(),
                        proposer: actor_id.clone(),
                        duration: Some(format!("{} minutes", self.profile.fixed_minutes)),
                    }),
                    TimeRequestMode::Prompt | TimeRequestMode::Off => {
                        Transition::Prompt(Prompt::Duration {
                            requester: requester.clone(),
                            target: target.clone(),
                            opener: actor_id.clone(),
                        })
                    }
                }
            }
            Control::TimeModal { requester, target, opener } => {
                authorize_user(GuardedAction::ProposeTime, opener, actor_id)?;
                Transition::Update(NegotiationState::TimeProposed {
                    requester: requester.clone(),
                    target: target.clone(),
                    proposer: actor_id.clone(),
                    duration: clean_free_text(submitted, MAX_DURATION_CHARS),
                })
            }
            Control::AcceptTime { requester, target, proposer, duration } => {
                let confirmer = confirmer_for(requester, target, proposer);
                if actor_id == proposer {
                    return Err(AuthorizationDenied {
                        action: GuardedAction::AcceptTime,
                        allowed: confirmer.user().cloned().into_iter().collect(),
                    });
                }
                authorize_target(GuardedAction::AcceptTime, &confirmer, actor_id)?;
                let counterpart = if proposer == requester { actor_id } else { proposer };
                Transition::Update(NegotiationState::Accepted {
                    pair: Pair::new(requester.clone(), counterpart.clone()),
                    duration: duration.clone(),
                })
            }
            Control::OnTheWay { pair } => {
                if !pair.contains(actor_id) {
                    return Err(AuthorizationDenied {
                        action: GuardedAction::OnTheWay,
                        allowed: pair.members(),
                    });
                }
                Transition::Update(NegotiationState::EnRoute {
                    mover: actor_id.clone(),
                    waiter: pair.other(actor_id).clone(),
                })
            }
            Control::Acknowledge { mover, waiter } => {
                authorize_user(GuardedAction::Acknowledge, waiter, actor_id)?;
                if self.profile.acknowledge_note {
                    Transition::Prompt(Prompt::AcknowledgeNote {
                        mover: mover.clone(),
                        waiter: waiter.clone(),
                    })
                } else {
                    Transition::Update(NegotiationState::Acknowledged {
                        mover: mover.clone(),
                        waiter: waiter.clone(),
                        note: None,
                    })
                }
            }
            Control::AcknowledgeModal { mover, waiter } => {
                authorize_user(GuardedAction::Acknowledge, waiter, actor_id)?;
                Transition::Update(NegotiationState::Acknowledged {
                    mover: mover.clone(),
                    waiter: waiter.clone(),
                    note: clean_free_text(submitted, MAX_NOTE_CHARS),
                })
            }
            Control::Arrive { mover } => {
                authorize_user(GuardedAction::Arrive, mover, actor_id)?;
                Transition::Update(NegotiationState::Arrived { mover: mover.clone() })
            }
        };

        Ok(transition)
    }
}

fn authorize_target(
    action: GuardedAction,
    target: &Target,
    actor: &UserId,
) -> Result<(), AuthorizationDenied> {
    if target.admits(actor) {
        return Ok(());
    }
    Err(AuthorizationDenied { action, allowed: target.user().cloned().into_iter().collect() })
}

fn authorize_user(
    action: GuardedAction,
    allowed: &UserId,
    actor: &UserId,
) -> Result<(), AuthorizationDenied> {
    if allowed == actor {
        return Ok(());
    }
    Err(AuthorizationDenied { action, allowed: vec![allowed.clone()] })
}

fn clean_free_text(value: Option<&str>, max_chars: usize) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect())
}
