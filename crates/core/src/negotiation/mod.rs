pub mod engine;
pub mod states;
pub mod token;

pub use engine::{NegotiationEngine, MAX_DURATION_CHARS, MAX_NOTE_CHARS};
pub use states::{
    confirmer_for, Actor, Control, GuardedAction, NegotiationState, Pair, Prompt, Step, Target,
    Transition, UserId, WorkflowProfile, MAX_USER_ID_LEN,
};
pub use token::{decode, encode, ControlTag, TokenError, MAX_TOKEN_LEN};
