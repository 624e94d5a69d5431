pub mod config;
pub mod errors;
pub mod negotiation;

pub use errors::{AuthFailure, AuthorizationDenied, InterfaceError, UnrecognizedEvent};
pub use negotiation::{
    Actor, Control, NegotiationEngine, NegotiationState, Step, Target, Transition, UserId,
    WorkflowProfile,
};
