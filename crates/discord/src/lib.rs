//! Discord interactions interface for smokesignal.
//!
//! - **Verification** (`verify`) - Ed25519 check of `timestamp || body` before any parsing
//! - **Wire schema** (`interactions`) - inbound interaction bodies and outbound responses
//! - **Components** (`components`) - buttons, text inputs and action rows
//! - **Rendering** (`render`) - negotiation states as content or embed messages
//! - **Slash commands** (`commands`) - `/smoketime`, `/smoke` and their registration payload
//! - **Events** (`events`) - routes each interaction kind to its handler
//!
//! ```text
//! POST / → RequestAuthenticator → Interaction → EventDispatcher → NegotiationEngine
//!                                                     ↓
//!                                        InteractionResponse ← render
//! ```

pub mod commands;
pub mod components;
pub mod events;
pub mod interactions;
pub mod render;
pub mod verify;
