//! The exchange loop: model calls interleaved with gated tool dispatch.

pub mod controller;
pub mod outcome;
pub mod state;


pub use controller::{ConversationController, STOP_NOTICE};
pub use outcome::ExchangeOutcome;
pub use state::{ControllerPhase, ExchangeState};
