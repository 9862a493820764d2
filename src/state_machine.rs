//! Negotiation stage machine
//!
//! A pure transition function over a closed set of stages, driven by the
//! classified customer intent. Flags are the machine's output.

pub mod intent;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use intent::CustomerIntent;
pub use state::{SimFlags, SimStage, UnknownStage};
pub use transition::{transition, TransitionResult};
