//! Deterministic card environments rebuilt from recorded subjects.
//!
//! - `reconstruct`: per-deck card sequences (real draws, then schedule filler).
//! - `environment`: stateful stepper used to replay an agent over them.

mod environment;
mod reconstruct;

pub use environment::{Outcome, ReplayEnvironment};
pub use reconstruct::{ENVIRONMENT_HORIZON, ReconstructedEnvironment, reconstruct};
