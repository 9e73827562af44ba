//! CI pipeline monitor.
//!
//! Polls the latest pipeline run of one repository and alerts configured
//! sinks whenever a run with a new id has failed or succeeded.

pub mod alert;
pub mod detector;
pub mod poll;

pub use detector::{DetectorState, Transition, TransitionDetector};
pub use poll::{CycleOutcome, PollLoop};
