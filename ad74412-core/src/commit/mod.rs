//! Channel function commit sequencing
//!
//! Switching a channel's function needs timed dwell periods on the chip,
//! so a commit is a state machine driven by timer expiry and exchange
//! completion events rather than a single call.

pub mod events;
pub mod machine;

pub use events::{CommitEvent, TimerRequest, TimerTag};
pub use machine::{CommitState, CommitStateMachine, CommitStep, COMMIT_EXCHANGE_BYTES};
