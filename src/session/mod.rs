//! Session Management: state, answer checking and the check/next cycle
//!
//! # Components
//! - `state.rs`: SessionState struct for tracking session progress
//! - `answer.rs`: Answer normalization and feedback
//! - `controller.rs`: SessionController tying catalog, ledger and selector

pub mod answer;
pub mod controller;
pub mod state;

pub use answer::Feedback;
pub use controller::SessionController;
pub use state::{Phase, SessionSummary};
