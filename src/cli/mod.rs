//! CLI Interface: User input and terminal rendering
//!
//! # Components
//! - `input.rs`: Keystroke capture using crossterm
//! - `display.rs`: Terminal rendering and the performance table

pub mod display;
pub mod input;
