//! Core port definitions for timebox adapters.
//!
//! The clock never talks to a concrete document, terminal or system clock.
//! Hosts implement these contracts and hand them to the widget when mounting.

pub mod display;
pub mod time;
