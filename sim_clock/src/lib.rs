//! # Simulated System Clock
//!
//! Runs the real timer driver against the fake SAM0 peripherals.
//!
//! ## Philosophy
//!
//! **Determinism enables thorough testing.**
//!
//! Time only moves when a test says so. The board advances the fake
//! counter one hardware event at a time and, after each, dispatches the
//! counter interrupt exactly the way the NVIC would: only while the line is
//! enabled, and as many times as it is re-raised.

pub mod board;
pub mod config;
pub mod kernel;

pub use board::{SimBoard, SimTimer};
pub use config::{Sam0Board, SimConfig};
pub use kernel::RecordingKernel;
