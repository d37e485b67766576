//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines the hardware traits the system clock driver is
//! written against.
//!
//! ## Philosophy
//!
//! **The tick arithmetic must never touch a register directly.**
//!
//! Everything the driver needs from the silicon goes through one of three
//! small traits, so the state machines can run against a simulated counter
//! in tests and against memory-mapped registers on the target.
//!
//! ## Design Principles
//!
//! 1. **Synchronized access**: register reads and writes that cross the
//!    peripheral's clock domain go through the sync-busy protocol
//! 2. **Trait-based**: all hardware operations go through traits
//! 3. **Minimal unsafe**: hardware access requires unsafe, but keep it isolated
//! 4. **Testable**: every trait can be faked

pub mod clock;
pub mod interrupts;
pub mod timer;

pub use clock::{ClockControl, ClockError};
pub use interrupts::{InterruptController, InterruptError, IrqNumber};
pub use timer::{ControlFlags, InterruptFlags, RtcRegisters};
