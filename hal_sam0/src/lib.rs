//! # SAM0 Hardware Abstraction Layer
//!
//! This crate implements the HAL traits for the Microchip (Atmel) SAM0
//! family: the RTC in 32-bit counter mode, the Cortex-M0+ NVIC, and the
//! PM/GCLK plumbing that feeds the RTC.
//!
//! ## Scope
//!
//! Real devices access memory-mapped registers and are only meaningful on
//! the target. The [`fake`] module provides deterministic stand-ins that
//! simulate the counter on the host.

pub mod clocks;
pub mod fake;
pub mod mmio;
pub mod nvic;
pub mod rtc;

pub use clocks::{Sam0Clocks, GCLK_BASE, PM_BASE};
pub use fake::{FakeClocks, FakeNvic, FakeRtc, NvicOp, RegAccess, SyncViolation};
pub use mmio::Mmio;
pub use nvic::{Nvic, NVIC_BASE, PRIORITY_LEVELS};
pub use rtc::{Sam0Rtc, RTC_BASE};

/// RTC interrupt line on SAM D21
pub const RTC_IRQ: hal::IrqNumber = 3;
