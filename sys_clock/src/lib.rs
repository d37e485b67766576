//! # System Clock Driver
//!
//! Turns the SAM0 RTC into the kernel's tick source.
//!
//! The kernel asks for "wake me in N ticks" with [`SystemTimer::set_timeout`]
//! and is told how much time actually passed through
//! [`KernelClock::announce`] from the counter's interrupt. Two cores
//! implement the bookkeeping:
//!
//! - [`TicklessCore`]: the counter runs free and the comparator is moved to
//!   the next requested tick boundary, so an idle system takes no
//!   interrupts
//! - [`PeriodicCore`]: the counter clears every tick and interrupts each
//!   time; ticks are counted in software
//!
//! The `tickless` feature (on by default) selects which one
//! [`ActiveCore`] names. Both are always compiled so either can be tested.

pub mod config;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod lock;
pub mod periodic;
pub mod status;
pub mod tickless;
pub mod timer_core;

pub use config::{max_ticks, TimerConfig, TICK_THRESHOLD};
pub use driver::{SystemTimer, RESET_POLLS};
pub use error::TimerError;
pub use kernel::KernelClock;
pub use lock::IrqGuard;
pub use periodic::PeriodicCore;
pub use status::TimerStatus;
pub use tickless::TicklessCore;
pub use timer_core::{CoreState, TimerCore, TimerMode};

/// The core selected by the build configuration
#[cfg(feature = "tickless")]
pub type ActiveCore<C> = TicklessCore<C>;

/// The core selected by the build configuration
#[cfg(not(feature = "tickless"))]
pub type ActiveCore<C> = PeriodicCore<C>;
