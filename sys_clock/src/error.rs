//! System timer error types

use hal::{ClockError, InterruptError};
use thiserror::Error;

/// Errors that can occur while bringing up the system timer
///
/// Only `init()` can fail. The kernel has no time source without this
/// driver, so any of these is fatal to it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// `init()` was called twice
    #[error("System timer already initialized")]
    AlreadyInitialized,

    /// The counter's software reset never completed
    #[error("Timer software reset did not complete")]
    ResetTimeout,

    /// The interrupt line could not be connected
    #[error("Interrupt setup failed: {0}")]
    Interrupt(#[from] InterruptError),

    /// The counter clock could not be routed
    #[error("Clock setup failed: {0}")]
    Clock(#[from] ClockError),
}
