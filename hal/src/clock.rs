//! Peripheral clock abstraction

use thiserror::Error;

/// Errors raised while routing a peripheral clock
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The clock generator never finished synchronizing
    #[error("Clock generator {0} did not synchronize")]
    SyncTimeout(u8),
}

/// Clock tree operations
///
/// This trait abstracts enabling a peripheral's bus clock and routing a
/// generic clock generator to it. One-time plumbing, called from init.
pub trait ClockControl {
    /// Enables the peripheral's bus (APB) clock
    fn enable_bus_clock(&self);

    /// Routes the given clock generator to the peripheral and waits for
    /// the generator to synchronize
    fn route_generator(&self, generator: u8) -> Result<(), ClockError>;
}
