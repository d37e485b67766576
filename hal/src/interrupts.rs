//! Interrupt controller abstraction

use thiserror::Error;

/// External interrupt line number
pub type IrqNumber = u16;

/// Errors that can occur when wiring an interrupt line
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InterruptError {
    /// A handler is already connected to this line
    #[error("IRQ {0} is already connected")]
    AlreadyConnected(IrqNumber),

    /// The controller has no such line
    #[error("IRQ {0} is out of range")]
    InvalidLine(IrqNumber),

    /// The controller does not implement this priority level
    #[error("Priority {0} is not supported by the controller")]
    InvalidPriority(u8),
}

/// Interrupt controller trait
///
/// Covers what a tick source needs from the controller: connect a line
/// at a priority, enable it, force it pending, and mask it around short
/// critical sections.
pub trait InterruptController {
    /// Connects a line at the given priority
    ///
    /// Fails if the line does not exist or the priority has more levels
    /// than the controller implements.
    ///
    /// The handler itself is bound statically (vector table); this only
    /// claims the line and programs its priority.
    fn connect(&self, irq: IrqNumber, priority: u8) -> Result<(), InterruptError>;

    /// Enables a line
    fn enable(&self, irq: IrqNumber);

    /// Masks a line
    ///
    /// Returns whether the line was enabled before the call, so the caller
    /// can restore the previous state.
    fn mask(&self, irq: IrqNumber) -> bool;

    /// Clears a pending request on a line
    fn clear_pending(&self, irq: IrqNumber);

    /// Forces a line pending, as if the device had raised it
    fn set_pending(&self, irq: IrqNumber);
}
