//! # Timer Counter Registers
//!
//! Hardware abstraction for a 32-bit counter/comparator pair that lives in
//! a slow clock domain.
//!
//! ## Philosophy
//!
//! **A register value is only real after synchronization.**
//!
//! Peripherals of this class (the SAM0 RTC being the reference) clock their
//! registers from a slow generator. A write from the bus is not effective,
//! and a read is not current, until the peripheral drops its sync-busy bit.
//! This trait exposes the raw registers and builds the synchronized
//! operations on top of them as provided methods, so every implementation
//! gets the protocol right by construction.
//!
//! ## Not For
//!
//! - Clock bring-up (see [`crate::clock`])
//! - Interrupt routing (see [`crate::interrupts`])

use bitflags::bitflags;

bitflags! {
    /// Interrupt flag, enable-set and enable-clear bits (MODE0 layout).
    pub struct InterruptFlags: u8 {
        /// Compare 0 match
        const CMP0 = 1 << 0;
        /// Register synchronization ready
        const SYNCRDY = 1 << 6;
        /// Counter overflow (also raised on match-clear)
        const OVF = 1 << 7;
    }
}

bitflags! {
    /// Control register bits (MODE0 layout).
    pub struct ControlFlags: u16 {
        /// Software reset, self-clearing
        const SWRST = 1 << 0;
        /// Peripheral enable
        const ENABLE = 1 << 1;
        /// Operating mode field; all zero selects 32-bit counter mode
        const MODE = 0b11 << 2;
        /// Clear the counter on compare 0 match
        const MATCHCLR = 1 << 7;
        /// Prescaler field; all zero divides by one
        const PRESCALER = 0b1111 << 8;
    }
}

/// Raw access to a counter/comparator peripheral
///
/// Implementations only move bits; ordering and synchronization are the
/// caller's job, helped by the provided methods.
///
/// All methods take `&self`: the registers are shared between interrupt
/// and normal context and the hardware serializes access itself.
pub trait RtcRegisters {
    /// Returns true while a register synchronization is in flight
    fn sync_busy(&self) -> bool;

    /// Reads the control register
    fn read_ctrl(&self) -> ControlFlags;

    /// Writes the control register
    fn write_ctrl(&self, ctrl: ControlFlags);

    /// Asks the peripheral to latch COUNT into the bus domain
    fn request_read(&self);

    /// Reads the latched COUNT value
    ///
    /// Only current after [`RtcRegisters::request_read`] followed by a
    /// completed sync.
    fn count(&self) -> u32;

    /// Writes the compare 0 register
    fn write_comp0(&self, value: u32);

    /// Reads the interrupt flag register
    fn interrupt_flags(&self) -> InterruptFlags;

    /// Clears the given flags (write-one-to-clear)
    fn clear_interrupt_flags(&self, flags: InterruptFlags);

    /// Enables the given interrupt sources
    fn enable_interrupts(&self, flags: InterruptFlags);

    /// Disables the given interrupt sources
    fn disable_interrupts(&self, flags: InterruptFlags);

    /// Busy-waits until the peripheral finishes synchronizing
    ///
    /// Bounded by hardware: a sync takes a handful of slow-clock cycles.
    fn wait_sync(&self) {
        while self.sync_busy() {
            core::hint::spin_loop();
        }
    }

    /// Performs a synchronized read of the counter
    ///
    /// A read request may not be issued while an earlier write is still
    /// synchronizing.
    fn read_counter(&self) -> u32 {
        self.wait_sync();
        self.request_read();
        self.wait_sync();
        self.count()
    }

    /// Performs a synchronized write of the comparator
    fn write_comparator(&self, value: u32) {
        self.wait_sync();
        self.write_comp0(value);
    }

    /// Reads the interrupt flags and clears exactly the ones that were set
    fn take_interrupt_flags(&self) -> InterruptFlags {
        let status = self.interrupt_flags();
        self.clear_interrupt_flags(status);
        status
    }
}
