//! # Timer Core Contract
//!
//! The capability both operating modes implement.
//!
//! ## Philosophy
//!
//! **One contract, two state machines, chosen at build time.**
//!
//! A tickless core lets the counter run forever and moves a comparator; a
//! periodic core takes an interrupt every tick and counts in software.
//! Neither knows about the other, and the driver frame around them
//! ([`crate::SystemTimer`]) is identical for both.
//!
//! ## Shared state
//!
//! Cores hold their state in atomics and are only ever touched through
//! `&self`: once from normal context (set-timeout, query-elapsed) and once
//! from the counter's interrupt. Only plain loads and stores are used,
//! since Cortex-M0+ has no read-modify-write atomics; read-modify-write
//! sequences that race with the interrupt run under an
//! [`IrqGuard`](crate::IrqGuard).

use hal::{ControlFlags, InterruptController, InterruptFlags, RtcRegisters};
use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::kernel::KernelClock;

/// Operating mode of a timer core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerMode {
    /// Free-running counter, comparator reprogrammed per timeout
    Tickless,
    /// Counter cleared every tick, ticks counted in software
    Periodic,
}

/// Software state of a core at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreState {
    /// Counter value (tickless) or tick count (periodic) of the last announce
    pub last_mark: u32,
    /// Software tick counter (periodic only)
    pub tick_counter: Option<u32>,
    /// Tick count of the next announce (periodic only)
    pub pending_target: Option<u32>,
}

/// A tick source state machine
pub trait TimerCore {
    /// Rates, line and limits this core was built for
    type Config: TimerConfig;

    /// Which mode this core implements
    const MODE: TimerMode;

    /// Control bits on top of 32-bit counter mode with no prescaler
    const CONTROL: ControlFlags;

    /// Zeroes the software state; called once from init
    fn reset_state(&self);

    /// Programs the mode-specific comparator and interrupt source
    ///
    /// Called from init after the control register is written and before
    /// the counter is enabled.
    fn configure<R: RtcRegisters>(&self, rtc: &R);

    /// Requests an announce `ticks` ticks after the last one
    ///
    /// Negative means "forever". Zero (or anything too close to act on)
    /// completes immediately by forcing the interrupt.
    fn set_timeout<R, I>(&self, rtc: &R, irq: &I, ticks: i32, idle: bool)
    where
        R: RtcRegisters,
        I: InterruptController;

    /// Ticks elapsed but not yet announced
    ///
    /// A best-effort snapshot: racing exactly with the interrupt's mark
    /// update may be off by the ticks being announced, which the next
    /// announce corrects.
    fn query_elapsed<R: RtcRegisters>(&self, rtc: &R) -> u32;

    /// Called by the kernel when leaving idle
    ///
    /// All bookkeeping happens in the interrupt handler, so the default
    /// does nothing.
    fn idle_exit_notify(&self) {}

    /// Mode-specific half of the interrupt handler
    ///
    /// `status` holds the flags the handler read (and cleared) on entry;
    /// empty means the interrupt was forced through the controller.
    fn on_interrupt<R, K>(&self, status: InterruptFlags, rtc: &R, kernel: &K)
    where
        R: RtcRegisters,
        K: KernelClock;

    /// Current software state
    fn state(&self) -> CoreState;
}
