//! Timing Test Utilities
//!
//! Shared helpers for the end-to-end timer tests.
//!
//! ## Test Philosophy
//!
//! - **Exactly one announce per timeout**: a request completes once, never
//!   per tick
//! - **Never early**: an announce lands on or after the requested tick
//!   boundary
//! - **Wrap-agnostic**: every delta is computed modulo 2^32
//! - **Protocol-clean**: the fake counter records no synchronization
//!   violation over a whole run

use hal::IrqNumber;
use sim_clock::{SimBoard, SimConfig};
use sys_clock::{PeriodicCore, TicklessCore, TimerConfig, TimerError};

/// Simulated board running the tickless core
pub type TicklessBoard<C = SimConfig> = SimBoard<TicklessCore<C>>;

/// Simulated board running the periodic core
pub type PeriodicBoard<C = SimConfig> = SimBoard<PeriodicCore<C>>;

/// Two cycles per tick: every one-tick wait is inside the comparator lead
/// time
#[derive(Debug, Clone, Copy, Default)]
pub struct TinyConfig;

impl TimerConfig for TinyConfig {
    const HW_CYCLES_PER_SEC: u32 = 200;
    const TICKS_PER_SEC: u32 = 100;
    const RTC_IRQ: IrqNumber = hal_sam0::RTC_IRQ;
    const RTC_IRQ_PRIORITY: u8 = 0;
    const CLOCK_GENERATOR: u8 = 2;
}

/// Boots a tickless board with the given configuration
pub fn boot_tickless<C: TimerConfig>() -> Result<TicklessBoard<C>, TimerError> {
    SimBoard::boot()
}

/// Boots a periodic board with the given configuration
pub fn boot_periodic<C: TimerConfig>() -> Result<PeriodicBoard<C>, TimerError> {
    SimBoard::boot()
}

/// Ticks announced by a tickless wait of `ticks`, given the cycles since
/// the last announce when the wait was requested
///
/// Whole ticks already elapsed are reported too, and a partial tick rounds
/// the wait up to the next boundary.
pub fn expected_tickless_announce<C: TimerConfig>(ticks: u32, cycles_since_mark: u32) -> u32 {
    let cycles_per_tick = C::CYCLES_PER_TICK;
    let elapsed = cycles_since_mark / cycles_per_tick;
    let partial = u32::from(cycles_since_mark % cycles_per_tick != 0);
    elapsed + ticks + partial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_tickless_announce() {
        assert_eq!(expected_tickless_announce::<SimConfig>(5, 0), 5);
        assert_eq!(expected_tickless_announce::<SimConfig>(5, 3), 6);
        assert_eq!(expected_tickless_announce::<SimConfig>(5, 23), 8);
        assert_eq!(expected_tickless_announce::<SimConfig>(0, 20), 2);
    }
}
