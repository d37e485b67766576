//! Board configurations for simulation

use hal::IrqNumber;
use sys_clock::TimerConfig;

/// Ten cycles per tick, small enough to follow by hand
#[derive(Debug, Clone, Copy, Default)]
pub struct SimConfig;

impl TimerConfig for SimConfig {
    const HW_CYCLES_PER_SEC: u32 = 1_000;
    const TICKS_PER_SEC: u32 = 100;
    const RTC_IRQ: IrqNumber = hal_sam0::RTC_IRQ;
    const RTC_IRQ_PRIORITY: u8 = 0;
    const CLOCK_GENERATOR: u8 = 2;
}

/// A SAM D21 clocked from the 32.768 kHz crystal at 100 ticks per second
///
/// 327 cycles per tick, so the tick grid does not divide the counter range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sam0Board;

impl TimerConfig for Sam0Board {
    const HW_CYCLES_PER_SEC: u32 = 32_768;
    const TICKS_PER_SEC: u32 = 100;
    const RTC_IRQ: IrqNumber = hal_sam0::RTC_IRQ;
    const RTC_IRQ_PRIORITY: u8 = 0;
    const CLOCK_GENERATOR: u8 = 2;
}
