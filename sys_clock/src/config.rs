//! Build-time timer configuration
//!
//! Everything here is a compile-time constant: the core never decides its
//! own rates, it only derives the tick arithmetic bounds from them.

use hal::IrqNumber;

/// Minimum comparator lead in cycles.
///
/// A comparator write takes about six RTC_GCLK cycles to synchronize; a
/// target closer than this may already have passed when the write lands.
pub const TICK_THRESHOLD: u32 = 7;

/// Largest tick count whose cycle distance cannot overflow 32 bits, even
/// after adding the phase term and rounding up.
pub const fn max_ticks(cycles_per_tick: u32) -> u32 {
    (u32::MAX / cycles_per_tick).saturating_sub(2)
}

/// Timer configuration constants
///
/// Implemented by a zero-sized type per board, e.g.
///
/// ```
/// use sys_clock::TimerConfig;
///
/// struct Board;
///
/// impl TimerConfig for Board {
///     const HW_CYCLES_PER_SEC: u32 = 32_768;
///     const TICKS_PER_SEC: u32 = 128;
///     const RTC_IRQ: u16 = 3;
///     const RTC_IRQ_PRIORITY: u8 = 0;
///     const CLOCK_GENERATOR: u8 = 2;
/// }
///
/// assert_eq!(Board::CYCLES_PER_TICK, 256);
/// assert_eq!(Board::MAX_TICKS, 16_777_213);
/// ```
pub trait TimerConfig {
    /// Counter input frequency
    const HW_CYCLES_PER_SEC: u32;
    /// Kernel tick rate
    const TICKS_PER_SEC: u32;
    /// Interrupt line of the counter
    const RTC_IRQ: IrqNumber;
    /// Priority of that line
    const RTC_IRQ_PRIORITY: u8;
    /// Clock generator feeding the counter
    const CLOCK_GENERATOR: u8;

    /// Counter cycles per kernel tick
    const CYCLES_PER_TICK: u32 = Self::HW_CYCLES_PER_SEC / Self::TICKS_PER_SEC;
    /// Longest representable wait in ticks
    const MAX_TICKS: u32 = max_ticks(Self::CYCLES_PER_TICK);
}
