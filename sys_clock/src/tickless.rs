//! # Tickless Core
//!
//! The counter runs continuously and is never reset. Before every wait the
//! kernel asks for, the comparator is moved to the exact tick boundary at
//! which the wait ends; the interrupt then announces however many whole
//! ticks the counter has advanced since the previous announce.
//!
//! ## Arithmetic
//!
//! All cycle arithmetic is modulo 2^32: `count - last` is the number of
//! cycles since the last announce for any pair of values, so the 32-bit
//! wrap needs no special case. Requests are clamped to
//! [`TimerConfig::MAX_TICKS`] so the cycle distance itself never wraps.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};

use hal::{ControlFlags, InterruptController, InterruptFlags, RtcRegisters};

use crate::config::{TimerConfig, TICK_THRESHOLD};
use crate::kernel::KernelClock;
use crate::timer_core::{CoreState, TimerCore, TimerMode};

/// Free-running counter with comparator wakeups
pub struct TicklessCore<C: TimerConfig> {
    /// Counter value at the last announce
    last: AtomicU32,
    _config: PhantomData<fn() -> C>,
}

impl<C: TimerConfig> TicklessCore<C> {
    const VALID: () = assert!(C::CYCLES_PER_TICK >= 1, "a tick must span at least one cycle");

    /// Creates a core with its mark at zero
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            last: AtomicU32::new(0),
            _config: PhantomData,
        }
    }

    /// Maps "forever" (negative) and oversized requests to the longest
    /// representable wait
    pub fn clamp_ticks(ticks: i32) -> u32 {
        match u32::try_from(ticks) {
            Ok(ticks) if ticks <= C::MAX_TICKS => ticks,
            _ => C::MAX_TICKS,
        }
    }

    /// Cycles from `count` to the comparator target for a wait of `ticks`
    ///
    /// The phase term re-aligns the target with the tick grid of the last
    /// announce, and the result is rounded up to a whole number of ticks so
    /// the comparator never fires early. `ticks` must already be clamped.
    pub fn timeout_cycles(ticks: u32, count: u32, last: u32) -> u32 {
        let cycles_per_tick = C::CYCLES_PER_TICK;
        let timeout = ticks * cycles_per_tick + count.wrapping_sub(last) % cycles_per_tick;
        (timeout + cycles_per_tick - 1) / cycles_per_tick * cycles_per_tick
    }
}

impl<C: TimerConfig> Default for TicklessCore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimerConfig> TimerCore for TicklessCore<C> {
    type Config = C;

    const MODE: TimerMode = TimerMode::Tickless;

    // Overflow is ignored: the counter is allowed to wrap.
    const CONTROL: ControlFlags = ControlFlags::empty();

    fn reset_state(&self) {
        self.last.store(0, Ordering::Relaxed);
    }

    fn configure<R: RtcRegisters>(&self, rtc: &R) {
        rtc.enable_interrupts(InterruptFlags::CMP0);
    }

    fn set_timeout<R, I>(&self, rtc: &R, irq: &I, ticks: i32, _idle: bool)
    where
        R: RtcRegisters,
        I: InterruptController,
    {
        let clamped = Self::clamp_ticks(ticks);
        if i64::from(clamped) != i64::from(ticks) {
            log::trace!("timeout of {} ticks clamped to {}", ticks, clamped);
        }

        let count = rtc.read_counter();
        let timeout = Self::timeout_cycles(clamped, count, self.last.load(Ordering::Relaxed));

        if timeout < TICK_THRESHOLD {
            log::trace!("timeout of {} cycles is below the threshold, firing now", timeout);
            irq.set_pending(C::RTC_IRQ);
            return;
        }

        rtc.write_comparator(count.wrapping_add(timeout));
    }

    fn query_elapsed<R: RtcRegisters>(&self, rtc: &R) -> u32 {
        let count = rtc.read_counter();
        count.wrapping_sub(self.last.load(Ordering::Relaxed)) / C::CYCLES_PER_TICK
    }

    fn on_interrupt<R, K>(&self, _status: InterruptFlags, rtc: &R, kernel: &K)
    where
        R: RtcRegisters,
        K: KernelClock,
    {
        let count = rtc.read_counter();
        let last = self.last.load(Ordering::Relaxed);

        if count == last {
            // Forced with no time passed: still complete the request.
            kernel.announce(0);
            return;
        }

        // Move the mark first so a set-timeout issued from inside the
        // announce already measures from here.
        self.last.store(count, Ordering::Relaxed);
        kernel.announce(count.wrapping_sub(last) / C::CYCLES_PER_TICK);
    }

    fn state(&self) -> CoreState {
        CoreState {
            last_mark: self.last.load(Ordering::Relaxed),
            tick_counter: None,
            pending_target: None,
        }
    }
}
