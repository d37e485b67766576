//! # Periodic Core
//!
//! The counter is cleared by hardware every `CYCLES_PER_TICK` cycles and
//! interrupts once per tick. Ticks are counted in software; an announce is
//! made only when the count reaches the target set by the last timeout
//! request.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use hal::{ControlFlags, InterruptController, InterruptFlags, RtcRegisters};

use crate::config::TimerConfig;
use crate::kernel::KernelClock;
use crate::lock::IrqGuard;
use crate::timer_core::{CoreState, TimerCore, TimerMode};

/// Interrupt-per-tick counting core
pub struct PeriodicCore<C: TimerConfig> {
    /// Tick count at the last announce
    last: AtomicU32,
    /// Ticks taken since init; written only by the interrupt handler
    counter: AtomicU32,
    /// Tick count at which the next announce fires
    target: AtomicU32,
    /// Set by a zero-tick request until the handler completes it
    forced: AtomicBool,
    _config: PhantomData<fn() -> C>,
}

impl<C: TimerConfig> PeriodicCore<C> {
    // With COMP0 < 2, MATCHCLR and no prescaler the RTC never raises a match.
    const VALID: () = assert!(
        C::CYCLES_PER_TICK >= 2,
        "periodic mode needs at least two cycles per tick"
    );

    /// Creates a core with every count at zero
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID;
        Self {
            last: AtomicU32::new(0),
            counter: AtomicU32::new(0),
            target: AtomicU32::new(0),
            forced: AtomicBool::new(false),
            _config: PhantomData,
        }
    }
}

impl<C: TimerConfig> Default for PeriodicCore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimerConfig> TimerCore for PeriodicCore<C> {
    type Config = C;

    const MODE: TimerMode = TimerMode::Periodic;

    const CONTROL: ControlFlags = ControlFlags::MATCHCLR;

    fn reset_state(&self) {
        self.last.store(0, Ordering::Relaxed);
        self.counter.store(0, Ordering::Relaxed);
        self.target.store(0, Ordering::Relaxed);
        self.forced.store(false, Ordering::Relaxed);
    }

    fn configure<R: RtcRegisters>(&self, rtc: &R) {
        rtc.write_comparator(C::CYCLES_PER_TICK);
        rtc.enable_interrupts(InterruptFlags::OVF);
    }

    fn set_timeout<R, I>(&self, _rtc: &R, irq: &I, ticks: i32, _idle: bool)
    where
        R: RtcRegisters,
        I: InterruptController,
    {
        if ticks == 0 {
            // A latched tick may be what runs the handler, so the request
            // cannot be recognised from the status flags alone.
            self.forced.store(true, Ordering::Relaxed);
            irq.set_pending(C::RTC_IRQ);
            return;
        }

        let _guard = IrqGuard::new(irq, C::RTC_IRQ);
        let counter = self.counter.load(Ordering::Relaxed);

        if ticks < 0 {
            // The next tick moves the counter past the target, which is
            // then only reached again after a full 32-bit wrap.
            log::trace!("waiting forever from tick {}", counter);
            self.target.store(counter, Ordering::Relaxed);
            return;
        }

        self.target
            .store(counter.wrapping_add(ticks.unsigned_abs()), Ordering::Relaxed);
    }

    fn query_elapsed<R: RtcRegisters>(&self, _rtc: &R) -> u32 {
        self.counter
            .load(Ordering::Relaxed)
            .wrapping_sub(self.last.load(Ordering::Relaxed))
    }

    fn on_interrupt<R, K>(&self, status: InterruptFlags, _rtc: &R, kernel: &K)
    where
        R: RtcRegisters,
        K: KernelClock,
    {
        // Load then store: normal context never runs inside the handler.
        let forced = self.forced.load(Ordering::Relaxed);
        if forced {
            self.forced.store(false, Ordering::Relaxed);
        }

        if !status.is_empty() {
            let counter = self.counter.load(Ordering::Relaxed).wrapping_add(1);
            self.counter.store(counter, Ordering::Relaxed);

            if counter == self.target.load(Ordering::Relaxed) {
                let last = self.last.load(Ordering::Relaxed);
                self.last.store(counter, Ordering::Relaxed);
                // Also completes a pending zero-tick request.
                kernel.announce(counter.wrapping_sub(last));
                return;
            }
        }

        if forced || status.is_empty() {
            kernel.announce(0);
        }
    }

    fn state(&self) -> CoreState {
        CoreState {
            last_mark: self.last.load(Ordering::Relaxed),
            tick_counter: Some(self.counter.load(Ordering::Relaxed)),
            pending_target: Some(self.target.load(Ordering::Relaxed)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{running_rtc, TestConfig, TestKernel};
    use hal_sam0::{FakeNvic, NvicOp};

    type Core = PeriodicCore<TestConfig>;

    const IRQ: u16 = <TestConfig as TimerConfig>::RTC_IRQ;

    fn tick(core: &Core, rtc: &hal_sam0::FakeRtc, kernel: &TestKernel, times: u32) {
        for _ in 0..times {
            core.on_interrupt(InterruptFlags::OVF, rtc, kernel);
        }
    }

    #[test]
    fn test_configure_preloads_period() {
        let rtc = running_rtc(Core::CONTROL);
        Core::new().configure(&rtc);

        assert_eq!(rtc.comparator(), 10);
        assert_eq!(rtc.enabled_interrupts(), InterruptFlags::OVF);
    }

    #[test]
    fn test_announces_once_at_target() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();

        core.set_timeout(&rtc, &nvic, 3, false);
        tick(&core, &rtc, &kernel, 2);
        assert!(kernel.announced().is_empty());
        assert_eq!(core.query_elapsed(&rtc), 2);

        tick(&core, &rtc, &kernel, 1);
        assert_eq!(kernel.announced(), vec![3]);
        assert_eq!(core.query_elapsed(&rtc), 0);

        tick(&core, &rtc, &kernel, 5);
        assert_eq!(kernel.announced(), vec![3]);
        assert_eq!(core.query_elapsed(&rtc), 5);
    }

    #[test]
    fn test_target_update_runs_with_tick_masked() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        nvic.enable(IRQ);
        let core = Core::new();

        nvic.clear_ops();
        core.set_timeout(&rtc, &nvic, 4, false);

        assert_eq!(nvic.ops(), vec![NvicOp::Mask(IRQ), NvicOp::Enable(IRQ)]);
        assert_eq!(core.state().pending_target, Some(4));
    }

    #[test]
    fn test_zero_forces_interrupt_and_announces_zero() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();
        tick(&core, &rtc, &kernel, 2);

        core.set_timeout(&rtc, &nvic, 0, false);
        assert!(nvic.is_pending(IRQ));

        core.on_interrupt(InterruptFlags::empty(), &rtc, &kernel);
        assert_eq!(kernel.announced(), vec![0]);
        // Forced interrupts leave the counts alone
        assert_eq!(core.state().tick_counter, Some(2));
        assert_eq!(core.state().last_mark, 0);
    }

    #[test]
    fn test_zero_request_completes_when_tick_runs_handler() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();
        core.set_timeout(&rtc, &nvic, -1, false);

        core.set_timeout(&rtc, &nvic, 0, false);
        // Tick flag already latched when the forced run happens
        core.on_interrupt(InterruptFlags::OVF, &rtc, &kernel);

        assert_eq!(kernel.announced(), vec![0]);
        assert_eq!(core.state().tick_counter, Some(1));

        // Completed once only
        tick(&core, &rtc, &kernel, 3);
        assert_eq!(kernel.announced(), vec![0]);
    }

    #[test]
    fn test_zero_request_merged_with_target_tick() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();

        core.set_timeout(&rtc, &nvic, 1, false);
        core.set_timeout(&rtc, &nvic, 0, false);
        core.on_interrupt(InterruptFlags::OVF, &rtc, &kernel);

        assert_eq!(kernel.announced(), vec![1]);

        tick(&core, &rtc, &kernel, 1);
        assert_eq!(kernel.announced(), vec![1]);
    }

    #[test]
    fn test_forever_suppresses_announces() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();

        core.set_timeout(&rtc, &nvic, -1, false);
        tick(&core, &rtc, &kernel, 1_000);
        assert!(kernel.announced().is_empty());
        assert_eq!(core.query_elapsed(&rtc), 1_000);

        core.set_timeout(&rtc, &nvic, 4, false);
        tick(&core, &rtc, &kernel, 4);
        assert_eq!(kernel.announced(), vec![1_004]);
    }

    #[test]
    fn test_target_wraps_with_counter() {
        let rtc = running_rtc(Core::CONTROL);
        let nvic = FakeNvic::new();
        let kernel = TestKernel::new();
        let core = Core::new();
        core.counter.store(u32::MAX - 1, Ordering::Relaxed);
        core.last.store(u32::MAX - 1, Ordering::Relaxed);

        core.set_timeout(&rtc, &nvic, 3, false);
        assert_eq!(core.state().pending_target, Some(1));

        tick(&core, &rtc, &kernel, 3);
        assert_eq!(kernel.announced(), vec![3]);
        assert_eq!(core.state().tick_counter, Some(1));
    }

    #[test]
    fn test_reset_state() {
        let rtc = running_rtc(Core::CONTROL);
        let kernel = TestKernel::new();
        let core = Core::new();
        tick(&core, &rtc, &kernel, 7);

        core.reset_state();
        assert_eq!(
            core.state(),
            CoreState {
                last_mark: 0,
                tick_counter: Some(0),
                pending_target: Some(0),
            }
        );
    }
}
