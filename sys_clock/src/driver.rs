//! # System Timer Driver
//!
//! Owns the counter peripheral and one [`TimerCore`], and exposes the
//! kernel-facing contract: `init`, `set_timeout`, `query_elapsed`,
//! `idle_exit_notify`, plus the interrupt entry point.
//!
//! ## Register protocol
//!
//! Writes to CTRL and COMP0 only take effect after the peripheral finishes
//! synchronizing, so every write that depends on an earlier one is preceded
//! by a sync wait. Bring-up always runs disable, reset, configure, enable
//! in that order.

use core::sync::atomic::{AtomicBool, Ordering};

use hal::{ClockControl, ControlFlags, InterruptController, InterruptFlags, RtcRegisters};

use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::kernel::KernelClock;
use crate::status::TimerStatus;
use crate::timer_core::TimerCore;

/// Upper bound on sync polls while waiting for the software reset
pub const RESET_POLLS: u32 = 100_000;

/// The kernel's tick source
///
/// One instance per system, typically a `static`:
///
/// ```ignore
/// static TIMER: SystemTimer<ActiveCore<Board>, Sam0Rtc, Nvic, Sam0Clocks, Kernel> =
///     SystemTimer::new(ActiveCore::new(), rtc, nvic, clocks, Kernel);
///
/// #[interrupt]
/// fn RTC() {
///     TIMER.on_interrupt();
/// }
/// ```
pub struct SystemTimer<M, R, I, G, K> {
    core: M,
    rtc: R,
    irq: I,
    clocks: G,
    kernel: K,
    initialized: AtomicBool,
}

impl<M, R, I, G, K> SystemTimer<M, R, I, G, K>
where
    M: TimerCore,
    R: RtcRegisters,
    I: InterruptController,
    G: ClockControl,
    K: KernelClock,
{
    /// Assembles the driver; nothing touches the hardware until `init`
    pub const fn new(core: M, rtc: R, irq: I, clocks: G, kernel: K) -> Self {
        Self {
            core,
            rtc,
            irq,
            clocks,
            kernel,
            initialized: AtomicBool::new(false),
        }
    }

    /// Brings the counter up in the core's mode
    ///
    /// Must run once, before any other call.
    pub fn init(&self) -> Result<(), TimerError> {
        if self.initialized.load(Ordering::Acquire) {
            return Err(TimerError::AlreadyInitialized);
        }

        let line = M::Config::RTC_IRQ;

        self.clocks.enable_bus_clock();
        self.clocks.route_generator(M::Config::CLOCK_GENERATOR)?;

        self.reset()?;
        self.core.reset_state();

        // 32-bit counter, prescaler 1, plus the mode's own bits.
        self.rtc.wait_sync();
        self.rtc.write_ctrl(M::CONTROL);

        self.irq.clear_pending(line);
        self.irq.connect(line, M::Config::RTC_IRQ_PRIORITY)?;
        self.irq.enable(line);

        self.core.configure(&self.rtc);

        self.rtc.wait_sync();
        self.rtc
            .write_ctrl(self.rtc.read_ctrl() | ControlFlags::ENABLE);

        self.initialized.store(true, Ordering::Release);
        log::info!(
            "system timer up: {:?} mode, {} cycles/tick, max {} ticks",
            M::MODE,
            M::Config::CYCLES_PER_TICK,
            M::Config::MAX_TICKS
        );
        Ok(())
    }

    /// Returns the counter to its hardware defaults
    fn reset(&self) -> Result<(), TimerError> {
        self.rtc.wait_sync();

        self.rtc.disable_interrupts(InterruptFlags::all());
        self.rtc.clear_interrupt_flags(InterruptFlags::all());

        self.rtc
            .write_ctrl(self.rtc.read_ctrl() - ControlFlags::ENABLE);
        self.rtc.wait_sync();

        self.rtc
            .write_ctrl(self.rtc.read_ctrl() | ControlFlags::SWRST);

        for _ in 0..RESET_POLLS {
            if !self.rtc.sync_busy() && !self.rtc.read_ctrl().contains(ControlFlags::SWRST) {
                return Ok(());
            }
            core::hint::spin_loop();
        }

        log::debug!("software reset still pending after {} polls", RESET_POLLS);
        Err(TimerError::ResetTimeout)
    }

    /// Requests an announce `ticks` ticks after the last one
    ///
    /// Negative means wait forever, zero completes immediately.
    pub fn set_timeout(&self, ticks: i32, idle: bool) {
        debug_assert!(self.is_initialized(), "set_timeout before init");
        self.core.set_timeout(&self.rtc, &self.irq, ticks, idle);
    }

    /// Ticks elapsed but not yet announced; never blocks
    pub fn query_elapsed(&self) -> u32 {
        debug_assert!(self.is_initialized(), "query_elapsed before init");
        self.core.query_elapsed(&self.rtc)
    }

    /// Hook for the kernel's idle exit
    pub fn idle_exit_notify(&self) {
        self.core.idle_exit_notify();
    }

    /// Interrupt entry point
    ///
    /// Reads and acknowledges the counter's flags, then lets the core
    /// decide what to announce. An empty flag set means the line was forced
    /// pending by `set_timeout`.
    pub fn on_interrupt(&self) {
        let status = self.rtc.take_interrupt_flags();
        log::trace!("timer interrupt, flags {:?}", status);
        self.core.on_interrupt(status, &self.rtc, &self.kernel);
    }

    /// The kernel's nominal tick count expressed in counter cycles,
    /// truncated to 32 bits
    pub fn cycle_get_32(&self) -> u32 {
        (self.kernel.tick_get() as u32).wrapping_mul(M::Config::CYCLES_PER_TICK)
    }

    /// Best-effort diagnostic snapshot
    pub fn status(&self) -> TimerStatus {
        let initialized = self.is_initialized();
        let state = self.core.state();
        let elapsed_ticks = if initialized {
            self.core.query_elapsed(&self.rtc)
        } else {
            0
        };

        TimerStatus {
            mode: M::MODE,
            cycles_per_tick: M::Config::CYCLES_PER_TICK,
            max_ticks: M::Config::MAX_TICKS,
            last_mark: state.last_mark,
            tick_counter: state.tick_counter,
            pending_target: state.pending_target,
            elapsed_ticks,
            initialized,
        }
    }

    /// Returns whether `init` completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The timer core
    pub fn core(&self) -> &M {
        &self.core
    }

    /// The counter peripheral
    pub fn rtc(&self) -> &R {
        &self.rtc
    }

    /// The interrupt controller
    pub fn irq(&self) -> &I {
        &self.irq
    }

    /// The clock controller
    pub fn clocks(&self) -> &G {
        &self.clocks
    }

    /// The kernel side
    pub fn kernel(&self) -> &K {
        &self.kernel
    }
}
