//! # Simulated Board
//!
//! Wires a [`SystemTimer`] to the fake RTC, NVIC and clocks and plays the
//! part of the CPU: it moves time forward and takes the counter interrupt
//! whenever the hardware would.

use core::cell::Cell;

use hal::InterruptController;
use hal_sam0::{FakeClocks, FakeNvic, FakeRtc};
use sys_clock::{SystemTimer, TimerConfig, TimerCore, TimerError, TimerStatus};

use crate::kernel::RecordingKernel;

/// The driver as it runs on the simulated board
pub type SimTimer<M> = SystemTimer<M, FakeRtc, FakeNvic, FakeClocks, RecordingKernel>;

/// Deterministic board running one timer core
///
/// # Examples
///
/// ```
/// use sim_clock::{SimBoard, SimConfig};
/// use sys_clock::TicklessCore;
///
/// let board = SimBoard::<TicklessCore<SimConfig>>::boot().unwrap();
/// board.set_timeout(5, false);
/// board.advance(50);
///
/// assert_eq!(board.kernel().announces(), vec![5]);
/// ```
pub struct SimBoard<M> {
    timer: SimTimer<M>,
    cycles: Cell<u64>,
    interrupts: Cell<u64>,
}

impl<M: TimerCore + Default> SimBoard<M> {
    /// Creates a board with the timer still uninitialized
    pub fn new() -> Self {
        Self::with_rtc(FakeRtc::new())
    }

    /// Creates a board around a specific fake RTC
    pub fn with_rtc(rtc: FakeRtc) -> Self {
        Self {
            timer: SystemTimer::new(
                M::default(),
                rtc,
                FakeNvic::new(),
                FakeClocks::new(),
                RecordingKernel::new(),
            ),
            cycles: Cell::new(0),
            interrupts: Cell::new(0),
        }
    }

    /// Creates a board and brings the timer up
    pub fn boot() -> Result<Self, TimerError> {
        let board = Self::new();
        board.timer.init()?;
        Ok(board)
    }
}

impl<M: TimerCore + Default> Default for SimBoard<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TimerCore> SimBoard<M> {
    /// The driver under test
    pub fn timer(&self) -> &SimTimer<M> {
        &self.timer
    }

    /// The fake counter
    pub fn rtc(&self) -> &FakeRtc {
        self.timer.rtc()
    }

    /// The fake interrupt controller
    pub fn nvic(&self) -> &FakeNvic {
        self.timer.irq()
    }

    /// The recording kernel
    pub fn kernel(&self) -> &RecordingKernel {
        self.timer.kernel()
    }

    /// Counter cycles simulated so far
    pub fn now(&self) -> u64 {
        self.cycles.get()
    }

    /// Counter interrupts taken so far
    pub fn interrupts_taken(&self) -> u64 {
        self.interrupts.get()
    }

    /// `set_timeout`, followed by any interrupt it forced
    pub fn set_timeout(&self, ticks: i32, idle: bool) {
        self.timer.set_timeout(ticks, idle);
        self.dispatch();
    }

    /// `query_elapsed` on the driver
    pub fn query_elapsed(&self) -> u32 {
        self.timer.query_elapsed()
    }

    /// `idle_exit_notify` on the driver
    pub fn idle_exit_notify(&self) {
        self.timer.idle_exit_notify();
    }

    /// Diagnostic snapshot of the driver
    pub fn status(&self) -> TimerStatus {
        self.timer.status()
    }

    /// Lets `cycles` counter cycles pass
    ///
    /// Time moves one counter event at a time so that every match and
    /// overflow gets its own interrupt, as it would on hardware with the
    /// line unmasked.
    pub fn advance(&self, cycles: u64) {
        let mut left = cycles;
        while left > 0 {
            let step = match self.rtc().cycles_until_event() {
                Some(next) => left.min(next),
                None => left,
            };
            self.rtc().advance(step);
            self.cycles.set(self.cycles.get() + step);
            left -= step;
            self.dispatch();
        }
    }

    /// Lets `ticks` whole ticks pass
    pub fn advance_ticks(&self, ticks: u64) {
        self.advance(ticks * u64::from(M::Config::CYCLES_PER_TICK));
    }

    /// Advances event by event until the kernel hears an announce
    ///
    /// Returns the cycles waited, or `None` if `limit` cycles passed in
    /// silence.
    pub fn run_until_announce(&self, limit: u64) -> Option<u64> {
        let start = self.now();
        let before = self.kernel().announce_count();

        while self.now() - start < limit {
            let left = limit - (self.now() - start);
            let step = match self.rtc().cycles_until_event() {
                Some(next) => left.min(next),
                None => return None,
            };
            self.advance(step);
            if self.kernel().announce_count() > before {
                return Some(self.now() - start);
            }
        }
        None
    }

    /// Takes the counter interrupt for as long as the NVIC would
    ///
    /// Returns the number of times the handler ran.
    pub fn dispatch(&self) -> u32 {
        let line = M::Config::RTC_IRQ;
        let mut taken = 0;

        loop {
            if self.rtc().irq_asserted() && !self.nvic().is_pending(line) {
                self.nvic().set_pending(line);
            }
            if !self.nvic().take_pending(line) {
                break;
            }
            self.timer.on_interrupt();
            taken += 1;
        }

        if taken > 0 {
            log::trace!("took {} timer interrupt(s) at cycle {}", taken, self.now());
        }
        self.interrupts.set(self.interrupts.get() + u64::from(taken));
        taken
    }
}
