//! Deterministic fakes for the SAM0 timer peripherals
//!
//! These devices let the driver run on the host. Time only moves when a test
//! calls [`FakeRtc::advance`], every register access is captured for
//! verification, and misuse of the synchronization protocol is recorded
//! instead of silently producing stale values.
//!
//! ## Counter model
//!
//! - The counter only runs while CTRL.ENABLE is set
//! - Free-running mode: COUNT wraps at 2^32, CMP0 is raised when COUNT
//!   becomes equal to COMP0, OVF on wrap
//! - Match-clear mode: COUNT clears to zero when it reaches COMP0 and both
//!   CMP0 and OVF are raised; with COMP0 == 0 no match is ever generated
//! - Synchronized accesses (CTRL and COMP0 writes, read requests) keep
//!   STATUS.SYNCBUSY set for a fixed number of polls

use core::cell::{Cell, RefCell};

use hal::{
    ClockControl, ClockError, ControlFlags, InterruptController, InterruptError,
    InterruptFlags, IrqNumber, RtcRegisters,
};

/// Number of sync-busy polls a synchronized access takes by default
pub const DEFAULT_SYNC_POLLS: u32 = 6;

const FULL_RANGE: u64 = 1 << 32;

/// One captured register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegAccess {
    /// A sync-busy poll observed the peripheral idle
    SyncIdle,
    ReadCtrl,
    WriteCtrl(ControlFlags),
    ReadRequest,
    ReadCount(u32),
    WriteComp0(u32),
    ReadFlags(InterruptFlags),
    ClearFlags(InterruptFlags),
    EnableInterrupts(InterruptFlags),
    DisableInterrupts(InterruptFlags),
}

/// A synchronization protocol violation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncViolation {
    /// A synchronized register was written while a sync was in flight
    WriteWhileBusy,
    /// COUNT was read without a completed read request
    StaleCount,
    /// SWRST was set while the peripheral was still enabled
    ResetWhileEnabled,
    /// Enable-protected CTRL fields changed while enabled
    ConfigWhileEnabled,
}

/// Simulated SAM0 RTC in mode 0
#[derive(Debug)]
pub struct FakeRtc {
    count: Cell<u32>,
    comp0: Cell<u32>,
    ctrl: Cell<ControlFlags>,
    intenset: Cell<InterruptFlags>,
    intflag: Cell<InterruptFlags>,
    sync_polls: u32,
    busy: Cell<u32>,
    count_synced: Cell<bool>,
    read_pending: Cell<bool>,
    reset_pending: Cell<bool>,
    reset_stuck: bool,
    accesses: RefCell<Vec<RegAccess>>,
    violations: RefCell<Vec<SyncViolation>>,
}

impl FakeRtc {
    /// Creates a fake RTC in its hardware reset state
    pub fn new() -> Self {
        Self::with_sync_polls(DEFAULT_SYNC_POLLS)
    }

    /// Creates a fake RTC whose syncs take `polls` busy polls
    pub fn with_sync_polls(polls: u32) -> Self {
        Self {
            count: Cell::new(0),
            comp0: Cell::new(0),
            ctrl: Cell::new(ControlFlags::empty()),
            intenset: Cell::new(InterruptFlags::empty()),
            intflag: Cell::new(InterruptFlags::empty()),
            sync_polls: polls,
            busy: Cell::new(0),
            count_synced: Cell::new(false),
            read_pending: Cell::new(false),
            reset_pending: Cell::new(false),
            reset_stuck: false,
            accesses: RefCell::new(Vec::new()),
            violations: RefCell::new(Vec::new()),
        }
    }

    /// Creates a fake RTC whose software reset never completes
    pub fn with_stuck_reset() -> Self {
        Self {
            reset_stuck: true,
            ..Self::new()
        }
    }

    /// Returns true while the counter is counting
    pub fn running(&self) -> bool {
        self.ctrl.get().contains(ControlFlags::ENABLE) && !self.reset_pending.get()
    }

    /// Returns true while an enabled interrupt source has its flag set
    pub fn irq_asserted(&self) -> bool {
        self.intflag.get().intersects(self.intenset.get())
    }

    /// Current counter value, without going through the sync protocol
    pub fn current_count(&self) -> u32 {
        self.count.get()
    }

    /// Jumps the counter to `value` (test hook, e.g. to sit near a wrap)
    pub fn set_count(&self, value: u32) {
        self.count.set(value);
    }

    /// Current compare 0 value
    pub fn comparator(&self) -> u32 {
        self.comp0.get()
    }

    /// Current control register value
    pub fn ctrl(&self) -> ControlFlags {
        self.ctrl.get()
    }

    /// Currently enabled interrupt sources
    pub fn enabled_interrupts(&self) -> InterruptFlags {
        self.intenset.get()
    }

    /// Currently raised interrupt flags
    pub fn raised_flags(&self) -> InterruptFlags {
        self.intflag.get()
    }

    /// Returns all captured register accesses
    pub fn accesses(&self) -> Vec<RegAccess> {
        self.accesses.borrow().clone()
    }

    /// Clears captured register accesses
    pub fn clear_accesses(&self) {
        self.accesses.borrow_mut().clear();
    }

    /// Returns every recorded protocol violation
    pub fn violations(&self) -> Vec<SyncViolation> {
        self.violations.borrow().clone()
    }

    /// Cycles until the next counter event, or `None` if no event can occur
    pub fn cycles_until_event(&self) -> Option<u64> {
        if !self.running() {
            return None;
        }
        let count = self.count.get();
        let comp = self.comp0.get();
        let to_match = match comp.wrapping_sub(count) {
            0 => FULL_RANGE,
            distance => u64::from(distance),
        };

        if self.ctrl.get().contains(ControlFlags::MATCHCLR) {
            if comp == 0 {
                return None;
            }
            Some(to_match)
        } else {
            Some(to_match.min(FULL_RANGE - u64::from(count)))
        }
    }

    /// Lets `cycles` counter cycles pass
    ///
    /// Flags are sticky, so advancing across several events in one call
    /// merges their flags just as a masked interrupt would.
    pub fn advance(&self, cycles: u64) {
        let mut left = cycles;
        while left > 0 {
            let Some(next) = self.cycles_until_event() else {
                return;
            };
            let step = left.min(next);
            self.step(step, step == next);
            left -= step;
        }
    }

    fn step(&self, cycles: u64, reaches_event: bool) {
        let count = u64::from(self.count.get()) + cycles;
        let comp = self.comp0.get();

        if self.ctrl.get().contains(ControlFlags::MATCHCLR) {
            if reaches_event {
                self.count.set(0);
                self.raise(InterruptFlags::CMP0 | InterruptFlags::OVF);
            } else {
                self.count.set(count as u32);
            }
            return;
        }

        let wrapped = count as u32;
        if reaches_event && wrapped == comp {
            self.raise(InterruptFlags::CMP0);
        }
        if count >= FULL_RANGE {
            self.raise(InterruptFlags::OVF);
        }
        self.count.set(wrapped);
    }

    fn raise(&self, flags: InterruptFlags) {
        self.intflag.set(self.intflag.get() | flags);
    }

    fn log(&self, access: RegAccess) {
        self.accesses.borrow_mut().push(access);
    }

    fn violation(&self, violation: SyncViolation) {
        self.violations.borrow_mut().push(violation);
    }

    fn start_sync(&self) {
        if self.busy.get() > 0 {
            self.violation(SyncViolation::WriteWhileBusy);
        }
        self.busy.set(self.sync_polls.max(1));
    }

    fn finish_sync(&self) {
        if self.read_pending.replace(false) {
            self.count_synced.set(true);
        }
        if self.reset_pending.get() {
            if self.reset_stuck {
                self.busy.set(u32::MAX);
                return;
            }
            self.reset_pending.set(false);
            self.apply_reset();
        }
    }

    fn apply_reset(&self) {
        self.count.set(0);
        self.comp0.set(0);
        self.ctrl.set(ControlFlags::empty());
        self.intenset.set(InterruptFlags::empty());
        self.intflag.set(InterruptFlags::empty());
    }
}

impl Default for FakeRtc {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcRegisters for FakeRtc {
    fn sync_busy(&self) -> bool {
        let busy = self.busy.get();
        if busy == 0 {
            self.log(RegAccess::SyncIdle);
            return false;
        }
        self.busy.set(busy - 1);
        if busy == 1 {
            self.finish_sync();
        }
        true
    }

    fn read_ctrl(&self) -> ControlFlags {
        self.log(RegAccess::ReadCtrl);
        if self.reset_pending.get() {
            return self.ctrl.get() | ControlFlags::SWRST;
        }
        self.ctrl.get()
    }

    fn write_ctrl(&self, ctrl: ControlFlags) {
        self.log(RegAccess::WriteCtrl(ctrl));
        self.start_sync();

        let current = self.ctrl.get();
        if ctrl.contains(ControlFlags::SWRST) {
            if current.contains(ControlFlags::ENABLE) {
                self.violation(SyncViolation::ResetWhileEnabled);
            }
            self.reset_pending.set(true);
            self.ctrl.set(ctrl - ControlFlags::SWRST);
            return;
        }

        let protected = ControlFlags::MODE | ControlFlags::PRESCALER | ControlFlags::MATCHCLR;
        if current.contains(ControlFlags::ENABLE)
            && ctrl.contains(ControlFlags::ENABLE)
            && (current & protected) != (ctrl & protected)
        {
            self.violation(SyncViolation::ConfigWhileEnabled);
        }
        self.ctrl.set(ctrl);
    }

    fn request_read(&self) {
        self.log(RegAccess::ReadRequest);
        self.start_sync();
        self.count_synced.set(false);
        self.read_pending.set(true);
    }

    fn count(&self) -> u32 {
        let count = self.count.get();
        self.log(RegAccess::ReadCount(count));
        if !self.count_synced.replace(false) {
            self.violation(SyncViolation::StaleCount);
        }
        count
    }

    fn write_comp0(&self, value: u32) {
        self.log(RegAccess::WriteComp0(value));
        self.start_sync();
        self.comp0.set(value);
    }

    fn interrupt_flags(&self) -> InterruptFlags {
        let flags = self.intflag.get();
        self.log(RegAccess::ReadFlags(flags));
        flags
    }

    fn clear_interrupt_flags(&self, flags: InterruptFlags) {
        self.log(RegAccess::ClearFlags(flags));
        self.intflag.set(self.intflag.get() - flags);
    }

    fn enable_interrupts(&self, flags: InterruptFlags) {
        self.log(RegAccess::EnableInterrupts(flags));
        self.intenset.set(self.intenset.get() | flags);
    }

    fn disable_interrupts(&self, flags: InterruptFlags) {
        self.log(RegAccess::DisableInterrupts(flags));
        self.intenset.set(self.intenset.get() - flags);
    }
}

/// One captured interrupt controller operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvicOp {
    Connect(IrqNumber, u8),
    Enable(IrqNumber),
    Mask(IrqNumber),
    ClearPending(IrqNumber),
    SetPending(IrqNumber),
}

/// Simulated NVIC with 32 lines and 4 priority levels
#[derive(Debug, Default)]
pub struct FakeNvic {
    connected: Cell<u32>,
    enabled: Cell<u32>,
    pending: Cell<u32>,
    priorities: RefCell<Vec<(IrqNumber, u8)>>,
    ops: RefCell<Vec<NvicOp>>,
}

impl FakeNvic {
    /// Creates a controller with every line disabled
    pub fn new() -> Self {
        Self::default()
    }

    fn bit(irq: IrqNumber) -> u32 {
        1 << (irq % 32)
    }

    /// Returns whether a line is enabled
    pub fn is_enabled(&self, irq: IrqNumber) -> bool {
        self.enabled.get() & Self::bit(irq) != 0
    }

    /// Returns whether a line is pending
    pub fn is_pending(&self, irq: IrqNumber) -> bool {
        self.pending.get() & Self::bit(irq) != 0
    }

    /// Returns the priority a line was connected with
    pub fn priority(&self, irq: IrqNumber) -> Option<u8> {
        self.priorities
            .borrow()
            .iter()
            .find(|(line, _)| *line == irq)
            .map(|(_, priority)| *priority)
    }

    /// Dispatches a pending, enabled line
    ///
    /// Returns true and clears the pending bit if the line would be taken
    /// by the CPU now.
    pub fn take_pending(&self, irq: IrqNumber) -> bool {
        if !self.is_enabled(irq) || !self.is_pending(irq) {
            return false;
        }
        self.pending.set(self.pending.get() & !Self::bit(irq));
        true
    }

    /// Returns all captured operations
    pub fn ops(&self) -> Vec<NvicOp> {
        self.ops.borrow().clone()
    }

    /// Clears captured operations
    pub fn clear_ops(&self) {
        self.ops.borrow_mut().clear();
    }

    fn log(&self, op: NvicOp) {
        self.ops.borrow_mut().push(op);
    }
}

impl InterruptController for FakeNvic {
    fn connect(&self, irq: IrqNumber, priority: u8) -> Result<(), InterruptError> {
        self.log(NvicOp::Connect(irq, priority));
        if irq >= 32 {
            return Err(InterruptError::InvalidLine(irq));
        }
        if priority >= crate::nvic::PRIORITY_LEVELS {
            return Err(InterruptError::InvalidPriority(priority));
        }
        if self.connected.get() & Self::bit(irq) != 0 {
            return Err(InterruptError::AlreadyConnected(irq));
        }
        self.connected.set(self.connected.get() | Self::bit(irq));
        self.priorities.borrow_mut().push((irq, priority));
        Ok(())
    }

    fn enable(&self, irq: IrqNumber) {
        self.log(NvicOp::Enable(irq));
        self.enabled.set(self.enabled.get() | Self::bit(irq));
    }

    fn mask(&self, irq: IrqNumber) -> bool {
        self.log(NvicOp::Mask(irq));
        let was_enabled = self.is_enabled(irq);
        self.enabled.set(self.enabled.get() & !Self::bit(irq));
        was_enabled
    }

    fn clear_pending(&self, irq: IrqNumber) {
        self.log(NvicOp::ClearPending(irq));
        self.pending.set(self.pending.get() & !Self::bit(irq));
    }

    fn set_pending(&self, irq: IrqNumber) {
        self.log(NvicOp::SetPending(irq));
        self.pending.set(self.pending.get() | Self::bit(irq));
    }
}

/// Simulated PM/GCLK
#[derive(Debug, Default)]
pub struct FakeClocks {
    bus_enabled: Cell<bool>,
    generator: Cell<Option<u8>>,
    fail_sync: bool,
}

impl FakeClocks {
    /// Creates clocks that route successfully
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates clocks whose generator never synchronizes
    pub fn failing() -> Self {
        Self {
            fail_sync: true,
            ..Self::default()
        }
    }

    /// Returns whether the bus clock was enabled
    pub fn bus_enabled(&self) -> bool {
        self.bus_enabled.get()
    }

    /// Returns the routed generator, if any
    pub fn generator(&self) -> Option<u8> {
        self.generator.get()
    }
}

impl ClockControl for FakeClocks {
    fn enable_bus_clock(&self) {
        self.bus_enabled.set(true);
    }

    fn route_generator(&self, generator: u8) -> Result<(), ClockError> {
        if self.fail_sync {
            return Err(ClockError::SyncTimeout(generator));
        }
        self.generator.set(Some(generator));
        Ok(())
    }
}
