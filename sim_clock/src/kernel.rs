//! Kernel stand-in for simulation

use core::cell::{Cell, RefCell};

use sys_clock::KernelClock;

/// Records every announce and keeps the kernel's nominal tick count
///
/// # Examples
///
/// ```
/// use sim_clock::RecordingKernel;
/// use sys_clock::KernelClock;
///
/// let kernel = RecordingKernel::new();
/// kernel.announce(3);
/// kernel.announce(0);
///
/// assert_eq!(kernel.announces(), vec![3, 0]);
/// assert_eq!(kernel.tick_get(), 3);
/// ```
#[derive(Debug, Default)]
pub struct RecordingKernel {
    announces: RefCell<Vec<u32>>,
    ticks: Cell<u64>,
}

impl RecordingKernel {
    /// Creates a kernel at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Every announce so far, oldest first
    pub fn announces(&self) -> Vec<u32> {
        self.announces.borrow().clone()
    }

    /// Number of announces so far
    pub fn announce_count(&self) -> usize {
        self.announces.borrow().len()
    }

    /// The most recent announce
    pub fn last_announce(&self) -> Option<u32> {
        self.announces.borrow().last().copied()
    }

    /// Forgets recorded announces; the tick count is kept
    pub fn clear_announces(&self) {
        self.announces.borrow_mut().clear();
    }
}

impl KernelClock for RecordingKernel {
    fn announce(&self, ticks: u32) {
        log::trace!("announce({})", ticks);
        self.announces.borrow_mut().push(ticks);
        self.ticks.set(self.ticks.get() + u64::from(ticks));
    }

    fn tick_get(&self) -> u64 {
        self.ticks.get()
    }
}
