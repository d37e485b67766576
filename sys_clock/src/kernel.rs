//! Upward interface toward the owning kernel

/// What the timer needs from the kernel
///
/// The driver never schedules anything itself. It tells the kernel how much
/// time has passed and, for diagnostics, asks it how many ticks it has
/// counted so far.
pub trait KernelClock {
    /// Reports `ticks` elapsed since the previous announce
    ///
    /// Called from interrupt context. `0` is a valid value: it completes an
    /// immediate (forced) timeout without any time having passed.
    fn announce(&self, ticks: u32);

    /// Returns the kernel's nominal tick count
    fn tick_get(&self) -> u64;
}
