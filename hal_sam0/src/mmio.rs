//! Memory-mapped register access
//!
//! Every volatile access in this crate goes through [`Mmio`], so the unsafe
//! surface is a handful of one-line functions.
//!
//! ## Safety
//!
//! A register block is only valid when:
//! - The base address is the peripheral's documented address
//! - The peripheral's bus clock is enabled before any access
//! - No other driver owns the same block

/// A peripheral register block at a fixed base address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Creates a register block accessor
    ///
    /// # Safety
    ///
    /// `base` must be the address of a memory-mapped peripheral that this
    /// accessor has exclusive use of for the life of the program.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Returns the base address
    pub const fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn read8(&self, offset: usize) -> u8 {
        // SAFETY: `new` guarantees the block is mapped and exclusively ours.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u8) }
    }

    #[inline]
    pub fn write8(&self, offset: usize, value: u8) {
        // SAFETY: see `read8`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u8, value) }
    }

    #[inline]
    pub fn read16(&self, offset: usize) -> u16 {
        // SAFETY: see `read8`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u16) }
    }

    #[inline]
    pub fn write16(&self, offset: usize, value: u16) {
        // SAFETY: see `read8`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u16, value) }
    }

    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        // SAFETY: see `read8`.
        unsafe { core::ptr::read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        // SAFETY: see `read8`.
        unsafe { core::ptr::write_volatile((self.base + offset) as *mut u32, value) }
    }
}
