//! # SAM0 RTC (MODE0)
//!
//! The real-time counter of the SAM D/R/L 2x families, used in mode 0:
//! a single 32-bit counter with one compare register.
//!
//! ## Hardware Details
//!
//! - Registers live in the RTC_GCLK domain; CTRL, READREQ, COUNT and COMP0
//!   are synchronized, signalled by STATUS.SYNCBUSY
//! - A synchronization takes roughly six RTC_GCLK cycles
//! - Reading COUNT requires a read request (READREQ.RREQ) and a sync
//! - With CTRL.MATCHCLR the counter clears on a compare 0 match and raises OVF

use hal::{ControlFlags, InterruptFlags, RtcRegisters};

use crate::mmio::Mmio;

/// Default RTC base address on SAM D21/R21/L21
pub const RTC_BASE: usize = 0x4000_1400;

/// Register offsets within the MODE0 block
pub mod offsets {
    pub const CTRL: usize = 0x00;
    pub const READREQ: usize = 0x02;
    pub const INTENCLR: usize = 0x06;
    pub const INTENSET: usize = 0x07;
    pub const INTFLAG: usize = 0x08;
    pub const STATUS: usize = 0x0A;
    pub const COUNT: usize = 0x10;
    pub const COMP0: usize = 0x18;
}

/// READREQ read request bit
pub const READREQ_RREQ: u16 = 1 << 15;

/// STATUS sync-busy bit
pub const STATUS_SYNCBUSY: u8 = 1 << 7;

/// Memory-mapped SAM0 RTC in mode 0
#[derive(Debug)]
pub struct Sam0Rtc {
    regs: Mmio,
}

impl Sam0Rtc {
    /// Creates the driver for the RTC at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the RTC's address and nothing else may access it.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            regs: Mmio::new(base),
        }
    }
}

impl RtcRegisters for Sam0Rtc {
    fn sync_busy(&self) -> bool {
        self.regs.read8(offsets::STATUS) & STATUS_SYNCBUSY != 0
    }

    fn read_ctrl(&self) -> ControlFlags {
        ControlFlags::from_bits_truncate(self.regs.read16(offsets::CTRL))
    }

    fn write_ctrl(&self, ctrl: ControlFlags) {
        self.regs.write16(offsets::CTRL, ctrl.bits());
    }

    fn request_read(&self) {
        self.regs.write16(offsets::READREQ, READREQ_RREQ);
    }

    fn count(&self) -> u32 {
        self.regs.read32(offsets::COUNT)
    }

    fn write_comp0(&self, value: u32) {
        self.regs.write32(offsets::COMP0, value);
    }

    fn interrupt_flags(&self) -> InterruptFlags {
        InterruptFlags::from_bits_truncate(self.regs.read8(offsets::INTFLAG))
    }

    fn clear_interrupt_flags(&self, flags: InterruptFlags) {
        self.regs.write8(offsets::INTFLAG, flags.bits());
    }

    fn enable_interrupts(&self, flags: InterruptFlags) {
        self.regs.write8(offsets::INTENSET, flags.bits());
    }

    fn disable_interrupts(&self, flags: InterruptFlags) {
        self.regs.write8(offsets::INTENCLR, flags.bits());
    }
}
