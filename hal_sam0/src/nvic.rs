//! Cortex-M NVIC
//!
//! Memory-mapped nested vectored interrupt controller, as found on every
//! SAM0 part. Lines are enabled, masked and forced pending through the
//! set/clear register banks; priorities use the upper bits of IPR bytes.

use hal::{InterruptController, InterruptError, IrqNumber};

use crate::mmio::Mmio;

/// NVIC base address (ISER0)
pub const NVIC_BASE: usize = 0xE000_E100;

const ISER: usize = 0x000;
const ICER: usize = 0x080;
const ISPR: usize = 0x100;
const ICPR: usize = 0x180;
const IPR: usize = 0x300;

/// Number of external lines on Cortex-M0+
pub const NVIC_LINES: IrqNumber = 32;

/// Implemented priority bits on Cortex-M0+
pub const PRIORITY_BITS: u8 = 2;

/// Number of distinct priority levels, 0 being the most urgent
pub const PRIORITY_LEVELS: u8 = 1 << PRIORITY_BITS;

/// Memory-mapped NVIC
#[derive(Debug)]
pub struct Nvic {
    regs: Mmio,
}

impl Nvic {
    /// Creates the NVIC driver
    ///
    /// # Safety
    ///
    /// `base` must be the NVIC's address. The caller must not race other
    /// code configuring the same lines.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            regs: Mmio::new(base),
        }
    }

    fn bank(irq: IrqNumber) -> (usize, u32) {
        (usize::from(irq / 32) * 4, 1 << (irq % 32))
    }

    /// Encodes a logical priority into the implemented IPR bits
    ///
    /// Only the low `PRIORITY_BITS` bits are kept; `connect` rejects
    /// anything wider before encoding.
    pub const fn encode_priority(priority: u8) -> u8 {
        (priority & (PRIORITY_LEVELS - 1)) << (8 - PRIORITY_BITS)
    }
}

impl InterruptController for Nvic {
    fn connect(&self, irq: IrqNumber, priority: u8) -> Result<(), InterruptError> {
        if irq >= NVIC_LINES {
            return Err(InterruptError::InvalidLine(irq));
        }
        if priority >= PRIORITY_LEVELS {
            return Err(InterruptError::InvalidPriority(priority));
        }
        self.regs
            .write8(IPR + usize::from(irq), Self::encode_priority(priority));
        Ok(())
    }

    fn enable(&self, irq: IrqNumber) {
        let (bank, bit) = Self::bank(irq);
        self.regs.write32(ISER + bank, bit);
    }

    fn mask(&self, irq: IrqNumber) -> bool {
        let (bank, bit) = Self::bank(irq);
        let was_enabled = self.regs.read32(ISER + bank) & bit != 0;
        self.regs.write32(ICER + bank, bit);
        was_enabled
    }

    fn clear_pending(&self, irq: IrqNumber) {
        let (bank, bit) = Self::bank(irq);
        self.regs.write32(ICPR + bank, bit);
    }

    fn set_pending(&self, irq: IrqNumber) {
        let (bank, bit) = Self::bank(irq);
        self.regs.write32(ISPR + bank, bit);
    }
}
