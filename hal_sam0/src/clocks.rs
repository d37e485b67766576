//! SAM0 power manager and generic clock routing for the RTC

use hal::{ClockControl, ClockError};

use crate::mmio::Mmio;

/// Power manager base address
pub const PM_BASE: usize = 0x4000_0400;
/// Generic clock controller base address
pub const GCLK_BASE: usize = 0x4000_0C00;

const PM_APBAMASK: usize = 0x18;
const PM_APBAMASK_RTC: u32 = 1 << 5;

const GCLK_STATUS: usize = 0x01;
const GCLK_STATUS_SYNCBUSY: u8 = 1 << 7;
const GCLK_CLKCTRL: usize = 0x02;
const GCLK_CLKCTRL_CLKEN: u16 = 1 << 14;

/// Generic clock channel feeding the RTC
pub const RTC_GCLK_ID: u16 = 4;

/// Upper bound on GCLK sync polls before giving up
pub const GCLK_SYNC_POLLS: u32 = 100_000;

/// Builds the CLKCTRL value routing `generator` to the RTC channel
pub const fn clkctrl_value(generator: u8) -> u16 {
    RTC_GCLK_ID | ((generator as u16 & 0x0F) << 8) | GCLK_CLKCTRL_CLKEN
}

/// PM + GCLK access for the RTC
#[derive(Debug)]
pub struct Sam0Clocks {
    pm: Mmio,
    gclk: Mmio,
}

impl Sam0Clocks {
    /// Creates the clock driver
    ///
    /// # Safety
    ///
    /// Both addresses must be the real PM and GCLK blocks, and the caller
    /// must not reconfigure the RTC channel concurrently.
    pub const unsafe fn new(pm_base: usize, gclk_base: usize) -> Self {
        Self {
            pm: Mmio::new(pm_base),
            gclk: Mmio::new(gclk_base),
        }
    }
}

impl ClockControl for Sam0Clocks {
    fn enable_bus_clock(&self) {
        let mask = self.pm.read32(PM_APBAMASK);
        self.pm.write32(PM_APBAMASK, mask | PM_APBAMASK_RTC);
    }

    fn route_generator(&self, generator: u8) -> Result<(), ClockError> {
        self.gclk.write16(GCLK_CLKCTRL, clkctrl_value(generator));

        for _ in 0..GCLK_SYNC_POLLS {
            if self.gclk.read8(GCLK_STATUS) & GCLK_STATUS_SYNCBUSY == 0 {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(ClockError::SyncTimeout(generator))
    }
}
