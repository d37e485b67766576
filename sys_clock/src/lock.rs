//! Tick-interrupt critical section

use core::sync::atomic::{compiler_fence, Ordering};

use hal::{InterruptController, IrqNumber};

/// Masks one interrupt line for as long as it lives
///
/// The line is restored on drop only if it was enabled when the guard was
/// taken, so guards nest. A tick raised while masked stays pending and is
/// taken as soon as the guard drops.
#[must_use = "the line is unmasked as soon as the guard is dropped"]
pub struct IrqGuard<'a, I: InterruptController> {
    controller: &'a I,
    line: IrqNumber,
    restore: bool,
}

impl<'a, I: InterruptController> IrqGuard<'a, I> {
    /// Masks `line` on `controller`
    pub fn new(controller: &'a I, line: IrqNumber) -> Self {
        let restore = controller.mask(line);
        // Keep the protected accesses after the mask.
        compiler_fence(Ordering::SeqCst);
        Self {
            controller,
            line,
            restore,
        }
    }
}

impl<I: InterruptController> Drop for IrqGuard<'_, I> {
    fn drop(&mut self) {
        compiler_fence(Ordering::SeqCst);
        if self.restore {
            self.controller.enable(self.line);
        }
    }
}
