use crate::memory;

pub mod cpu;
#[cfg(test)]
pub(crate) mod mock;
pub(crate) mod open_bus;

pub(crate) use open_bus::OpenBus;

/// Expose the CPU stack page start address for stack helpers.
pub(crate) const STACK_ADDR: u16 = memory::cpu::STACK_PAGE_START;

/// Byte-level bus capability consumed by the instruction engine and the DMA
/// engines.
///
/// Every `read`/`write` is one bus cycle with whatever side effects the
/// addressed device has. `peek` must never mutate anything and exists for
/// inspection tooling.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;

    fn write(&mut self, addr: u16, value: u8);

    fn peek(&self, addr: u16) -> u8;

    /// Current level of the NMI output. The CPU edge-detects it.
    fn nmi_line(&self) -> bool {
        false
    }

    /// Current level of the shared, level-triggered IRQ line.
    fn irq_line(&self) -> bool {
        false
    }
}

// Allow mutable references to Bus implementors to be used wherever a Bus is
// expected.
impl<T: Bus + ?Sized> Bus for &mut T {
    fn read(&mut self, addr: u16) -> u8 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        (**self).write(addr, value)
    }

    fn peek(&self, addr: u16) -> u8 {
        (**self).peek(addr)
    }

    fn nmi_line(&self) -> bool {
        (**self).nmi_line()
    }

    fn irq_line(&self) -> bool {
        (**self).irq_line()
    }
}
