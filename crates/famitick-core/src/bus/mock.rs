use crate::bus::Bus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read(u16, u8),
    Write(u16, u8),
}

/// Flat 64 KiB bus that records every access, with test-controlled
/// interrupt lines.
#[derive(Debug)]
pub(crate) struct MockBus {
    pub(crate) mem: Box<[u8; 0x10000]>,
    pub(crate) log: Vec<Access>,
    pub(crate) nmi: bool,
    pub(crate) irq: bool,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            mem: Box::new([0; 0x10000]),
            log: Vec::new(),
            nmi: false,
            irq: false,
        }
    }
}

impl MockBus {
    /// Places `program` at `origin` and points the reset vector at it.
    pub(crate) fn with_program(origin: u16, program: &[u8]) -> Self {
        let mut bus = Self::default();
        bus.load(origin, program);
        bus.mem[0xFFFC] = origin as u8;
        bus.mem[0xFFFD] = (origin >> 8) as u8;
        bus
    }

    pub(crate) fn load(&mut self, origin: u16, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            self.mem[origin.wrapping_add(i as u16) as usize] = *byte;
        }
    }

    pub(crate) fn writes(&self) -> Vec<(u16, u8)> {
        self.log
            .iter()
            .filter_map(|access| match access {
                Access::Write(addr, value) => Some((*addr, *value)),
                Access::Read(..) => None,
            })
            .collect()
    }
}

impl Bus for MockBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.mem[addr as usize];
        self.log.push(Access::Read(addr, value));
        value
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.log.push(Access::Write(addr, data));
        self.mem[addr as usize] = data;
    }

    fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }

    fn nmi_line(&self) -> bool {
        self.nmi
    }

    fn irq_line(&self) -> bool {
        self.irq
    }
}
