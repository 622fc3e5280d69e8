use crate::{
    apu::{self, AudioUnit, Dmc, STATUS_DMC_ACTIVE, STATUS_DMC_IRQ, STATUS_UNIT_MASK},
    bus::{Bus, OpenBus},
    cartridge::Cartridge,
    config::TimingProfile,
    controller::Controller,
    dma::DmaBus,
    mem_block::cpu as cpu_ram,
    memory::{apu as apu_mem, cpu as cpu_mem},
    ppu::{Ppu, blanking::BlankingLedger, buffer::ColorFormat},
};

/// Controller reads drive only bit 0; bits 5-7 float.
const CONTROLLER_OPEN_BUS_MASK: u8 = 0xE0;
/// `$4015` leaves bit 5 floating.
const STATUS_OPEN_BUS_MASK: u8 = 0x20;

/// Everything the CPU can address, owned by the console.
#[derive(Debug, Clone)]
pub(crate) struct Devices {
    pub(crate) ram: cpu_ram::Ram,
    pub(crate) ppu: Ppu,
    pub(crate) dmc: Dmc,
    pub(crate) audio: Box<dyn AudioUnit>,
    pub(crate) cartridge: Box<dyn Cartridge>,
    pub(crate) controllers: [Controller; 2],
    pub(crate) open_bus: OpenBus,
    /// Page latched by a `$4014` write; the console starts sprite DMA after
    /// the CPU slot that wrote it.
    pub(crate) sprite_dma_request: Option<u8>,
}

impl Devices {
    pub(crate) fn new(
        profile: &TimingProfile,
        format: ColorFormat,
        cartridge: Box<dyn Cartridge>,
        audio: Box<dyn AudioUnit>,
    ) -> Self {
        Self {
            ram: cpu_ram::Ram::new(),
            ppu: Ppu::new(profile, format),
            dmc: Dmc::new(profile.dmc_rates),
            audio,
            cartridge,
            controllers: [Controller::new(), Controller::new()],
            open_bus: OpenBus::new(),
            sprite_dma_request: None,
        }
    }

    /// Side-effect-free view of the CPU address space.
    pub(crate) fn peek(&self, addr: u16, blanking: &BlankingLedger, now: u64) -> u8 {
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[ram_index(addr)]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                self.ppu.cpu_peek(addr, now, blanking)
            }
            apu_mem::STATUS => self.status_bits(self.audio.peek_status()),
            cpu_mem::CONTROLLER_PORT_1 | cpu_mem::CONTROLLER_PORT_2 => {
                let port = usize::from(addr - cpu_mem::CONTROLLER_PORT_1);
                (self.open_bus.sample() & CONTROLLER_OPEN_BUS_MASK) | self.controllers[port].peek()
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => self
                .cartridge
                .cpu_peek(addr)
                .unwrap_or_else(|| self.open_bus.sample()),
            _ => self.open_bus.sample(),
        }
    }

    fn status_bits(&self, unit: u8) -> u8 {
        let mut value =
            (unit & STATUS_UNIT_MASK) | (self.open_bus.sample() & STATUS_OPEN_BUS_MASK);
        if self.dmc.active() {
            value |= STATUS_DMC_ACTIVE;
        }
        if self.dmc.irq_pending() {
            value |= STATUS_DMC_IRQ;
        }
        value
    }
}

#[inline]
fn ram_index(addr: u16) -> usize {
    usize::from(addr & cpu_mem::INTERNAL_RAM_MASK)
}

/// CPU-visible bus for one CPU slot.
///
/// Borrows the console's devices together with the timing context of the
/// current tick, which the pixel pipeline needs to answer status reads.
#[derive(Debug)]
pub(crate) struct CpuBus<'a> {
    devices: &'a mut Devices,
    blanking: &'a mut BlankingLedger,
    profile: &'a TimingProfile,
    now: u64,
    line: u16,
    cpu_cycle: u64,
}

impl<'a> CpuBus<'a> {
    pub(crate) fn new(
        devices: &'a mut Devices,
        blanking: &'a mut BlankingLedger,
        profile: &'a TimingProfile,
        now: u64,
        line: u16,
        cpu_cycle: u64,
    ) -> Self {
        Self {
            devices,
            blanking,
            profile,
            now,
            line,
            cpu_cycle,
        }
    }

    /// One read cycle with device side effects. Does not touch the address
    /// history.
    fn read_device(&mut self, addr: u16) -> u8 {
        let devices = &mut *self.devices;
        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                let value = devices.ram[ram_index(addr)];
                devices.open_bus.latch(value);
                value
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                let value = devices.ppu.cpu_read(
                    addr,
                    self.now,
                    self.line,
                    &mut *self.blanking,
                    &mut *devices.cartridge,
                );
                devices.open_bus.latch(value);
                value
            }
            // The status read does not drive the external bus.
            apu_mem::STATUS => {
                let unit = devices.audio.read_status();
                devices.status_bits(unit)
            }
            cpu_mem::CONTROLLER_PORT_1 | cpu_mem::CONTROLLER_PORT_2 => {
                let port = usize::from(addr - cpu_mem::CONTROLLER_PORT_1);
                let bit = devices.controllers[port].read();
                devices.open_bus.apply_masked(CONTROLLER_OPEN_BUS_MASK, bit)
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                match devices.cartridge.cpu_read(addr) {
                    Some(value) => {
                        devices.open_bus.latch(value);
                        value
                    }
                    None => devices.open_bus.sample(),
                }
            }
            _ => devices.open_bus.sample(),
        }
    }

    fn write_dmc(&mut self, addr: u16, value: u8) {
        let dmc = &mut self.devices.dmc;
        match addr {
            apu_mem::DMC_CONTROL => dmc.write_control(value, self.profile.dmc_rates),
            apu_mem::DMC_DIRECT_LOAD => dmc.write_direct_load(value),
            apu_mem::DMC_SAMPLE_ADDRESS => dmc.write_sample_address(value),
            apu_mem::DMC_SAMPLE_LENGTH => dmc.write_sample_length(value),
            apu_mem::STATUS => dmc.set_enabled(value & STATUS_DMC_ACTIVE != 0, self.cpu_cycle),
            _ => {}
        }
    }
}

impl Bus for CpuBus<'_> {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.read_device(addr);
        self.devices.open_bus.record_addr(addr);
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        let devices = &mut *self.devices;
        // Only read cycles go into the address history; the CPU never halts
        // for DMA on a write.
        devices.open_bus.latch(value);

        match addr {
            cpu_mem::INTERNAL_RAM_START..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                devices.ram[ram_index(addr)] = value;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                devices
                    .ppu
                    .cpu_write(addr, value, self.line, &mut *devices.cartridge);
            }
            cpu_mem::OAM_DMA => devices.sprite_dma_request = Some(value),
            cpu_mem::CONTROLLER_PORT_1 => {
                for pad in devices.controllers.iter_mut() {
                    pad.write_strobe(value);
                }
            }
            _ if apu::is_audio_register(addr) => {
                devices.audio.write_register(addr, value);
                self.write_dmc(addr, value);
            }
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                devices.cartridge.cpu_write(addr, value);
            }
            _ => {}
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.devices.peek(addr, &*self.blanking, self.now)
    }

    fn nmi_line(&self) -> bool {
        self.blanking
            .nmi_line(self.now, self.devices.ppu.nmi_enabled())
    }

    fn irq_line(&self) -> bool {
        self.devices.audio.irq_pending()
            || self.devices.dmc.irq_pending()
            || self.devices.cartridge.irq_pending()
    }
}

impl DmaBus for CpuBus<'_> {
    fn dma_read(&mut self, addr: u16) -> u8 {
        self.read_device(addr)
    }

    fn write_oam(&mut self, value: u8) {
        self.devices.ppu.write_oam(value);
    }

    fn last_cpu_addr(&self) -> u16 {
        self.devices.open_bus.last_addr()
    }
}
