//! Fixed-size byte memories: work RAM, PRG RAM, nametables, palette and OAM.
//!
//! Blocks are inline arrays by default; the `boxed-memblock` feature moves
//! them to the heap for targets with small stacks. Snapshots encode a block
//! as one byte string rather than `N` separate elements.

use core::ops::{Deref, DerefMut};

#[cfg(feature = "boxed-memblock")]
type Storage<const N: usize> = Box<[u8; N]>;

#[cfg(not(feature = "boxed-memblock"))]
type Storage<const N: usize> = [u8; N];

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<const N: usize>(Storage<N>);

pub mod cpu {
    use crate::memory::cpu as cpu_mem;

    pub type Ram = super::MemBlock<{ cpu_mem::INTERNAL_RAM_SIZE }>;
    pub type PrgRam =
        super::MemBlock<{ (cpu_mem::PRG_RAM_END - cpu_mem::PRG_RAM_START + 1) as usize }>;
}

pub mod ppu {
    use crate::memory::ppu as ppu_mem;

    /// Internal 2 KiB nametable RAM.
    pub type Ciram = super::MemBlock<{ ppu_mem::CIRAM_SIZE }>;
    pub type PaletteRam = super::MemBlock<{ ppu_mem::PALETTE_RAM_SIZE }>;
    pub type OamRam = super::MemBlock<{ ppu_mem::OAM_RAM_SIZE }>;
    pub type SecondaryOamRam = super::MemBlock<{ ppu_mem::SECONDARY_OAM_RAM_SIZE }>;
}

impl<const N: usize> MemBlock<N> {
    /// Zero-filled block.
    pub fn new() -> Self {
        Self::filled(0)
    }

    #[inline]
    pub fn filled(value: u8) -> Self {
        #[cfg(feature = "boxed-memblock")]
        {
            Self(Box::new([value; N]))
        }
        #[cfg(not(feature = "boxed-memblock"))]
        {
            Self([value; N])
        }
    }
}

impl<const N: usize> Default for MemBlock<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Deref for MemBlock<N> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl<const N: usize> DerefMut for MemBlock<N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }
}

#[cfg(feature = "savestate-serde")]
impl<const N: usize> serde::Serialize for MemBlock<N> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self)
    }
}

#[cfg(feature = "savestate-serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for MemBlock<N> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlockVisitor<const N: usize>;

        impl<'de, const N: usize> serde::de::Visitor<'de> for BlockVisitor<N> {
            type Value = MemBlock<N>;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{N} bytes")
            }

            fn visit_bytes<E: serde::de::Error>(self, bytes: &[u8]) -> Result<Self::Value, E> {
                if bytes.len() != N {
                    return Err(E::invalid_length(bytes.len(), &self));
                }
                let mut block = MemBlock::new();
                block.copy_from_slice(bytes);
                Ok(block)
            }

            // Self-describing formats may hand bytes back as a sequence.
            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                let mut block = MemBlock::new();
                for idx in 0..N {
                    block[idx] = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(idx, &self))?;
                }
                Ok(block)
            }
        }

        deserializer.deserialize_bytes(BlockVisitor::<N>)
    }
}
