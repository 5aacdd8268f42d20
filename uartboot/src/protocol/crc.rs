//! CRC-8 frame check sequence.
//!
//! The bootloader appends a one-byte FCS to every frame, computed with a
//! right-shifting CRC-8 over the command, size and payload bytes. The
//! generator polynomial differs between firmware builds, so it is a
//! parameter here rather than a baked-in literal; [`DEFAULT_POLYNOMIAL`]
//! matches the reference bootloader's frame handler.

/// Generator polynomial used by the reference bootloader (reflected form).
pub const DEFAULT_POLYNOMIAL: u8 = 0x07;

/// Generator polynomial used by an alternative firmware build.
///
/// Select it via the frame configuration when targeting that firmware.
pub const ALT_POLYNOMIAL: u8 = 0xB2;

/// Compute the CRC-8 of `data` bit by bit.
///
/// The register starts at zero; each input byte is XORed in and then shifted
/// out low bit first, folding in `poly` whenever the low bit is set.
pub fn crc8(data: &[u8], poly: u8) -> u8 {
    let mut crc = 0u8;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if crc & 0x01 != 0 {
                crc = (crc >> 1) ^ poly;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

/// Table-driven CRC-8 engine.
///
/// Precomputes the 256-entry lookup table for one polynomial and then
/// processes a byte per step. Produces exactly the same values as [`crc8`].
#[derive(Debug, Clone)]
pub struct Crc8 {
    poly: u8,
    table: [u8; 256],
}

impl Crc8 {
    /// Build the lookup table for `poly`.
    pub fn new(poly: u8) -> Self {
        let mut table = [0u8; 256];

        for (i, entry) in table.iter_mut().enumerate() {
            // Safe cast: i < 256
            #[allow(clippy::cast_possible_truncation)]
            let mut crc = i as u8;

            for _ in 0..8 {
                if crc & 0x01 != 0 {
                    crc = (crc >> 1) ^ poly;
                } else {
                    crc >>= 1;
                }
            }

            *entry = crc;
        }

        Self { poly, table }
    }

    /// Compute the CRC-8 of `data`.
    pub fn compute(&self, data: &[u8]) -> u8 {
        data.iter()
            .fold(0u8, |crc, &byte| self.table[usize::from(crc ^ byte)])
    }

    /// The generator polynomial this engine was built from.
    pub fn polynomial(&self) -> u8 {
        self.poly
    }
}
