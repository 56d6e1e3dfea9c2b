use crate::{
    ds::{ControlWord, Flags},
    polarity::{invert, ElectricalWord},
    table::{FETCH_ONLY, MICROCODE},
};

/// Words per EEPROM (11 address lines)
pub(crate) const ROM_SIZE: usize = 2048;

const TABLE_SELECT: u16 = 1 << 10;
const WIRED_BIT: u16 = 1 << 7;

/// An address on the EEPROM address bus. Only `all` hands these out, so every
/// value is below `ROM_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct RomAddress(u16);

impl RomAddress {
    /// Every address, lowest first
    pub(crate) fn all() -> impl Iterator<Item = RomAddress> {
        (0..ROM_SIZE as u16).map(RomAddress)
    }

    pub(crate) const fn value(self) -> u16 {
        self.0
    }
}

/// Compensates for the board routing logical bit 0 to address pin 7.
///
/// Clears bits 0 and 7 and moves the old bit 7 into bit 0. Everything else
/// passes through.
pub(crate) const fn remap(raw: u16) -> u16 {
    (raw & !(WIRED_BIT | 1)) | ((raw & WIRED_BIT) >> 7)
}

/// Which table cell an address selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decoded {
    /// Upper half of the ROM: always the plain fetch cycle
    Fallback { step: u8 },
    Table { opcode: u8, flags: Flags, step: u8 },
}

impl Decoded {
    pub(crate) const fn from_address(address: RomAddress) -> Self {
        let r = remap(address.value());
        let step = (r & 0x7) as u8;
        if r & TABLE_SELECT != 0 {
            return Decoded::Fallback { step };
        }
        Decoded::Table {
            opcode: ((r >> 3) & 0xF) as u8,
            flags: Flags::from_value(((r >> 8) & 0x3) as u8),
            step,
        }
    }
}

/// The control word for `address` before polarity correction
pub(crate) fn logical_word(address: RomAddress) -> ControlWord {
    match Decoded::from_address(address) {
        Decoded::Fallback { step } => FETCH_ONLY[step as usize],
        Decoded::Table {
            opcode,
            flags,
            step,
        } => MICROCODE.word(opcode, flags, step),
    }
}

/// The word the EEPROM pair must hold at `address`
pub(crate) fn decode(address: RomAddress) -> ElectricalWord {
    invert(logical_word(address))
}
