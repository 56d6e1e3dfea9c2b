use std::fmt;

use crate::ds::ControlWord;

/// Lines that are electrically active low: everything but HLT, RI, SU, OI
/// and CE. This is a fact about the board, not derivable from the table.
pub(crate) const ACTIVE_LOW: u16 = ControlWord::MI.bits()
    | ControlWord::RO.bits()
    | ControlWord::IO.bits()
    | ControlWord::II.bits()
    | ControlWord::AI.bits()
    | ControlWord::AO.bits()
    | ControlWord::EO.bits()
    | ControlWord::BI.bits()
    | ControlWord::CO.bits()
    | ControlWord::J.bits()
    | ControlWord::FI.bits();

/// A control word as it is driven onto the EEPROM data pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ElectricalWord(u16);

impl ElectricalWord {
    /// Byte for the EEPROM holding data bits 0-7
    pub(crate) const fn low(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Byte for the EEPROM holding data bits 8-15
    pub(crate) const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }
}

impl From<ElectricalWord> for u16 {
    fn from(word: ElectricalWord) -> Self {
        word.0
    }
}

impl fmt::Display for ElectricalWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

pub(crate) const fn invert(word: ControlWord) -> ElectricalWord {
    ElectricalWord(word.bits() ^ ACTIVE_LOW)
}
