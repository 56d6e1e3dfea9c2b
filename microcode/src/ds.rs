use std::fmt;

use bitflags::bitflags;

/// A single hardware control line.
///
/// The discriminant is the line's bit position in the control word. These
/// positions are wired to the EEPROM data pins and must not be renumbered.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum ControlSignal {
    AO = 0,
    AI = 1,
    II = 2,
    IO = 3,
    RO = 4,
    RI = 5,
    MI = 6,
    HLT = 7,
    FI = 8,
    J = 9,
    CO = 10,
    CE = 11,
    OI = 12,
    BI = 13,
    SU = 14,
    EO = 15,
}

impl ControlSignal {
    /// Every control line, in ascending bit order
    pub(crate) const ALL: [ControlSignal; 16] = [
        ControlSignal::AO,
        ControlSignal::AI,
        ControlSignal::II,
        ControlSignal::IO,
        ControlSignal::RO,
        ControlSignal::RI,
        ControlSignal::MI,
        ControlSignal::HLT,
        ControlSignal::FI,
        ControlSignal::J,
        ControlSignal::CO,
        ControlSignal::CE,
        ControlSignal::OI,
        ControlSignal::BI,
        ControlSignal::SU,
        ControlSignal::EO,
    ];

    pub(crate) const fn bit(self) -> u8 {
        self as u8
    }

    pub(crate) const fn word(self) -> ControlWord {
        ControlWord::from_bits_retain(1 << self.bit())
    }

    pub(crate) const fn mnemonic(self) -> &'static str {
        match self {
            ControlSignal::AO => "AO",
            ControlSignal::AI => "AI",
            ControlSignal::II => "II",
            ControlSignal::IO => "IO",
            ControlSignal::RO => "RO",
            ControlSignal::RI => "RI",
            ControlSignal::MI => "MI",
            ControlSignal::HLT => "HLT",
            ControlSignal::FI => "FI",
            ControlSignal::J => "J",
            ControlSignal::CO => "CO",
            ControlSignal::CE => "CE",
            ControlSignal::OI => "OI",
            ControlSignal::BI => "BI",
            ControlSignal::SU => "SU",
            ControlSignal::EO => "EO",
        }
    }

    pub(crate) const fn description(self) -> &'static str {
        match self {
            ControlSignal::AO => "register A out",
            ControlSignal::AI => "register A in",
            ControlSignal::II => "instruction register in",
            ControlSignal::IO => "instruction register out",
            ControlSignal::RO => "ram out",
            ControlSignal::RI => "ram in",
            ControlSignal::MI => "memory address register in",
            ControlSignal::HLT => "halt",
            ControlSignal::FI => "flags register in",
            ControlSignal::J => "jump",
            ControlSignal::CO => "counter out",
            ControlSignal::CE => "counter enable",
            ControlSignal::OI => "output register in",
            ControlSignal::BI => "register B in",
            ControlSignal::SU => "ALU subtract",
            ControlSignal::EO => "ALU out",
        }
    }

    /// Whether the line does its job when driven low.
    ///
    /// Only halt, ram in, ALU subtract, output in and counter enable are
    /// active high on the board.
    pub(crate) const fn is_active_low(self) -> bool {
        !matches!(
            self,
            ControlSignal::HLT
                | ControlSignal::RI
                | ControlSignal::SU
                | ControlSignal::OI
                | ControlSignal::CE
        )
    }
}

impl fmt::Display for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

bitflags! {
    /// The control lines asserted during one microstep, in logical convention
    /// (bit set means the line is doing its job).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct ControlWord: u16 {
        const AO  = 1 << 0;
        const AI  = 1 << 1;
        const II  = 1 << 2;
        const IO  = 1 << 3;
        const RO  = 1 << 4;
        const RI  = 1 << 5;
        const MI  = 1 << 6;
        const HLT = 1 << 7;
        const FI  = 1 << 8;
        const J   = 1 << 9;
        const CO  = 1 << 10;
        const CE  = 1 << 11;
        const OI  = 1 << 12;
        const BI  = 1 << 13;
        const SU  = 1 << 14;
        const EO  = 1 << 15;
    }
}

impl ControlWord {
    /// Asserted signals, lowest bit first
    pub(crate) fn signals(self) -> impl Iterator<Item = ControlSignal> {
        ControlSignal::ALL
            .into_iter()
            .filter(move |signal| self.contains(signal.word()))
    }
}

impl fmt::Display for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, signal) in self.signals().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(signal.mnemonic())?;
        }
        Ok(())
    }
}

bitflags! {
    /// Processor status bits fed back into the EEPROM address lines
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Flags: u8 {
        const CARRY = 0b01;
        const ZERO  = 0b10;
    }
}

impl Flags {
    /// Builds flags from a 2-bit field; higher bits are ignored.
    pub(crate) const fn from_value(value: u8) -> Self {
        Flags::from_bits_truncate(value)
    }

    pub(crate) const fn value(self) -> u8 {
        self.bits()
    }
}
