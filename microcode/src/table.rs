use crate::ds::{ControlWord, Flags};

/// Microsteps per instruction
pub(crate) const STEPS: usize = 8;
/// Opcodes selectable by the 4-bit instruction field
pub(crate) const OPCODES: usize = 16;
/// Flag combinations each opcode is replicated across
pub(crate) const FLAG_VARIANTS: usize = 4;

/// Builds a `ControlWord` in const context, e.g. `word!(MI | CO)`.
macro_rules! word {
    () => {
        ControlWord::empty()
    };
    ($($signal:ident)|+) => {
        ControlWord::from_bits_retain(0 $(| ControlWord::$signal.bits())+)
    };
}

const FETCH_ADDRESS: ControlWord = word!(MI | CO);
const FETCH_INSTRUCTION: ControlWord = word!(RO | II | CE);

/// Fetch cycle with nothing after it. Used for the upper half of the ROM.
pub(crate) const FETCH_ONLY: [ControlWord; STEPS] = [
    FETCH_ADDRESS,
    FETCH_INSTRUCTION,
    word!(),
    word!(),
    word!(),
    word!(),
    word!(),
    word!(),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub(crate) enum Instruction {
    Nop = 0,
    /// Halt and catch fire
    Hcf = 1,
    Out = 2,
    Unused3 = 3,
    /// Immediate to A
    Tia = 4,
    Unused5 = 5,
    /// RAM at immediate address to A
    Tra = 6,
    /// A to RAM at immediate address
    Tar = 7,
    Add = 8,
    Sub = 9,
    Unused10 = 10,
    Unused11 = 11,
    /// Branch to immediate
    Bra = 12,
    /// Branch to A
    Brr = 13,
    /// Branch if carry set
    Bcs = 14,
    /// Branch if zero set
    Bzs = 15,
}

impl Instruction {
    pub(crate) const ALL: [Instruction; OPCODES] = [
        Instruction::Nop,
        Instruction::Hcf,
        Instruction::Out,
        Instruction::Unused3,
        Instruction::Tia,
        Instruction::Unused5,
        Instruction::Tra,
        Instruction::Tar,
        Instruction::Add,
        Instruction::Sub,
        Instruction::Unused10,
        Instruction::Unused11,
        Instruction::Bra,
        Instruction::Brr,
        Instruction::Bcs,
        Instruction::Bzs,
    ];

    /// Decodes the low four bits of `opcode`
    pub(crate) const fn from_opcode(opcode: u8) -> Self {
        Instruction::ALL[(opcode & 0xF) as usize]
    }

    pub(crate) const fn opcode(self) -> u8 {
        self as u8
    }

    pub(crate) const fn mnemonic(self) -> &'static str {
        match self {
            Instruction::Nop => "NOP",
            Instruction::Hcf => "HCF",
            Instruction::Out => "OUT",
            Instruction::Tia => "TIA",
            Instruction::Tra => "TRA",
            Instruction::Tar => "TAR",
            Instruction::Add => "ADD",
            Instruction::Sub => "SUB",
            Instruction::Bra => "BRA",
            Instruction::Brr => "BRR",
            Instruction::Bcs => "BCS",
            Instruction::Bzs => "BZS",
            Instruction::Unused3
            | Instruction::Unused5
            | Instruction::Unused10
            | Instruction::Unused11 => "---",
        }
    }

    /// Whether the microprogram depends on the flags
    pub(crate) const fn is_conditional(self) -> bool {
        matches!(self, Instruction::Bcs | Instruction::Bzs)
    }

    /// The full microprogram for this instruction under `flags`, starting with
    /// the shared fetch cycle. Unused instructions behave like `NOP`.
    pub(crate) const fn microprogram(self, flags: Flags) -> [ControlWord; STEPS] {
        let mut steps = FETCH_ONLY;
        match self {
            Instruction::Nop
            | Instruction::Unused3
            | Instruction::Unused5
            | Instruction::Unused10
            | Instruction::Unused11 => {}
            Instruction::Hcf => steps[2] = word!(HLT),
            Instruction::Out => steps[2] = word!(AO | OI),
            Instruction::Tia => steps[2] = word!(IO | AI),
            Instruction::Tra => {
                steps[2] = word!(IO | MI);
                steps[3] = word!(RO | AI);
            }
            Instruction::Tar => {
                steps[2] = word!(IO | MI);
                steps[3] = word!(AO | RI);
            }
            Instruction::Add => {
                steps[2] = word!(IO | MI);
                steps[3] = word!(RO | BI);
                steps[4] = word!(EO | AI | FI);
            }
            Instruction::Sub => {
                steps[2] = word!(IO | MI);
                steps[3] = word!(RO | BI);
                steps[4] = word!(EO | AI | FI | SU);
            }
            Instruction::Bra => steps[2] = word!(IO | J),
            Instruction::Brr => steps[2] = word!(AO | J),
            Instruction::Bcs => {
                if flags.contains(Flags::CARRY) {
                    steps[2] = word!(IO | J);
                }
            }
            Instruction::Bzs => {
                if flags.contains(Flags::ZERO) {
                    steps[2] = word!(IO | J);
                }
            }
        }
        steps
    }
}

/// Every microprogram, one row per opcode and flag combination.
///
/// Row `opcode * 4 + flags` holds the eight microsteps for that pair.
#[derive(Debug)]
pub(crate) struct ControlWordTable {
    rows: [[ControlWord; STEPS]; OPCODES * FLAG_VARIANTS],
}

pub(crate) static MICROCODE: ControlWordTable = ControlWordTable::build();

impl ControlWordTable {
    const fn build() -> Self {
        let mut rows = [[ControlWord::empty(); STEPS]; OPCODES * FLAG_VARIANTS];
        let mut row = 0;
        while row < rows.len() {
            let instruction = Instruction::from_opcode((row / FLAG_VARIANTS) as u8);
            let flags = Flags::from_value((row % FLAG_VARIANTS) as u8);
            rows[row] = instruction.microprogram(flags);
            row += 1;
        }
        ControlWordTable { rows }
    }

    pub(crate) const fn row(&self, opcode: u8, flags: Flags) -> &[ControlWord; STEPS] {
        &self.rows[(opcode & 0xF) as usize * FLAG_VARIANTS + flags.value() as usize]
    }

    pub(crate) const fn word(&self, opcode: u8, flags: Flags, step: u8) -> ControlWord {
        self.row(opcode, flags)[(step & 0x7) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_flags() -> impl Iterator<Item = Flags> {
        (0..FLAG_VARIANTS as u8).map(Flags::from_value)
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(MICROCODE.rows.len(), 64);
        assert!(MICROCODE.rows.iter().all(|row| row.len() == 8));
    }

    #[test]
    fn test_every_row_starts_with_fetch() {
        for (i, row) in MICROCODE.rows.iter().enumerate() {
            assert_eq!(row[0], ControlWord::MI | ControlWord::CO, "row {}", i);
            assert_eq!(
                row[1],
                ControlWord::RO | ControlWord::II | ControlWord::CE,
                "row {}",
                i
            );
        }
    }

    #[test]
    fn test_unconditional_rows_ignore_flags() {
        for instruction in Instruction::ALL {
            if instruction.is_conditional() {
                continue;
            }
            let first = MICROCODE.row(instruction.opcode(), Flags::empty());
            for flags in all_flags() {
                assert_eq!(
                    MICROCODE.row(instruction.opcode(), flags),
                    first,
                    "{} with flags {:?}",
                    instruction.mnemonic(),
                    flags
                );
            }
        }
    }

    #[test]
    fn test_branch_if_carry() {
        let taken = ControlWord::IO | ControlWord::J;
        for flags in all_flags() {
            let expected = if flags.value() % 2 == 1 {
                taken
            } else {
                ControlWord::empty()
            };
            assert_eq!(MICROCODE.word(14, flags, 2), expected, "flags {:?}", flags);
        }
    }

    #[test]
    fn test_branch_if_zero() {
        let taken = ControlWord::IO | ControlWord::J;
        for flags in all_flags() {
            let expected = if flags.value() >= 2 {
                taken
            } else {
                ControlWord::empty()
            };
            assert_eq!(MICROCODE.word(15, flags, 2), expected, "flags {:?}", flags);
        }
    }

    #[test]
    fn test_conditional_branches_only_differ_at_step_two() {
        for opcode in [14, 15] {
            for flags in all_flags() {
                let row = MICROCODE.row(opcode, flags);
                for step in (0..STEPS).filter(|&s| s != 2) {
                    assert_eq!(row[step], FETCH_ONLY[step]);
                }
            }
        }
    }

    #[test]
    fn test_unused_opcodes_fetch_only() {
        for opcode in [0, 3, 5, 10, 11] {
            for flags in all_flags() {
                assert_eq!(MICROCODE.row(opcode, flags), &FETCH_ONLY);
            }
        }
    }

    #[test]
    fn test_add_and_sub() {
        let add = MICROCODE.row(Instruction::Add.opcode(), Flags::empty());
        assert_eq!(add[2], ControlWord::IO | ControlWord::MI);
        assert_eq!(add[3], ControlWord::RO | ControlWord::BI);
        assert_eq!(add[4], ControlWord::EO | ControlWord::AI | ControlWord::FI);
        assert!(add[5..].iter().all(|w| w.is_empty()));

        let sub = MICROCODE.row(Instruction::Sub.opcode(), Flags::ZERO);
        assert_eq!(sub[4], add[4] | ControlWord::SU);
    }

    #[test]
    fn test_single_step_instructions() {
        let cases = [
            (Instruction::Hcf, ControlWord::HLT),
            (Instruction::Out, ControlWord::AO | ControlWord::OI),
            (Instruction::Tia, ControlWord::IO | ControlWord::AI),
            (Instruction::Bra, ControlWord::IO | ControlWord::J),
            (Instruction::Brr, ControlWord::AO | ControlWord::J),
        ];
        for (instruction, expected) in cases {
            let row = MICROCODE.row(instruction.opcode(), Flags::CARRY);
            assert_eq!(row[2], expected, "{}", instruction.mnemonic());
            assert!(row[3..].iter().all(|w| w.is_empty()));
        }
    }

    #[test]
    fn test_memory_transfers() {
        let tra = MICROCODE.row(Instruction::Tra.opcode(), Flags::empty());
        assert_eq!(tra[2], ControlWord::IO | ControlWord::MI);
        assert_eq!(tra[3], ControlWord::RO | ControlWord::AI);

        let tar = MICROCODE.row(Instruction::Tar.opcode(), Flags::empty());
        assert_eq!(tar[2], ControlWord::IO | ControlWord::MI);
        assert_eq!(tar[3], ControlWord::AO | ControlWord::RI);
    }

    #[test]
    fn test_from_opcode_round_trips() {
        for (i, instruction) in Instruction::ALL.iter().enumerate() {
            assert_eq!(instruction.opcode() as usize, i);
            assert_eq!(Instruction::from_opcode(i as u8), *instruction);
        }
        assert_eq!(Instruction::from_opcode(0x1F), Instruction::Bzs);
    }
}
