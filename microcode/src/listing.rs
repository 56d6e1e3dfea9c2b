use std::io::{self, Write};

use crate::{
    ds::{ControlSignal, Flags},
    polarity::invert,
    table::{Instruction, FLAG_VARIANTS, MICROCODE},
};

/// Prints the microcode table for humans: a legend of control lines followed
/// by each instruction's microsteps. Steps that assert nothing are skipped.
pub(crate) fn write_listing<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Control lines:")?;
    for signal in ControlSignal::ALL {
        writeln!(
            out,
            "  bit {:2}  {:<3}  {}{}",
            signal.bit(),
            signal.mnemonic(),
            signal.description(),
            if signal.is_active_low() { " (active low)" } else { "" }
        )?;
    }

    for instruction in Instruction::ALL {
        writeln!(out)?;
        writeln!(out, "{:X}  {}", instruction.opcode(), instruction.mnemonic())?;
        let variants: Vec<Flags> = if instruction.is_conditional() {
            (0..FLAG_VARIANTS as u8).map(Flags::from_value).collect()
        } else {
            vec![Flags::empty()]
        };
        for flags in variants {
            if instruction.is_conditional() {
                writeln!(out, "   flags {:02b}", flags.value())?;
            }
            let row = MICROCODE.row(instruction.opcode(), flags);
            for (step, word) in row.iter().enumerate() {
                if word.is_empty() {
                    continue;
                }
                writeln!(out, "    {}  {:<16} {}", step, word.to_string(), invert(*word))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> String {
        let mut out = Vec::new();
        write_listing(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_listing_legend() {
        let text = listing();
        assert!(text.starts_with("Control lines:\n"));
        assert!(text.contains("  bit  7  HLT  halt\n"));
        assert!(text.contains("  bit  6  MI   memory address register in (active low)\n"));
    }

    #[test]
    fn test_listing_add() {
        let text = listing();
        let add = text.split("\n\n").find(|block| block.starts_with("8  ADD")).unwrap();
        assert_eq!(
            add,
            "8  ADD\n\
             \x20   0  MI|CO            A31F\n\
             \x20   1  II|RO|CE         AF4B\n\
             \x20   2  IO|MI            A717\n\
             \x20   3  RO|BI            874F\n\
             \x20   4  AI|FI|EO         265D"
        );
    }

    #[test]
    fn test_listing_conditional_shows_each_flag() {
        let text = listing();
        let bcs = text.split("\n\n").find(|block| block.starts_with("E  BCS")).unwrap();
        assert_eq!(bcs.matches("flags").count(), 4);
        assert_eq!(bcs.matches("IO|J").count(), 2);
    }
}
