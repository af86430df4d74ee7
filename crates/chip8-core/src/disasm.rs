//! Instruction disassembly.
//!
//! Converts raw instruction words into conventional CHIP-8 assembly text for
//! trace logs and debugger views.

use crate::decoder::{DecodedInstruction, Decoder};
use crate::encoding::OpcodeEncoding;
use crate::{Register, INSTRUCTION_BYTES};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single disassembled instruction row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisassemblyRow {
    /// Address of the instruction.
    pub addr: u16,
    /// Raw instruction word.
    pub raw_word: u16,
    /// Mnemonic (e.g. `"LD"`, `"DRW"`, `".word"`).
    pub mnemonic: String,
    /// Formatted operands (e.g. `"V0, 0x05"`).
    pub operands: String,
    /// Whether the word does not decode.
    pub is_illegal: bool,
}

impl DisassemblyRow {
    /// Mnemonic and operands joined into one line.
    #[must_use]
    pub fn text(&self) -> String {
        if self.operands.is_empty() {
            self.mnemonic.clone()
        } else {
            format!("{} {}", self.mnemonic, self.operands)
        }
    }
}

/// Renders one instruction word, e.g. `DRW V0, V1, 5`.
///
/// Words that do not decode render as `.word 0xXXXX`.
#[must_use]
pub fn disassemble_word(word: u16) -> String {
    let (mnemonic, operands) = render(word);
    if operands.is_empty() {
        mnemonic.to_string()
    } else {
        format!("{mnemonic} {operands}")
    }
}

/// Disassembles a window of instructions around `center_pc`.
///
/// Produces up to `before` rows ahead of the center, the center row, and up
/// to `after` rows following it. Instructions are fixed width, so backward
/// rows are found by stepping back two bytes at a time. Rows whose word
/// would extend past `memory` are omitted.
#[must_use]
pub fn disassemble_window(
    center_pc: u16,
    before: usize,
    after: usize,
    memory: &[u8],
) -> Vec<DisassemblyRow> {
    let step = usize::from(INSTRUCTION_BYTES);
    let center = usize::from(center_pc);
    let first = center - before.min(center / step) * step;
    let last = center
        .saturating_add(after.saturating_mul(step))
        .min(memory.len().saturating_sub(step));
    if last < first {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity((last - first) / step + 1);
    let mut addr = first;
    while addr <= last {
        let Ok(pc) = u16::try_from(addr) else {
            break;
        };
        let Some(row) = disassemble_one(pc, memory) else {
            break;
        };
        rows.push(row);
        addr += step;
    }

    rows
}

fn disassemble_one(pc: u16, memory: &[u8]) -> Option<DisassemblyRow> {
    let hi = *memory.get(usize::from(pc))?;
    let lo = *memory.get(usize::from(pc) + 1)?;
    let raw_word = u16::from_be_bytes([hi, lo]);
    let (mnemonic, operands) = render(raw_word);

    Some(DisassemblyRow {
        addr: pc,
        raw_word,
        mnemonic: mnemonic.to_string(),
        operands,
        is_illegal: Decoder::decode(raw_word).is_err(),
    })
}

fn render(word: u16) -> (&'static str, String) {
    match Decoder::decode(word) {
        Ok(instr) => (mnemonic(instr.encoding), format_operands(&instr)),
        Err(_) => (".word", format!("0x{word:04X}")),
    }
}

const fn mnemonic(encoding: OpcodeEncoding) -> &'static str {
    match encoding {
        OpcodeEncoding::Cls => "CLS",
        OpcodeEncoding::Ret => "RET",
        OpcodeEncoding::Jp | OpcodeEncoding::JpOffset => "JP",
        OpcodeEncoding::Call => "CALL",
        OpcodeEncoding::SeImm | OpcodeEncoding::SeReg => "SE",
        OpcodeEncoding::SneImm | OpcodeEncoding::SneReg => "SNE",
        OpcodeEncoding::LdImm
        | OpcodeEncoding::LdReg
        | OpcodeEncoding::LdI
        | OpcodeEncoding::LdFromDelay
        | OpcodeEncoding::LdKey
        | OpcodeEncoding::LdDelay
        | OpcodeEncoding::LdSound
        | OpcodeEncoding::LdGlyph
        | OpcodeEncoding::Bcd
        | OpcodeEncoding::Store
        | OpcodeEncoding::Load => "LD",
        OpcodeEncoding::AddImm | OpcodeEncoding::AddReg | OpcodeEncoding::AddI => "ADD",
        OpcodeEncoding::Or => "OR",
        OpcodeEncoding::And => "AND",
        OpcodeEncoding::Xor => "XOR",
        OpcodeEncoding::Sub => "SUB",
        OpcodeEncoding::Shr => "SHR",
        OpcodeEncoding::Subn => "SUBN",
        OpcodeEncoding::Shl => "SHL",
        OpcodeEncoding::Rnd => "RND",
        OpcodeEncoding::Drw => "DRW",
        OpcodeEncoding::Skp => "SKP",
        OpcodeEncoding::Sknp => "SKNP",
    }
}

fn format_register(reg: Register) -> String {
    format!("V{:X}", reg.index())
}

fn format_operands(instr: &DecodedInstruction) -> String {
    let x = format_register(instr.x);
    let y = format_register(instr.y);
    let nn = instr.nn;
    let nnn = instr.nnn;

    match instr.encoding {
        OpcodeEncoding::Cls | OpcodeEncoding::Ret => String::new(),
        OpcodeEncoding::Jp | OpcodeEncoding::Call => format!("0x{nnn:03X}"),
        OpcodeEncoding::JpOffset => format!("V0, 0x{nnn:03X}"),
        OpcodeEncoding::SeImm
        | OpcodeEncoding::SneImm
        | OpcodeEncoding::LdImm
        | OpcodeEncoding::AddImm
        | OpcodeEncoding::Rnd => format!("{x}, 0x{nn:02X}"),
        OpcodeEncoding::SeReg
        | OpcodeEncoding::SneReg
        | OpcodeEncoding::LdReg
        | OpcodeEncoding::Or
        | OpcodeEncoding::And
        | OpcodeEncoding::Xor
        | OpcodeEncoding::AddReg
        | OpcodeEncoding::Sub
        | OpcodeEncoding::Shr
        | OpcodeEncoding::Subn
        | OpcodeEncoding::Shl => format!("{x}, {y}"),
        OpcodeEncoding::LdI => format!("I, 0x{nnn:03X}"),
        OpcodeEncoding::Drw => format!("{x}, {y}, {}", instr.n),
        OpcodeEncoding::Skp | OpcodeEncoding::Sknp => x,
        OpcodeEncoding::LdFromDelay => format!("{x}, DT"),
        OpcodeEncoding::LdKey => format!("{x}, K"),
        OpcodeEncoding::LdDelay => format!("DT, {x}"),
        OpcodeEncoding::LdSound => format!("ST, {x}"),
        OpcodeEncoding::AddI => format!("I, {x}"),
        OpcodeEncoding::LdGlyph => format!("F, {x}"),
        OpcodeEncoding::Bcd => format!("B, {x}"),
        OpcodeEncoding::Store => format!("[I], {x}"),
        OpcodeEncoding::Load => format!("{x}, [I]"),
    }
}
