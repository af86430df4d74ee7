//! Instruction decoder.
//!
//! Splits a fetched instruction word into its classified form and operand
//! fields. Field extraction is uniform across forms; each executor reads only
//! the fields its form defines.

use crate::encoding::{classify_opcode, OpcodeEncoding};
use crate::{Fault, Register};

/// Decoded instruction with all operand fields extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Raw instruction word as fetched.
    pub raw: u16,
    /// Classified instruction form.
    pub encoding: OpcodeEncoding,
    /// Register index from bits 8..=11.
    pub x: Register,
    /// Register index from bits 4..=7.
    pub y: Register,
    /// Nibble from bits 0..=3.
    pub n: u8,
    /// Immediate byte from bits 0..=7.
    pub nn: u8,
    /// Address from bits 0..=11.
    pub nnn: u16,
}

/// Instruction decoder for the CHIP-8 instruction set.
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    ///
    /// # Errors
    ///
    /// Returns [`Fault::UnimplementedOpcode`] carrying `word` when it does not
    /// match a known family/sub-opcode pair.
    pub const fn decode(word: u16) -> Result<DecodedInstruction, Fault> {
        let Some(encoding) = classify_opcode(word) else {
            return Err(Fault::UnimplementedOpcode(word));
        };

        Ok(DecodedInstruction {
            raw: word,
            encoding,
            x: Register::from_nibble((word >> 8) as u8),
            y: Register::from_nibble((word >> 4) as u8),
            n: (word & 0x000F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        })
    }
}
