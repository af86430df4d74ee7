//! Deterministic opcode classification tables.

/// Every instruction form the engine executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OpcodeEncoding {
    /// `00E0` clear the screen.
    Cls,
    /// `00EE` return from subroutine.
    Ret,
    /// `1NNN` jump.
    Jp,
    /// `2NNN` call subroutine.
    Call,
    /// `3XNN` skip if `VX == NN`.
    SeImm,
    /// `4XNN` skip if `VX != NN`.
    SneImm,
    /// `5XY0` skip if `VX == VY`.
    SeReg,
    /// `6XNN` set `VX = NN`.
    LdImm,
    /// `7XNN` add `NN` to `VX` without flag.
    AddImm,
    /// `8XY0` set `VX = VY`.
    LdReg,
    /// `8XY1` `VX |= VY`.
    Or,
    /// `8XY2` `VX &= VY`.
    And,
    /// `8XY3` `VX ^= VY`.
    Xor,
    /// `8XY4` add with carry.
    AddReg,
    /// `8XY5` `VX -= VY` with borrow.
    Sub,
    /// `8XY6` shift right.
    Shr,
    /// `8XY7` `VX = VY - VX` with borrow.
    Subn,
    /// `8XYE` shift left.
    Shl,
    /// `9XY0` skip if `VX != VY`.
    SneReg,
    /// `ANNN` set `I = NNN`.
    LdI,
    /// `BNNN` jump to `NNN + V0`.
    JpOffset,
    /// `CXNN` random byte masked by `NN`.
    Rnd,
    /// `DXYN` draw sprite.
    Drw,
    /// `EX9E` skip if key `VX` is latched.
    Skp,
    /// `EXA1` skip if key `VX` is not latched.
    Sknp,
    /// `FX07` read delay timer.
    LdFromDelay,
    /// `FX0A` wait for a key.
    LdKey,
    /// `FX15` set delay timer.
    LdDelay,
    /// `FX18` set sound timer.
    LdSound,
    /// `FX1E` add `VX` to `I`.
    AddI,
    /// `FX29` point `I` at font glyph.
    LdGlyph,
    /// `FX33` store BCD of `VX`.
    Bcd,
    /// `FX55` store `V0..=VX`.
    Store,
    /// `FX65` load `V0..=VX`.
    Load,
}

/// Top nibble of an instruction word.
#[must_use]
pub const fn opcode_family(word: u16) -> u8 {
    (word >> 12) as u8
}

/// Classifies an instruction word by family and sub-opcode.
///
/// Returns `None` for words that do not name a known instruction.
#[must_use]
pub const fn classify_opcode(word: u16) -> Option<OpcodeEncoding> {
    let low_nibble = word & 0x000F;
    let low_byte = word & 0x00FF;

    let encoding = match opcode_family(word) {
        0x0 => match word {
            0x00E0 => OpcodeEncoding::Cls,
            0x00EE => OpcodeEncoding::Ret,
            _ => return None,
        },
        0x1 => OpcodeEncoding::Jp,
        0x2 => OpcodeEncoding::Call,
        0x3 => OpcodeEncoding::SeImm,
        0x4 => OpcodeEncoding::SneImm,
        0x5 if low_nibble == 0 => OpcodeEncoding::SeReg,
        0x6 => OpcodeEncoding::LdImm,
        0x7 => OpcodeEncoding::AddImm,
        0x8 => match low_nibble {
            0x0 => OpcodeEncoding::LdReg,
            0x1 => OpcodeEncoding::Or,
            0x2 => OpcodeEncoding::And,
            0x3 => OpcodeEncoding::Xor,
            0x4 => OpcodeEncoding::AddReg,
            0x5 => OpcodeEncoding::Sub,
            0x6 => OpcodeEncoding::Shr,
            0x7 => OpcodeEncoding::Subn,
            0xE => OpcodeEncoding::Shl,
            _ => return None,
        },
        0x9 if low_nibble == 0 => OpcodeEncoding::SneReg,
        0xA => OpcodeEncoding::LdI,
        0xB => OpcodeEncoding::JpOffset,
        0xC => OpcodeEncoding::Rnd,
        0xD => OpcodeEncoding::Drw,
        0xE => match low_byte {
            0x9E => OpcodeEncoding::Skp,
            0xA1 => OpcodeEncoding::Sknp,
            _ => return None,
        },
        0xF => match low_byte {
            0x07 => OpcodeEncoding::LdFromDelay,
            0x0A => OpcodeEncoding::LdKey,
            0x15 => OpcodeEncoding::LdDelay,
            0x18 => OpcodeEncoding::LdSound,
            0x1E => OpcodeEncoding::AddI,
            0x29 => OpcodeEncoding::LdGlyph,
            0x33 => OpcodeEncoding::Bcd,
            0x55 => OpcodeEncoding::Store,
            0x65 => OpcodeEncoding::Load,
            _ => return None,
        },
        _ => return None,
    };

    Some(encoding)
}

/// Mask/pattern description of one instruction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodingPattern {
    /// Instruction form.
    pub encoding: OpcodeEncoding,
    /// Bits that are fixed by the form.
    pub mask: u16,
    /// Value of the fixed bits.
    pub pattern: u16,
}

const fn pattern(encoding: OpcodeEncoding, mask: u16, pattern: u16) -> EncodingPattern {
    EncodingPattern {
        encoding,
        mask,
        pattern,
    }
}

/// Single source-of-truth encoding table, in family order.
pub const OPCODE_ENCODING_TABLE: [EncodingPattern; 34] = [
    pattern(OpcodeEncoding::Cls, 0xFFFF, 0x00E0),
    pattern(OpcodeEncoding::Ret, 0xFFFF, 0x00EE),
    pattern(OpcodeEncoding::Jp, 0xF000, 0x1000),
    pattern(OpcodeEncoding::Call, 0xF000, 0x2000),
    pattern(OpcodeEncoding::SeImm, 0xF000, 0x3000),
    pattern(OpcodeEncoding::SneImm, 0xF000, 0x4000),
    pattern(OpcodeEncoding::SeReg, 0xF00F, 0x5000),
    pattern(OpcodeEncoding::LdImm, 0xF000, 0x6000),
    pattern(OpcodeEncoding::AddImm, 0xF000, 0x7000),
    pattern(OpcodeEncoding::LdReg, 0xF00F, 0x8000),
    pattern(OpcodeEncoding::Or, 0xF00F, 0x8001),
    pattern(OpcodeEncoding::And, 0xF00F, 0x8002),
    pattern(OpcodeEncoding::Xor, 0xF00F, 0x8003),
    pattern(OpcodeEncoding::AddReg, 0xF00F, 0x8004),
    pattern(OpcodeEncoding::Sub, 0xF00F, 0x8005),
    pattern(OpcodeEncoding::Shr, 0xF00F, 0x8006),
    pattern(OpcodeEncoding::Subn, 0xF00F, 0x8007),
    pattern(OpcodeEncoding::Shl, 0xF00F, 0x800E),
    pattern(OpcodeEncoding::SneReg, 0xF00F, 0x9000),
    pattern(OpcodeEncoding::LdI, 0xF000, 0xA000),
    pattern(OpcodeEncoding::JpOffset, 0xF000, 0xB000),
    pattern(OpcodeEncoding::Rnd, 0xF000, 0xC000),
    pattern(OpcodeEncoding::Drw, 0xF000, 0xD000),
    pattern(OpcodeEncoding::Skp, 0xF0FF, 0xE09E),
    pattern(OpcodeEncoding::Sknp, 0xF0FF, 0xE0A1),
    pattern(OpcodeEncoding::LdFromDelay, 0xF0FF, 0xF007),
    pattern(OpcodeEncoding::LdKey, 0xF0FF, 0xF00A),
    pattern(OpcodeEncoding::LdDelay, 0xF0FF, 0xF015),
    pattern(OpcodeEncoding::LdSound, 0xF0FF, 0xF018),
    pattern(OpcodeEncoding::AddI, 0xF0FF, 0xF01E),
    pattern(OpcodeEncoding::LdGlyph, 0xF0FF, 0xF029),
    pattern(OpcodeEncoding::Bcd, 0xF0FF, 0xF033),
    pattern(OpcodeEncoding::Store, 0xF0FF, 0xF055),
    pattern(OpcodeEncoding::Load, 0xF0FF, 0xF065),
];

impl OpcodeEncoding {
    /// Returns `true` for forms that set `PC` explicitly instead of advancing.
    #[must_use]
    pub const fn redirects_pc(self) -> bool {
        matches!(self, Self::Ret | Self::Jp | Self::Call | Self::JpOffset)
    }

    /// Returns `true` for forms that may overwrite `VF` as a flag.
    #[must_use]
    pub const fn writes_flag(self) -> bool {
        matches!(
            self,
            Self::AddReg | Self::Sub | Self::Shr | Self::Subn | Self::Shl | Self::Drw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_opcode, opcode_family, OpcodeEncoding, OPCODE_ENCODING_TABLE};

    fn classify_by_table(word: u16) -> Option<OpcodeEncoding> {
        OPCODE_ENCODING_TABLE
            .iter()
            .find(|entry| word & entry.mask == entry.pattern)
            .map(|entry| entry.encoding)
    }

    #[test]
    fn family_is_top_nibble() {
        assert_eq!(opcode_family(0xD123), 0xD);
        assert_eq!(opcode_family(0x00E0), 0x0);
    }

    #[test]
    fn classifier_agrees_with_table_for_every_word() {
        for word in 0_u16..=u16::MAX {
            assert_eq!(
                classify_opcode(word),
                classify_by_table(word),
                "word {word:#06X}"
            );
        }
    }

    #[test]
    fn table_patterns_do_not_overlap() {
        for (index, entry) in OPCODE_ENCODING_TABLE.iter().enumerate() {
            for other in &OPCODE_ENCODING_TABLE[index + 1..] {
                let shared = entry.mask & other.mask;
                assert_ne!(
                    entry.pattern & shared,
                    other.pattern & shared,
                    "{:?} overlaps {:?}",
                    entry.encoding,
                    other.encoding
                );
            }
        }
    }

    #[test]
    fn machine_code_routines_are_not_classified() {
        assert_eq!(classify_opcode(0x0000), None);
        assert_eq!(classify_opcode(0x0123), None);
        assert_eq!(classify_opcode(0x00E1), None);
    }

    #[test]
    fn register_compare_forms_require_zero_low_nibble() {
        assert_eq!(classify_opcode(0x5120), Some(OpcodeEncoding::SeReg));
        assert_eq!(classify_opcode(0x5121), None);
        assert_eq!(classify_opcode(0x9120), Some(OpcodeEncoding::SneReg));
        assert_eq!(classify_opcode(0x912F), None);
    }

    #[test]
    fn unassigned_sub_opcodes_are_rejected() {
        for word in [0x8008, 0x800F, 0xE09F, 0xF000, 0xF0FF] {
            assert_eq!(classify_opcode(word), None, "word {word:#06X}");
        }
    }

    #[test]
    fn control_flow_forms_redirect_pc() {
        assert!(OpcodeEncoding::Jp.redirects_pc());
        assert!(OpcodeEncoding::Ret.redirects_pc());
        assert!(!OpcodeEncoding::SeImm.redirects_pc());
        assert!(OpcodeEncoding::Drw.writes_flag());
        assert!(!OpcodeEncoding::Or.writes_flag());
    }
}
