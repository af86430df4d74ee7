use crate::PROGRAM_START;

/// Number of architecturally visible general-purpose registers (`V0..VF`).
pub const GENERAL_REGISTER_COUNT: usize = 16;

/// Architecturally visible general-purpose register identifier.
///
/// `VF` doubles as the carry/borrow/collision flag and is overwritten
/// implicitly by arithmetic, shift and draw instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Register {
    V0 = 0x0,
    V1 = 0x1,
    V2 = 0x2,
    V3 = 0x3,
    V4 = 0x4,
    V5 = 0x5,
    V6 = 0x6,
    V7 = 0x7,
    V8 = 0x8,
    V9 = 0x9,
    VA = 0xA,
    VB = 0xB,
    VC = 0xC,
    VD = 0xD,
    VE = 0xE,
    VF = 0xF,
}

impl Register {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::V0,
        Self::V1,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::VA,
        Self::VB,
        Self::VC,
        Self::VD,
        Self::VE,
        Self::VF,
    ];

    /// The flag register.
    pub const FLAG: Self = Self::VF;

    /// Returns the array index for this register (`0..=15`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes the low nibble of `bits` into a register.
    #[must_use]
    pub const fn from_nibble(bits: u8) -> Self {
        Self::ALL[(bits & 0x0F) as usize]
    }
}

/// Register file and pointer registers of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ArchitecturalState {
    v: [u8; GENERAL_REGISTER_COUNT],
    i: u16,
    pc: u16,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            v: [0; GENERAL_REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn v(&self, reg: Register) -> u8 {
        self.v[reg.index()]
    }

    /// Writes a general-purpose register.
    pub const fn set_v(&mut self, reg: Register, value: u8) {
        self.v[reg.index()] = value;
    }

    /// Reads the whole register file in index order.
    #[must_use]
    pub const fn registers(&self) -> &[u8; GENERAL_REGISTER_COUNT] {
        &self.v
    }

    /// Reads `VF`.
    #[must_use]
    pub const fn flag(&self) -> u8 {
        self.v[Register::FLAG.index()]
    }

    /// Writes `VF` as `1` or `0`.
    pub const fn set_flag(&mut self, set: bool) {
        self.v[Register::FLAG.index()] = set as u8;
    }

    /// Reads the `I` address register.
    #[must_use]
    pub const fn i(&self) -> u16 {
        self.i
    }

    /// Writes the `I` address register.
    pub const fn set_i(&mut self, value: u16) {
        self.i = value;
    }

    /// Reads the program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the program counter.
    pub const fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }
}
