//! Fixed architectural memory-region map and decoding helpers.

/// Inclusive start address of the interpreter region.
pub const INTERPRETER_START: u16 = 0x000;
/// Inclusive end address of the interpreter region.
pub const INTERPRETER_END: u16 = 0x1FF;
/// Inclusive start address of the program region; also the reset `PC`.
pub const PROGRAM_START: u16 = 0x200;
/// Inclusive end address of the program region.
pub const PROGRAM_END: u16 = 0xFFF;

/// Canonical fixed-region descriptor for the architectural memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    /// Region classification.
    pub region: MemoryRegion,
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

/// Region classification for architectural addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Interpreter data and font set (`0x000..=0x1FF`).
    Interpreter,
    /// Program code and data (`0x200..=0xFFF`).
    Program,
}

impl MemoryRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::Interpreter => (INTERPRETER_START, INTERPRETER_END),
            Self::Program => (PROGRAM_START, PROGRAM_END),
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        let (start, end) = self.bounds();
        addr >= start && addr <= end
    }

    /// Returns the canonical descriptor for this region.
    #[must_use]
    pub const fn descriptor(self) -> RegionDescriptor {
        let (start, end) = self.bounds();
        RegionDescriptor {
            region: self,
            start,
            end,
        }
    }

    /// Size of the region in bytes.
    #[must_use]
    pub const fn len(self) -> usize {
        let (start, end) = self.bounds();
        (end - start) as usize + 1
    }
}

/// Canonical fixed architectural region layout in ascending address order.
pub const FIXED_MEMORY_REGIONS: [RegionDescriptor; 2] = [
    MemoryRegion::Interpreter.descriptor(),
    MemoryRegion::Program.descriptor(),
];

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    assert!(
        FIXED_MEMORY_REGIONS[0].start == 0,
        "interpreter region must start at address zero"
    );
    assert!(
        FIXED_MEMORY_REGIONS[0].end + 1 == FIXED_MEMORY_REGIONS[1].start,
        "regions must be contiguous"
    );
    assert!(
        FIXED_MEMORY_REGIONS[1].end as usize + 1 == super::MEMORY_BYTES,
        "program region must end at the top of memory"
    );
}

/// Decodes an address into its fixed architectural region.
///
/// Returns `None` for addresses past the end of memory.
#[must_use]
pub const fn decode_memory_region(addr: u16) -> Option<MemoryRegion> {
    if addr <= INTERPRETER_END {
        Some(MemoryRegion::Interpreter)
    } else if addr <= PROGRAM_END {
        Some(MemoryRegion::Program)
    } else {
        None
    }
}
