//! Memory model primitives and fixed region map.

/// Deterministic fetch/read/write legality helpers.
pub mod access;
/// Built-in hexadecimal font set.
pub mod font;
/// Fixed memory-region map and address decoder.
pub mod map;

pub use access::{
    read_bytes, read_u16_be, validate_fetch_access, validate_read_range, validate_write_range,
    write_bytes, INSTRUCTION_BYTES,
};
pub use font::{glyph_address, FONT_GLYPH_BYTES, FONT_GLYPH_COUNT, FONT_SET, FONT_START};
pub use map::{
    decode_memory_region, MemoryRegion, RegionDescriptor, FIXED_MEMORY_REGIONS, INTERPRETER_END,
    INTERPRETER_START, PROGRAM_END, PROGRAM_START,
};

/// Size in bytes of the flat architectural address space (4 KiB).
pub const MEMORY_BYTES: usize = 4096;

/// Bytes available to a program image loaded at [`PROGRAM_START`].
pub const PROGRAM_CAPACITY_BYTES: usize = MEMORY_BYTES - PROGRAM_START as usize;

/// Allocates a zeroed 4 KiB address-space backing store.
#[must_use]
pub fn new_address_space() -> Box<[u8]> {
    vec![0; MEMORY_BYTES].into_boxed_slice()
}

/// Allocates a 4 KiB address space with the font set installed.
#[must_use]
pub fn new_address_space_with_font() -> Box<[u8]> {
    let mut memory = new_address_space();
    install_font(&mut memory);
    memory
}

/// Copies the font set into its fixed location.
pub fn install_font(memory: &mut [u8]) {
    let start = usize::from(FONT_START);
    memory[start..start + FONT_SET.len()].copy_from_slice(&FONT_SET);
}
