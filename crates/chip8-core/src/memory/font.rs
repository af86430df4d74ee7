//! Built-in hexadecimal font set installed in the interpreter area.

/// Address of the first glyph byte.
pub const FONT_START: u16 = 0x000;
/// Bytes per glyph; each glyph is 4 pixels wide and 5 rows tall.
pub const FONT_GLYPH_BYTES: u16 = 5;
/// Number of glyphs (`0..=F`).
pub const FONT_GLYPH_COUNT: usize = 16;

/// Glyph rows for the hexadecimal digits `0..=F`, in digit order.
pub const FONT_SET: [u8; FONT_GLYPH_COUNT * FONT_GLYPH_BYTES as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

const _: () = assert!(
    (FONT_START as usize) + FONT_SET.len() <= crate::PROGRAM_START as usize,
    "font set must fit inside the interpreter area"
);

/// Returns the address of the glyph for the low nibble of `digit`.
#[must_use]
pub const fn glyph_address(digit: u8) -> u16 {
    FONT_START + (digit & 0x0F) as u16 * FONT_GLYPH_BYTES
}

#[cfg(test)]
mod tests {
    use super::{glyph_address, FONT_GLYPH_BYTES, FONT_SET, FONT_START};

    #[test]
    fn glyph_addresses_step_by_glyph_size() {
        assert_eq!(glyph_address(0x0), FONT_START);
        assert_eq!(glyph_address(0x1), FONT_START + FONT_GLYPH_BYTES);
        assert_eq!(glyph_address(0xF), FONT_START + 15 * FONT_GLYPH_BYTES);
    }

    #[test]
    fn only_the_low_nibble_selects_a_glyph() {
        assert_eq!(glyph_address(0x3A), glyph_address(0x0A));
    }

    #[test]
    fn glyph_zero_is_a_closed_box() {
        let start = usize::from(glyph_address(0));
        assert_eq!(&FONT_SET[start..start + 5], &[0xF0, 0x90, 0x90, 0x90, 0xF0]);
    }
}
