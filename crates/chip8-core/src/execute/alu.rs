//! Pure arithmetic helpers returning `(result, flag)` pairs.

/// Adds with carry: `flag` is set when the 16-bit sum exceeds 255.
#[must_use]
pub const fn add_with_carry(a: u8, b: u8) -> (u8, bool) {
    let sum = a as u16 + b as u16;
    (sum as u8, sum > 0xFF)
}

/// Subtracts `b` from `a`: `flag` is set when no borrow occurs (`a >= b`).
#[must_use]
pub const fn sub_with_borrow(a: u8, b: u8) -> (u8, bool) {
    (a.wrapping_sub(b), a >= b)
}

/// Shifts right by one: `flag` is the bit shifted out.
#[must_use]
pub const fn shift_right(value: u8) -> (u8, bool) {
    (value >> 1, value & 0x01 != 0)
}

/// Shifts left by one: `flag` is the bit shifted out.
#[must_use]
pub const fn shift_left(value: u8) -> (u8, bool) {
    (value << 1, value & 0x80 != 0)
}

/// Decimal digits of `value`: hundreds, tens, ones.
#[must_use]
pub const fn bcd_digits(value: u8) -> [u8; 3] {
    [value / 100, (value / 10) % 10, value % 10]
}
