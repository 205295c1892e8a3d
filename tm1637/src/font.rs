//! Segment masks for the handful of characters a thermometer needs to show.
//!
//! Bits 0 to 6 light segments a to g; bit 7 lights the decimal point (or the colon, on displays
//! that wire it to the second digit).

/// Decimal point, OR it onto any other mask
pub const DECIMAL_POINT: u8 = 0b1000_0000;

/// Nothing lit
pub const BLANK: u8 = 0x00;

/// Segment g alone
pub const MINUS: u8 = 0x40;

/// The letters of the "OFL" (overflow) and "Err" markers.
///
/// Note `R_LOWER` lights segments e and f, not the usual e and g.
pub const O_UPPER: u8 = 0x3F;
pub const F_UPPER: u8 = 0x71;
pub const L_UPPER: u8 = 0x38;
pub const E_UPPER: u8 = 0x79;
pub const R_LOWER: u8 = 0x60;

/// Segment masks for the decimal digits, indexed by value.
const DIGIT_TABLE: [u8; 10] = [
    0x3F, /* 0 */
    0x06, /* 1 */
    0x5B, /* 2 */
    0x4F, /* 3 */
    0x66, /* 4 */
    0x6D, /* 5 */
    0x7D, /* 6 */
    0x07, /* 7 */
    0x7F, /* 8 */
    0x6F, /* 9 */
];

/// Segment mask for a decimal digit, or `None` if `value` isn't one
pub fn digit(value: u8) -> Option<u8> {
    DIGIT_TABLE.get(value as usize).copied()
}

/// The digit shown by a segment mask, ignoring the decimal point.  Inverse of [`digit`].
#[cfg(test)]
pub fn decode_digit(mask: u8) -> Option<u8> {
    let segments = mask & !DECIMAL_POINT;

    DIGIT_TABLE
        .iter()
        .position(|candidate| *candidate == segments)
        .map(|index| index as u8)
}
