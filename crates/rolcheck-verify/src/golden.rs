//! Golden reference model for left rotation
//!
//! Words are carried in a `u64` and interpreted as `width`-bit values,
//! `1 <= width <= 64`. Callers are expected to have validated the width
//! (see [`crate::config::Parameters`]).

/// Largest supported data width
pub const MAX_WIDTH: u32 = 64;

/// Mask selecting the low `width` bits of a word
pub fn word_mask(width: u32) -> u64 {
    if width >= MAX_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Minimal number of bits able to represent any shift amount in `[0, width)`
///
/// This is `ceil(log2(width))`; a 1-bit word has nothing to rotate and needs
/// no shift bits at all.
pub fn shift_width_for(width: u32) -> u32 {
    if width <= 1 {
        0
    } else {
        u32::BITS - (width - 1).leading_zeros()
    }
}

/// Rotate `value` left by `amount` positions as a `width`-bit word
///
/// The amount is reduced modulo the width, so every amount is legal. Bits of
/// `value` above the width are ignored.
pub fn rotate_left(value: u64, amount: u64, width: u32) -> u64 {
    let mask = word_mask(width);
    let value = value & mask;
    let amount = amount % u64::from(width);

    // A right shift by the full width would overflow the host shift.
    if amount == 0 {
        return value;
    }

    ((value << amount) & mask) | (value >> (u64::from(width) - amount))
}
