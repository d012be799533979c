//! Behavioral models of the two rotate-left circuits
//!
//! Both models see only the low `shift_width` bits of the shift amount, as
//! the hardware port would, and only the low `width` bits of the data.

use rolcheck_verify::{shift_width_for, word_mask};

/// Barrel rotator: one stage per shift-amount bit
///
/// Stage `k` rotates by `2^k` (mod width) when bit `k` of `shamt` is set, so
/// the stages compose to a rotation by `shamt` mod width.
pub fn shift_rotate(data: u64, shamt: u64, width: u32) -> u64 {
    let mask = word_mask(width);
    let mut value = data & mask;

    for stage in 0..shift_width_for(width) {
        if (shamt >> stage) & 1 == 0 {
            continue;
        }
        let amount = (1u64 << stage) % u64::from(width);
        if amount != 0 {
            value = ((value << amount) | (value >> (u64::from(width) - amount))) & mask;
        }
    }

    value
}

/// Border rearrangement: the word is cut at `width - s` and the two slices
/// swap places, `{data[width-s-1:0], data[width-1:width-s]}`
pub fn borders_rotate(data: u64, shamt: u64, width: u32) -> u64 {
    let data = data & word_mask(width);
    let port_shamt = shamt & ((1u64 << shift_width_for(width)) - 1);
    let s = (port_shamt % u64::from(width)) as u32;
    if s == 0 {
        return data;
    }

    let border = width - s;
    let low = data & word_mask(border);
    let high = data >> border;
    (low << s) | high
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolcheck_verify::rotate_left;

    #[test]
    fn test_models_match_golden_small_widths() {
        for width in 1..=9u32 {
            let shamt_space = 1u64 << shift_width_for(width);
            for data in 0..(1u64 << width) {
                for shamt in 0..shamt_space {
                    let golden = rotate_left(data, shamt, width);
                    assert_eq!(
                        shift_rotate(data, shamt, width),
                        golden,
                        "shift w={width} d={data} s={shamt}"
                    );
                    assert_eq!(
                        borders_rotate(data, shamt, width),
                        golden,
                        "borders w={width} d={data} s={shamt}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_models_full_width() {
        let data = 0x8000_0000_0000_0001;
        for shamt in 0..64 {
            assert_eq!(shift_rotate(data, shamt, 64), data.rotate_left(shamt as u32));
            assert_eq!(borders_rotate(data, shamt, 64), data.rotate_left(shamt as u32));
        }
    }

    #[test]
    fn test_shamt_bits_beyond_port_ignored() {
        // width 5 has a 3-bit shift port, so 0b1001 arrives as 1
        assert_eq!(shift_rotate(0x01, 0b1001, 5), 0x02);
        assert_eq!(borders_rotate(0x01, 0b1001, 5), 0x02);
    }
}
