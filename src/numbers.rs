//! Bit field helpers shared by instruction decoding and encoding.

/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// `bits` is expected to only use its lowest `valid_bits` bits.
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits > 0 && valid_bits <= 16);
    let most_significant_bit = (bits >> (valid_bits - 1)) & 1;
    if most_significant_bit == 1 && valid_bits < 16 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// Gives the value of the field of `length` bits whose most significant bit is `high_bit`,
/// bit index 0 being the least significant bit of `instruction`.
///
/// With `signed` set the field is read as two's complement and widened to 16 bits.
///
/// # Panics
/// - in debug builds if the field does not fit into 16 bits
#[must_use]
pub const fn extract(instruction: u16, high_bit: u8, length: u8, signed: bool) -> u16 {
    debug_assert!(length > 0 && length <= 16, "field length out of range");
    debug_assert!(high_bit < 16 && high_bit + 1 >= length, "field exceeds u16");
    let shifted = instruction >> (high_bit + 1 - length);
    let mask = if length == 16 {
        0xFFFF
    } else {
        (1u16 << length) - 1
    };
    let value = shifted & mask;
    if signed {
        sign_extend(value, length)
    } else {
        value
    }
}

/// Reverse of [`extract`]: puts the lowest `length` bits of `value` at the field position.
#[must_use]
pub const fn place(value: u16, high_bit: u8, length: u8) -> u16 {
    let mask = if length == 16 {
        0xFFFF
    } else {
        (1u16 << length) - 1
    };
    (value & mask) << (high_bit + 1 - length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_sign_extend_all_values() {
        for n in 1..=15u8 {
            for x in 0..=u16::MAX {
                let field = x & ((1 << n) - 1);
                let expected = if (field >> (n - 1)) & 1 == 0 {
                    field
                } else {
                    field | (0xFFFF << n)
                };
                assert_eq!(sign_extend(field, n), expected, "x: {x:#06X}, n: {n}");
            }
        }
    }

    #[gtest]
    pub fn test_sign_extend_matches_twos_complement_widening() {
        expect_that!(sign_extend(0b11111, 5).cast_signed(), eq(-1));
        expect_that!(sign_extend(0b10000, 5).cast_signed(), eq(-16));
        expect_that!(sign_extend(0b01111, 5).cast_signed(), eq(15));
        expect_that!(sign_extend(0x100, 9).cast_signed(), eq(-256));
        expect_that!(sign_extend(0x400, 11).cast_signed(), eq(-1024));
    }

    #[parameterized(
        opcode = { 0b1010_101_001010101, 15, 4, false, 0b1010 },
        dr = { 0b1010_101_001010101, 11, 3, false, 0b101 },
        imm5_negative = { 0x16FF, 4, 5, true, 0xFFFF },
        imm5_unsigned = { 0x16FF, 4, 5, false, 0b11111 },
        pc_offset9_positive = { 0xE005, 8, 9, true, 5 },
        pc_offset9_negative = { 0b0010_100_1_1011_1100, 8, 9, true, 0xFFBC },
        pc_offset11 = { 0b0100_1_00110100001, 10, 11, true, 0x1A1 },
        trap_vector = { 0xF025, 7, 8, false, 0x25 },
        whole_word = { 0xBEEF, 15, 16, false, 0xBEEF },
    )]
    fn test_extract(instruction: u16, high_bit: u8, length: u8, signed: bool, expected: u16) {
        assert_that!(extract(instruction, high_bit, length, signed), eq(expected));
    }

    #[gtest]
    pub fn test_place_inverts_extract() {
        let word = 0b0001_011_010_1_01110;
        let rebuilt = place(extract(word, 15, 4, false), 15, 4)
            | place(extract(word, 11, 3, false), 11, 3)
            | place(extract(word, 8, 3, false), 8, 3)
            | place(extract(word, 5, 1, false), 5, 1)
            | place(extract(word, 4, 5, true), 4, 5);
        expect_that!(rebuilt, eq(word));
    }
}
