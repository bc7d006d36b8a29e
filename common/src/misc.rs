
/// Widen a two's-complement value of `bit_count` bits to 16 bits by
/// replicating its sign bit into the new high bits. Valid for widths 1
/// through 16.
pub fn sign_extend(value: u16, bit_count: u16) -> u16 {
    debug_assert!((1..=16).contains(&bit_count));
    if (value >> (bit_count - 1)) & 0x1 != 0 {
        // u32 so the shift is in range when bit_count is 16.
        value | ((0xffffu32 << bit_count) as u16)
    } else {
        value
    }
}
