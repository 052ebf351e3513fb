//! # Alignment Math
//!
//! Small integer helpers used throughout the layout code.

/// Round `value` up to a power-of-two `align`
#[inline]
pub const fn align_u32(value: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Round `value` up to a power-of-two `align`
#[inline]
pub const fn align_u64(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Round `value` up to any non-zero multiple of `align`
#[inline]
pub const fn align_npot(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// Floor of log2, with `log2(0) == 0`
#[inline]
pub const fn log2(value: u32) -> u32 {
    if value == 0 { 0 } else { 31 - value.leading_zeros() }
}

/// Floor of log2, with `log2(0) == 0`
#[inline]
pub const fn log2_u64(value: u64) -> u32 {
    if value == 0 { 0 } else { 63 - value.leading_zeros() }
}

/// Size of mip `level` along an axis of `base` texels
#[inline]
pub const fn minify(base: u32, level: u32) -> u32 {
    let v = base >> level;
    if v == 0 { 1 } else { v }
}

/// Next power of two, with `next_pow2(0) == 1`
#[inline]
pub const fn next_pow2(value: u32) -> u32 {
    if value <= 1 { 1 } else { value.next_power_of_two() }
}
