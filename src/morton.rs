// http://www.graphics.stanford.edu/~seander/bithacks.html#InterleaveBMN

//---------------------------------------------------
// --- 10 bit resolution per channel morton curve ---
//---------------------------------------------------

use glam::Vec3A;

/// Spreads the low 10 bits of `a` so that two zero bits separate each
/// original bit.
#[inline]
pub fn split_by_3(a: u32) -> u32 {
    let mut x = a & 0x3ff; // we only look at the first 10 bits
    x = (x | x << 16) & 0x30000ff;
    x = (x | x << 8) & 0x300f00f;
    x = (x | x << 4) & 0x30c30c3;
    x = (x | x << 2) & 0x9249249;
    x
}

#[inline]
/// Encode x,y,z bins into a 30-bit morton value, x in the most significant
/// channel. Input should be 0..1024.
pub fn morton_encode_u32(x: u32, y: u32, z: u32) -> u32 {
    split_by_3(x) << 2 | split_by_3(y) << 1 | split_by_3(z)
}

#[inline]
/// Encode a Vec3A position into a 30-bit morton value.
/// Input should be 0.0..=1.0; points outside the unit cube clamp to the
/// boundary bins (never wrap), and NaN components collapse to bin 0.
pub fn morton_encode_u32_unorm(p: Vec3A) -> u32 {
    let p = (p * 1024.0).clamp(Vec3A::ZERO, Vec3A::splat(1023.0));
    morton_encode_u32(p.x as u32, p.y as u32, p.z as u32)
}
