pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Premultiply straight-alpha RGBA8 pixels in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), a) as u8;
        }
    }
}

/// Source-over for one premultiplied RGBA8 pixel.
pub(crate) fn premul_over_px(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = u16::from(src[3]);
    if sa == 255 {
        return src;
    }
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = u16::from(src[c]) + mul_div255_u16(u16::from(dst[c]), inv);
        out[c] = v.min(255) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
