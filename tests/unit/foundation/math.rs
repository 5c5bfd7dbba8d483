use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0, 100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[0, 0, 0, 0]);
    assert_eq!(px[4], ((100u16 * 128 + 127) / 255) as u8);
    assert_eq!(px[7], 128);
}

#[test]
fn over_with_opaque_or_transparent_source() {
    let dst = [10, 20, 30, 255];
    assert_eq!(premul_over_px(dst, [1, 2, 3, 255]), [1, 2, 3, 255]);
    assert_eq!(premul_over_px(dst, [0, 0, 0, 0]), dst);
    let half = premul_over_px([0, 0, 0, 255], [128, 0, 0, 128]);
    assert_eq!(half, [128, 0, 0, 255]);
}
