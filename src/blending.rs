//! Alpha blending primitives shared by mark preparation, tiling and compositing.
//!
//! Two operators are used:
//!
//! - Straight-alpha Porter-Duff "over" ([`blend_over`]) for compositing:
//!   `out_a = src_a + dst_a * (1 - src_a)`,
//!   `out_c = (src_c * src_a + dst_c * dst_a * (1 - src_a)) / out_a`
//! - Masked mixing ([`mix_masked`]) for pasting mark copies onto the overlay:
//!   every channel, alpha included, moves toward the source by the source
//!   alpha, `out = src * a + dst * (1 - a)`.

use image::{Rgba, RgbaImage};

/// Blend one source pixel over one destination pixel in place.
///
/// A fully transparent source leaves the destination untouched and a fully
/// opaque source replaces it exactly, so no rounding drift is introduced at
/// either extreme.
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    match src[3] {
        0 => {}
        255 => *dst = src,
        sa_u8 => {
            let sa = f32::from(sa_u8) / 255.0;
            let da = f32::from(dst[3]) / 255.0;
            let out_a = sa + da * (1.0 - sa);
            for ch in 0..3 {
                let s = f32::from(src[ch]);
                let d = f32::from(dst[ch]);
                let c = (s * sa + d * da * (1.0 - sa)) / out_a;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    dst[ch] = c.round().clamp(0.0, 255.0) as u8;
                }
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Mix one source pixel into one destination pixel using the source alpha as
/// the mask, all four channels alike.
///
/// Alpha 0 leaves the destination untouched and alpha 255 replaces it
/// exactly. In between, the destination alpha is mixed too, so a copy with
/// alpha `a` pasted onto a clear pixel ends up with alpha `a * a / 255`.
pub fn mix_masked(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    match src[3] {
        0 => {}
        255 => *dst = src,
        a => {
            let a = u32::from(a);
            for ch in 0..4 {
                let mixed = (u32::from(src[ch]) * a + u32::from(dst[ch]) * (255 - a) + 127) / 255;
                #[allow(clippy::cast_possible_truncation)]
                {
                    dst[ch] = mixed as u8;
                }
            }
        }
    }
}

/// Paste `src` onto `dst` with its top-left corner at `(pos_x, pos_y)`,
/// blending each pixel "over" the destination.
///
/// The source's own alpha channel acts as the paste mask: transparent source
/// pixels leave `dst` unchanged. Positions may be negative or run past the
/// right/bottom edge; the pasted region is clipped to `dst`.
///
/// Returns `true` if any part of `src` landed inside `dst`.
pub fn paste_over(dst: &mut RgbaImage, src: &RgbaImage, pos_x: i64, pos_y: i64) -> bool {
    paste_with(dst, src, pos_x, pos_y, blend_over)
}

/// Paste `src` onto `dst` at `(pos_x, pos_y)` with [`mix_masked`], using the
/// source alpha as the mask. Clipping is the same as [`paste_over`].
pub fn paste_masked(dst: &mut RgbaImage, src: &RgbaImage, pos_x: i64, pos_y: i64) -> bool {
    paste_with(dst, src, pos_x, pos_y, mix_masked)
}

fn paste_with(
    dst: &mut RgbaImage,
    src: &RgbaImage,
    pos_x: i64,
    pos_y: i64,
    blend: impl Fn(&mut Rgba<u8>, Rgba<u8>),
) -> bool {
    let dst_w = i64::from(dst.width());
    let dst_h = i64::from(dst.height());

    // Clip to destination bounds
    let x1 = pos_x.max(0);
    let y1 = pos_y.max(0);
    let x2 = (pos_x + i64::from(src.width())).min(dst_w);
    let y2 = (pos_y + i64::from(src.height())).min(dst_h);

    if x1 >= x2 || y1 >= y2 {
        return false;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    for y in y1..y2 {
        for x in x1..x2 {
            let src_px = *src.get_pixel((x - pos_x) as u32, (y - pos_y) as u32);
            blend(dst.get_pixel_mut(x as u32, y as u32), src_px);
        }
    }
    true
}

/// Composite `overlay` over `base` in place.
///
/// Both images are expected to share dimensions; if they do not, only the
/// overlapping top-left region is blended.
pub fn composite_over(base: &mut RgbaImage, overlay: &RgbaImage) {
    paste_over(base, overlay, 0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_destination_exactly() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([200, 100, 50, 255]));
        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn transparent_source_is_ignored() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([200, 100, 50, 0]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn half_alpha_over_opaque_mixes_evenly() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_over(&mut dst, Rgba([255, 255, 255, 128]));
        // 255 * 128/255 = 128
        assert_eq!(dst, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn blend_onto_transparent_keeps_source_color() {
        let mut dst = Rgba([0, 0, 0, 0]);
        blend_over(&mut dst, Rgba([40, 80, 120, 90]));
        assert_eq!(dst, Rgba([40, 80, 120, 90]));
    }

    #[test]
    fn paste_clips_to_destination() {
        let mut dst = RgbaImage::new(10, 10);
        let src = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));

        assert!(paste_over(&mut dst, &src, -2, 8));
        let painted = dst.pixels().filter(|p| p[3] == 255).count();
        assert_eq!(painted, 2 * 2);
        assert_eq!(*dst.get_pixel(0, 9), Rgba([255, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(2, 9), Rgba([0, 0, 0, 0]));

        assert!(!paste_over(&mut dst, &src, 10, 0));
        assert!(!paste_over(&mut dst, &src, -4, -4));
    }

    #[test]
    fn paste_respects_source_alpha_mask() {
        let mut dst = RgbaImage::from_pixel(3, 1, Rgba([1, 2, 3, 255]));
        let mut src = RgbaImage::new(3, 1);
        src.put_pixel(1, 0, Rgba([9, 9, 9, 255]));

        paste_over(&mut dst, &src, 0, 0);
        assert_eq!(*dst.get_pixel(0, 0), Rgba([1, 2, 3, 255]));
        assert_eq!(*dst.get_pixel(1, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(*dst.get_pixel(2, 0), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn masked_mix_moves_every_channel_toward_source() {
        let mut dst = Rgba([255, 255, 255, 0]);
        mix_masked(&mut dst, Rgba([255, 0, 0, 128]));
        // 255*127/255 = 127 for green/blue, 128*128/255 = 64.25 for alpha
        assert_eq!(dst, Rgba([255, 127, 127, 64]));

        let mut dst = Rgba([10, 20, 30, 40]);
        mix_masked(&mut dst, Rgba([200, 100, 50, 0]));
        assert_eq!(dst, Rgba([10, 20, 30, 40]));
        mix_masked(&mut dst, Rgba([200, 100, 50, 255]));
        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn paste_masked_clips_like_paste_over() {
        let mut dst = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 0]));
        let src = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));

        assert!(paste_masked(&mut dst, &src, 2, -1));
        let painted = dst.pixels().filter(|p| p[3] == 255).count();
        assert_eq!(painted, 2 * 2);
        assert_eq!(*dst.get_pixel(3, 1), Rgba([0, 0, 0, 255]));
        assert_eq!(*dst.get_pixel(1, 1), Rgba([255, 255, 255, 0]));
        assert!(!paste_masked(&mut dst, &src, 4, 0));
    }
}
