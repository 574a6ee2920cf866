use std::ops::RangeInclusive;

use crate::foundation::core::{Mask, OPAQUE, PixelPoint, new_mask};

/// Build an opaque `width x height` mask with four circular corner cut-outs of `radius` pixels.
///
/// Each corner anchor sits `radius` pixels in from its corner. Every offset `(dx, dy)` in
/// `[0, radius]^2` heading away from the interior with `dx^2 + dy^2 > radius^2` is cleared.
/// Offsets that land outside the mask are ignored, so the work is bounded by the mask size.
pub fn rounded_mask(width: u32, height: u32, radius: i64) -> Mask {
    let mut mask = new_mask(width, height, OPAQUE);
    let w = i64::from(width);
    let h = i64::from(height);
    // Past 4x the longer side every in-mask offset is already outside the circle.
    let r = radius.clamp(0, 4 * w.max(h));
    if r == 0 {
        return mask;
    }

    let corners = [
        ((r, r), (-1, -1)),
        ((r, h - r), (-1, 1)),
        ((w - r, r), (1, -1)),
        ((w - r, h - r), (1, 1)),
    ];

    let r_sq = i128::from(r) * i128::from(r);
    for ((ax, ay), (sx, sy)) in corners {
        let ys = corner_span(ay, sy, r, h);
        for px in corner_span(ax, sx, r, w) {
            let dx = i128::from(px - ax);
            for py in ys.clone() {
                let dy = i128::from(py - ay);
                if dx * dx + dy * dy > r_sq {
                    mask.put_pixel(px as u32, py as u32, image::Luma([0]));
                }
            }
        }
    }
    mask
}

/// Pixels in `[0, extent)` reached from `anchor` by `0..=r` steps towards `sign`.
fn corner_span(anchor: i64, sign: i64, r: i64, extent: i64) -> RangeInclusive<i64> {
    let (lo, hi) = if sign < 0 {
        (anchor - r, anchor)
    } else {
        (anchor, anchor + r)
    };
    lo.max(0)..=hi.min(extent - 1)
}

/// Cut the `width x height` window at `anchor` out of a frame-wide tile mask.
///
/// Pixels of the window that fall outside the tile mask are transparent.
pub fn clip_tile_mask(tile: &Mask, anchor: PixelPoint, width: u32, height: u32) -> Mask {
    let tw = i64::from(tile.width());
    let th = i64::from(tile.height());
    Mask::from_fn(width, height, |x, y| {
        let tx = i64::from(x) + i64::from(anchor.x);
        let ty = i64::from(y) + i64::from(anchor.y);
        if (0..tw).contains(&tx) && (0..th).contains(&ty) {
            *tile.get_pixel(tx as u32, ty as u32)
        } else {
            image::Luma([0])
        }
    })
}

/// Combine `other` into `base` so a pixel stays opaque only where both are opaque.
///
/// Partial coverage multiplies, so the result never exceeds either input.
pub fn intersect_masks(base: &mut Mask, other: &Mask) {
    for (x, y, px) in base.enumerate_pixels_mut() {
        let o = other.get_pixel_checked(x, y).map_or(0, |p| p.0[0]);
        px.0[0] = mul_div_max(px.0[0], o);
    }
}

/// `a * b / 65535`, rounded.
pub fn mul_div_max(a: u16, b: u16) -> u16 {
    ((u32::from(a) * u32::from(b) + u32::from(OPAQUE) / 2) / u32::from(OPAQUE)) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mask.rs"]
mod tests;
