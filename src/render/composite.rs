use rayon::prelude::*;

use crate::foundation::core::{Canvas, Mask, OPAQUE, PixelPoint, PixelRect};

pub type StraightRgba16 = [u16; 4];

const MAX: u64 = OPAQUE as u64;

/// Straight-alpha source-over of one pixel, with `coverage` scaling the source alpha.
pub fn over(dst: StraightRgba16, src: StraightRgba16, coverage: u16) -> StraightRgba16 {
    let sa = mul_div_max(u64::from(src[3]), u64::from(coverage));
    if sa == 0 {
        return dst;
    }
    if sa == MAX {
        return [src[0], src[1], src[2], OPAQUE];
    }

    let da = mul_div_max(u64::from(dst[3]), MAX - sa);
    let out_a = sa + da;
    if out_a == 0 {
        return [0; 4];
    }

    let mut out = [0u16; 4];
    for i in 0..3 {
        let c = u64::from(src[i]) * sa + u64::from(dst[i]) * da;
        out[i] = ((c + out_a / 2) / out_a).min(MAX) as u16;
    }
    out[3] = out_a.min(MAX) as u16;
    out
}

/// Blend `src` onto `dst` with its top-left corner at `anchor`, clipped to `dst`.
///
/// When `mask` is given, each source pixel's alpha is scaled by the mask value at the same
/// source coordinate; pixels the mask does not cover are skipped.
pub fn composite_masked(dst: &mut Canvas, src: &Canvas, anchor: PixelPoint, mask: Option<&Mask>) {
    let frame = PixelRect::new(0, 0, dst.width(), dst.height());
    let placed = PixelRect::new(anchor.x, anchor.y, src.width(), src.height());
    let Some(hit) = frame.intersect(placed) else {
        return;
    };

    let dst_stride = dst.width() as usize * 4;
    let src_w = src.width() as usize;
    let (x0, y0) = (hit.x as usize, hit.y as usize);
    let sx0 = (i64::from(hit.x) - i64::from(anchor.x)) as usize;
    let sy0 = (i64::from(hit.y) - i64::from(anchor.y)) as usize;
    let (w, h) = (hit.width as usize, hit.height as usize);
    let src_buf: &[u16] = src.as_raw();

    let buf: &mut [u16] = dst;
    buf[y0 * dst_stride..(y0 + h) * dst_stride]
        .par_chunks_exact_mut(dst_stride)
        .enumerate()
        .for_each(|(row, dst_row)| {
            let sy = sy0 + row;
            let start = (sy * src_w + sx0) * 4;
            let src_row = &src_buf[start..start + w * 4];
            let dst_px = &mut dst_row[x0 * 4..(x0 + w) * 4];
            for (col, (d, s)) in dst_px
                .chunks_exact_mut(4)
                .zip(src_row.chunks_exact(4))
                .enumerate()
            {
                let coverage = match mask {
                    Some(m) => m
                        .get_pixel_checked((sx0 + col) as u32, sy as u32)
                        .map_or(0, |p| p.0[0]),
                    None => OPAQUE,
                };
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], coverage);
                d.copy_from_slice(&out);
            }
        });
}

/// Fill every pixel of `canvas` with `colour`.
pub fn fill(canvas: &mut Canvas, colour: image::Rgba<u16>) {
    canvas
        .par_chunks_exact_mut(4)
        .for_each(|px| px.copy_from_slice(&colour.0));
}

fn mul_div_max(a: u64, b: u64) -> u64 {
    (a * b + MAX / 2) / MAX
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
