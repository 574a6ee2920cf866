use crate::foundation::core::PixelRect;
use crate::layout::resolver::RenderContext;

/// One grid cell covered by a widget, in the widget's local pixel space.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// `R{row}C{col}`, both 1-based.
    pub name: String,
    pub shape: PixelRect,
}

/// Flatten the grid under `rect` into per-cell segments, clipped to `rect` and translated so
/// the widget's top-left corner is `(0, 0)`.
///
/// Cell edges are rounded the same way box edges are, so adjacent segments tile without gaps.
pub fn grid_segments(rect: PixelRect, ctx: &RenderContext) -> Vec<Segment> {
    let columns = cell_count(ctx.canvas_width, ctx.grid_unit_x);
    let rows = cell_count(ctx.canvas_height, ctx.grid_unit_y);

    let mut out = Vec::new();
    for row in 0..rows {
        let y0 = (row as f64 * ctx.grid_unit_y).round() as i64;
        let y1 = ((row + 1) as f64 * ctx.grid_unit_y).round() as i64;
        if y1 <= i64::from(rect.y) || y0 >= rect.bottom() {
            continue;
        }
        for col in 0..columns {
            let x0 = (col as f64 * ctx.grid_unit_x).round() as i64;
            let x1 = ((col + 1) as f64 * ctx.grid_unit_x).round() as i64;
            let cell = PixelRect::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32);
            let Some(hit) = cell.intersect(rect) else {
                continue;
            };
            out.push(Segment {
                name: format!("R{}C{}", row + 1, col + 1),
                shape: PixelRect::new(hit.x - rect.x, hit.y - rect.y, hit.width, hit.height),
            });
        }
    }
    out
}

fn cell_count(extent: u32, unit: f64) -> u32 {
    if unit <= 0.0 {
        return 0;
    }
    (f64::from(extent) / unit).ceil() as u32
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
