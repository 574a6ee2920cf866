use crate::foundation::error::{CardError, CardResult};

/// Straight-alpha (non-premultiplied) RGBA16 image used for frame canvases and widget surfaces.
pub type Canvas = image::ImageBuffer<image::Rgba<u16>, Vec<u16>>;

/// Single-channel coverage mask. `u16::MAX` is fully opaque, `0` fully transparent.
pub type Mask = image::ImageBuffer<image::Luma<u16>, Vec<u16>>;

/// One straight-alpha RGBA16 pixel.
pub type Rgba16 = image::Rgba<u16>;

/// Fully opaque mask value.
pub const OPAQUE: u16 = u16::MAX;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl FrameIndex {
    /// Zero-padded 4-digit label (`0007`), used in file names and log prefixes.
    pub fn label(self) -> String {
        format!("{:04}", self.0)
    }
}

/// Integer pixel position on the frame canvas. May be negative.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Integer pixel rectangle, origin plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    pub fn right(self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    pub fn bottom(self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Intersection of two rectangles, `None` when they do not overlap.
    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let x0 = i64::from(self.x).max(i64::from(other.x));
        let y0 = i64::from(self.y).max(i64::from(other.y));
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }
}

/// Colour space tag carried alongside a widget. Colour math is out of scope; the value is passed
/// through to handlers untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColourSpace {
    #[serde(default)]
    pub colour_space: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_type: Option<String>,
}

/// Allocate a fully transparent canvas.
pub fn new_canvas(width: u32, height: u32) -> Canvas {
    Canvas::new(width, height)
}

/// Allocate a mask filled with `value`.
pub fn new_mask(width: u32, height: u32, value: u16) -> Mask {
    Mask::from_pixel(width, height, image::Luma([value]))
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into a straight-alpha RGBA16 pixel.
pub fn parse_hex_colour(s: &str) -> CardResult<Rgba16> {
    let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
    let digits = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 | 8 => hex.to_string(),
        _ => {
            return Err(CardError::validation(format!(
                "invalid hex colour {s:?}: expected #rgb, #rrggbb or #rrggbbaa"
            )));
        }
    };

    let mut channels = [u8::MAX; 4];
    for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk)
            .map_err(|e| CardError::validation(format!("invalid hex colour {s:?}: {e}")))?;
        channels[i] = u8::from_str_radix(pair, 16)
            .map_err(|e| CardError::validation(format!("invalid hex colour {s:?}: {e}")))?;
    }

    Ok(image::Rgba(channels.map(widen_u8)))
}

/// Map an 8-bit channel onto the full 16-bit range (`0xab` -> `0xabab`).
pub fn widen_u8(v: u8) -> u16 {
    u16::from(v) * 257
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
