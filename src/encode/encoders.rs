use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use image::{DynamicImage, ImageFormat};

use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};

/// Writes a finished frame in one file format.
pub trait Encoder: Send + Sync {
    /// `bit_depth` is 8 or 16; formats without a choice ignore it.
    fn encode(&self, w: &mut dyn Write, canvas: &Canvas, bit_depth: u8) -> CardResult<()>;
}

impl<F> Encoder for F
where
    F: Fn(&mut dyn Write, &Canvas, u8) -> CardResult<()> + Send + Sync,
{
    fn encode(&self, w: &mut dyn Write, canvas: &Canvas, bit_depth: u8) -> CardResult<()> {
        self(w, canvas, bit_depth)
    }
}

/// PNG, TIFF and other formats the `image` crate writes.
#[derive(Clone, Copy, Debug)]
pub struct ImageEncoder {
    format: ImageFormat,
}

impl ImageEncoder {
    pub fn new(format: ImageFormat) -> Self {
        Self { format }
    }
}

impl Encoder for ImageEncoder {
    fn encode(&self, w: &mut dyn Write, canvas: &Canvas, bit_depth: u8) -> CardResult<()> {
        let img = match (self.format, bit_depth) {
            // OpenEXR stores floats.
            (ImageFormat::OpenExr, _) => {
                DynamicImage::ImageRgba32F(DynamicImage::ImageRgba16(canvas.clone()).to_rgba32f())
            }
            (_, 8) => DynamicImage::ImageRgba8(narrow_to_u8(canvas)),
            _ => DynamicImage::ImageRgba16(canvas.clone()),
        };
        // Encoders need `Seek`; buffer and copy out.
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, self.format)
            .map_err(|e| CardError::encode(format!("{:?}: {e}", self.format)))?;
        w.write_all(buf.get_ref())
            .context("write encoded image")?;
        Ok(())
    }
}

/// One CSV row per image row, each cell `"r g b a"`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvEncoder;

impl Encoder for CsvEncoder {
    fn encode(&self, w: &mut dyn Write, canvas: &Canvas, bit_depth: u8) -> CardResult<()> {
        let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(w);
        for row in canvas.rows() {
            let cells = row.map(|px| {
                let [r, g, b, a] = px.0;
                if bit_depth == 8 {
                    let [r, g, b, a] = [r, g, b, a].map(narrow);
                    format!("{r} {g} {b} {a}")
                } else {
                    format!("{r} {g} {b} {a}")
                }
            });
            out.write_record(cells)
                .map_err(|e| CardError::encode(format!("csv row: {e}")))?;
        }
        out.flush().context("flush csv")?;
        Ok(())
    }
}

fn narrow(v: u16) -> u8 {
    ((u32::from(v) + 128) / 257) as u8
}

fn narrow_to_u8(canvas: &Canvas) -> image::RgbaImage {
    image::RgbaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        image::Rgba(canvas.get_pixel(x, y).0.map(narrow))
    })
}

pub type SharedEncoder = Arc<dyn Encoder>;

/// Upper-cased file extension -> encoder.
#[derive(Clone)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, SharedEncoder>,
}

impl EncoderRegistry {
    pub fn empty() -> Self {
        Self {
            encoders: BTreeMap::new(),
        }
    }

    /// PNG, TIF/TIFF, EXR and CSV.
    pub fn with_defaults() -> Self {
        let mut reg = Self::empty();
        let tiff: SharedEncoder = Arc::new(ImageEncoder::new(ImageFormat::Tiff));
        reg.register("PNG", Arc::new(ImageEncoder::new(ImageFormat::Png)));
        reg.register("TIF", Arc::clone(&tiff));
        reg.register("TIFF", tiff);
        reg.register("EXR", Arc::new(ImageEncoder::new(ImageFormat::OpenExr)));
        reg.register("CSV", Arc::new(CsvEncoder));
        reg
    }

    /// # Panics
    /// When the extension already has an encoder.
    pub fn register(&mut self, extension: &str, encoder: SharedEncoder) {
        let key = extension.trim_start_matches('.').to_uppercase();
        if self.encoders.contains_key(&key) {
            panic!("an encoder for {key} files is already registered");
        }
        self.encoders.insert(key, encoder);
    }

    pub fn extensions(&self) -> Vec<&str> {
        self.encoders.keys().map(String::as_str).collect()
    }

    /// Encoder chosen by `path`'s extension.
    pub fn for_path(&self, path: &Path) -> CardResult<SharedEncoder> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_uppercase();
        self.encoders.get(&ext).cloned().ok_or_else(|| {
            CardError::encode(format!(
                "{} is not a valid file type, accepted types are: {}",
                path.display(),
                self.extensions().join(", ")
            ))
        })
    }

    /// Encode `canvas` into memory in the format `path` names.
    pub fn encode_for(&self, path: &Path, canvas: &Canvas, bit_depth: u8) -> CardResult<Vec<u8>> {
        let encoder = self.for_path(path)?;
        let mut bytes = Vec::new();
        encoder.encode(&mut bytes, canvas, bit_depth)?;
        Ok(bytes)
    }
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for EncoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoders.rs"]
mod tests;
