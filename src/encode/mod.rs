//! Frame encoding and per-file checksums.

pub mod encoders;
pub mod manifest;

pub use encoders::{CsvEncoder, Encoder, EncoderRegistry, ImageEncoder, SharedEncoder};
pub use manifest::{Manifest, ManifestEntry, file_digest, pixel_digest};
