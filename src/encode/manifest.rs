use std::path::{Path, PathBuf};

use anyhow::Context;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{CardError, CardResult};

/// Checksums for one saved file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub file: String,
    pub frame: FrameIndex,
    pub bytes: u64,
    /// XXH3-128 of the encoded file.
    pub file_hash: String,
    /// XXH3-128 of the 16-bit RGBA pixels, little-endian. Independent of the file format.
    pub pixel_hash: String,
}

/// Every file written by one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub run_id: String,
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            files: Vec::new(),
        }
    }

    pub fn record(&mut self, file: impl Into<String>, frame: FrameIndex, bytes: &[u8], pixel_hash: &str) {
        self.files.push(ManifestEntry {
            file: file.into(),
            frame,
            bytes: bytes.len() as u64,
            file_hash: file_digest(bytes),
            pixel_hash: pixel_hash.to_string(),
        });
    }

    pub fn file_name(&self) -> String {
        format!("{}.manifest.json", self.run_id)
    }

    /// Write `<run id>.manifest.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> CardResult<PathBuf> {
        let path = dir.join(self.file_name());
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CardError::serde(format!("encode manifest: {e}")))?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

pub fn file_digest(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128(bytes))
}

pub fn pixel_digest(canvas: &Canvas) -> String {
    let mut h = Xxh3::new();
    for row in canvas.as_raw().chunks(4096) {
        let le: Vec<u8> = row.iter().flat_map(|v| v.to_le_bytes()).collect();
        h.update(&le);
    }
    format!("{:032x}", h.digest128())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/manifest.rs"]
mod tests;
