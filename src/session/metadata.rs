use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde_json::Value;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{CardError, CardResult};

/// Per-frame metadata, present only when enabled in the project.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMetadata {
    pub frame: FrameIndex,
    /// Mean straight-alpha RGBA in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_colour: Option<[f64; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Vec<Value>>,
}

impl FrameMetadata {
    pub fn is_empty(&self) -> bool {
        self.average_colour.is_none() && self.configuration.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataLog {
    pub run_id: String,
    pub frames: Vec<FrameMetadata>,
}

impl MetadataLog {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, meta: FrameMetadata) {
        if !meta.is_empty() {
            self.frames.push(meta);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Write `<run id>.metadata.json` into `dir`.
    pub fn write_to(&self, dir: &Path) -> CardResult<PathBuf> {
        let path = dir.join(format!("{}.metadata.json", self.run_id));
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| CardError::serde(format!("encode metadata: {e}")))?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Mean of every channel, normalized to `[0, 1]`. An empty canvas averages to zero.
pub fn average_colour(canvas: &Canvas) -> [f64; 4] {
    let pixels = u64::from(canvas.width()) * u64::from(canvas.height());
    if pixels == 0 {
        return [0.0; 4];
    }
    let sums = canvas
        .as_raw()
        .par_chunks_exact(4)
        .fold(
            || [0u64; 4],
            |mut acc, px| {
                for (a, v) in acc.iter_mut().zip(px) {
                    *a += u64::from(*v);
                }
                acc
            },
        )
        .reduce(
            || [0u64; 4],
            |mut a, b| {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += y;
                }
                a
            },
        );
    sums.map(|s| s as f64 / pixels as f64 / f64::from(u16::MAX))
}

#[cfg(test)]
#[path = "../../tests/unit/session/metadata.rs"]
mod tests;
