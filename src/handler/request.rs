use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{ColourSpace, FrameIndex, PixelPoint};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::geometry::Segment;

/// Content retrieval callback: URI in, raw bytes out.
pub type SearchFn = Arc<dyn Fn(&str) -> CardResult<Vec<u8>> + Send + Sync>;

/// Frame-wide facts shared by every widget in the frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FrameProperties {
    pub run_id: String,
    pub frame_number: FrameIndex,
    /// Base directory for relative asset paths.
    pub working_dir: PathBuf,
}

/// Where and what the widget is.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PatchProperties {
    pub widget_type: String,
    /// Dotted widget path, e.g. `frame.logo`.
    pub full_name: String,
    pub width: u32,
    pub height: u32,
    pub anchor: PixelPoint,
    /// Grid cells covered by the widget, in widget-local coordinates.
    pub geometry: Vec<Segment>,
    pub colour_space: ColourSpace,
}

/// Immutable per-invocation input to a widget handler.
#[derive(Clone)]
pub struct Request {
    /// The widget's configuration exactly as merged for this frame.
    pub raw: Arc<[u8]>,
    pub frame: FrameProperties,
    pub patch: PatchProperties,
    search: Option<SearchFn>,
}

impl Request {
    pub fn new(raw: impl Into<Arc<[u8]>>, frame: FrameProperties, patch: PatchProperties) -> Self {
        Self {
            raw: raw.into(),
            frame,
            patch,
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<SearchFn>) -> Self {
        self.search = search;
        self
    }

    /// Fetch external content through the configured callback, or directly when none is set.
    pub fn search(&self, uri: &str) -> CardResult<Vec<u8>> {
        match &self.search {
            Some(search) => search(uri),
            None => direct_fetch(uri, &self.frame.working_dir),
        }
    }

    /// Decode the raw payload into a widget-specific configuration type.
    pub fn config<T: serde::de::DeserializeOwned>(&self) -> CardResult<T> {
        serde_json::from_slice(&self.raw).map_err(|e| {
            CardError::serde(format!(
                "decoding configuration of {}: {e}",
                self.patch.full_name
            ))
        })
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("raw_len", &self.raw.len())
            .field("frame", &self.frame)
            .field("patch", &self.patch)
            .field("search", &self.search.is_some())
            .finish()
    }
}

/// Read a local path or `file://` URI, resolving relative paths against `working_dir`.
///
/// Remote schemes need credentials this fetcher does not have.
pub fn direct_fetch(uri: &str, working_dir: &Path) -> CardResult<Vec<u8>> {
    let path = match uri.split_once("://") {
        Some(("file", rest)) => PathBuf::from(rest),
        Some((scheme, _)) => {
            return Err(CardError::validation(format!(
                "cannot fetch {uri:?}: {scheme} URIs need a search function"
            )));
        }
        None => PathBuf::from(uri),
    };
    let path = if path.is_absolute() {
        path
    } else {
        working_dir.join(path)
    };
    let bytes = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/handler/request.rs"]
mod tests;
