use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::foundation::core::{ColourSpace, PixelRect};
use crate::layout::boxspec::LayoutBox;

/// Placeholder in output file names replaced by the zero-padded frame number.
pub const FRAME_NUMBER_TOKEN: &str = "{{framenumber}}";

/// On-disk project document.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDef {
    pub canvas: CanvasDef,
    #[serde(default = "default_frame_count")]
    pub frame_count: u64,
    /// Widget objects in stacking order. Kept as raw JSON: each one is also the widget payload.
    #[serde(default)]
    pub widgets: Vec<Value>,
    /// Frame number -> widget name -> properties merged over the base widget for that frame.
    #[serde(default)]
    pub frames: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub grid_keys: BTreeMap<String, PixelRect>,
    #[serde(default)]
    pub metadata: MetadataDef,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDef {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default = "default_columns")]
    pub columns: u32,
    /// Hex colour; transparent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub file_names: Vec<String>,
    /// `0` means 16.
    #[serde(default)]
    pub bit_depth: u8,
    /// Image whose alpha channel clips every widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_mask: Option<PathBuf>,
    #[serde(default)]
    pub colour_space: ColourSpace,
}

impl CanvasDef {
    pub fn effective_bit_depth(&self) -> u8 {
        if self.bit_depth == 0 { 16 } else { self.bit_depth }
    }
}

/// The fields of a widget object the engine itself reads. Everything else belongs to the
/// widget's handler.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub widget_type: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub grid: LayoutBox,
    #[serde(default)]
    pub colour_space: ColourSpace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDef {
    #[serde(default)]
    pub average_colour: bool,
    #[serde(default)]
    pub configuration: bool,
}

impl MetadataDef {
    pub fn any(self) -> bool {
        self.average_colour || self.configuration
    }
}

fn default_frame_count() -> u64 {
    1
}

fn default_rows() -> u32 {
    9
}

fn default_columns() -> u32 {
    16
}

/// Merge `patch` into `base`: objects merge key by key, anything else replaces.
pub fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
