use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::model::{FRAME_NUMBER_TOKEN, MetadataDef, ProjectDef, WidgetDef, merge_json};
use crate::foundation::core::{Canvas, FrameIndex, Mask, new_canvas, parse_hex_colour};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::boxspec::Location;
use crate::layout::resolver::{KeyTable, RenderContext};
use crate::render::composite::fill;
use crate::render::compositor::WidgetRecord;

/// A loaded, validated-on-demand test-card project.
#[derive(Debug, Clone)]
pub struct Project {
    def: ProjectDef,
    widgets: Vec<(WidgetDef, Value)>,
    base_dir: PathBuf,
}

impl Project {
    /// Parse a project from a JSON reader. Relative paths resolve against the current directory.
    pub fn from_reader<R: std::io::Read>(r: R) -> CardResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| CardError::config(format!("parse project JSON: {e}")))?;
        Self::from_def(def, PathBuf::from("."))
    }

    /// Parse a project file. Relative paths resolve against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CardError::config(format!("open project JSON '{}': {e}", path.display()))
        })?;
        let mut project = Self::from_reader(BufReader::new(f))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            project.base_dir = dir.to_path_buf();
        }
        Ok(project)
    }

    pub fn from_def(def: ProjectDef, base_dir: PathBuf) -> CardResult<Self> {
        let widgets = def
            .widgets
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let (widget, _) = parse_widget(raw)
                    .map_err(|e| CardError::config(format!("widgets[{i}]: {e}")))?;
                Ok((widget, raw.clone()))
            })
            .collect::<CardResult<Vec<_>>>()?;
        Ok(Self {
            def,
            widgets,
            base_dir,
        })
    }

    /// Check cross-field invariants serde cannot express.
    pub fn validate(&self) -> CardResult<()> {
        let canvas = &self.def.canvas;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(CardError::config(format!(
                "canvas must be non-empty, got {}x{}",
                canvas.width, canvas.height
            )));
        }
        if canvas.rows == 0 || canvas.columns == 0 {
            return Err(CardError::config("canvas rows and columns must be at least 1"));
        }
        if !matches!(canvas.bit_depth, 0 | 8 | 16) {
            return Err(CardError::config(format!(
                "bitDepth must be 8 or 16, got {}",
                canvas.bit_depth
            )));
        }
        if let Some(bg) = &canvas.background {
            parse_hex_colour(bg).map_err(|e| CardError::config(format!("canvas.background: {e}")))?;
        }

        let mut names = HashSet::new();
        for (i, (widget, _)) in self.widgets.iter().enumerate() {
            if widget.name.is_empty() {
                return Err(CardError::config(format!("widgets[{i}] has no name")));
            }
            if !names.insert(widget.name.as_str()) {
                return Err(CardError::config(format!(
                    "widget name {:?} is used more than once",
                    widget.name
                )));
            }
        }

        for (frame, updates) in &self.def.frames {
            let n: u64 = frame
                .parse()
                .map_err(|e| CardError::config(format!("frames key {frame:?}: {e}")))?;
            if n >= self.def.frame_count {
                return Err(CardError::config(format!(
                    "frames key {n} is outside frameCount {}",
                    self.def.frame_count
                )));
            }
            if let Some(unknown) = updates.keys().find(|name| !names.contains(name.as_str())) {
                return Err(CardError::config(format!(
                    "frame {n} updates unknown widget {unknown:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn frame_count(&self) -> u64 {
        self.def.frame_count
    }

    pub fn bit_depth(&self) -> u8 {
        self.def.canvas.effective_bit_depth()
    }

    pub fn metadata(&self) -> MetadataDef {
        self.def.metadata
    }

    /// Widget JSON objects for `frame`, with that frame's updates merged in.
    pub fn frame_configuration(&self, frame: FrameIndex) -> Vec<Value> {
        let updates = self.def.frames.get(&frame.0.to_string());
        self.widgets
            .iter()
            .map(|(widget, raw)| {
                let mut merged = raw.clone();
                if let Some(patch) = updates.and_then(|u| u.get(&widget.name)) {
                    merge_json(&mut merged, patch);
                }
                merged
            })
            .collect()
    }

    /// Widget records for `frame`, `z_pos` following declaration order.
    ///
    /// A widget whose merged configuration no longer parses keeps its record; the failure
    /// travels in [`WidgetRecord::location`] and is reported for that widget alone.
    pub fn widgets_for_frame(&self, frame: FrameIndex) -> CardResult<Vec<WidgetRecord>> {
        self.frame_configuration(frame)
            .into_iter()
            .zip(&self.widgets)
            .enumerate()
            .map(|(z_pos, (merged, (base, _)))| {
                let (widget, location) = match parse_widget(&merged) {
                    Ok(parsed) => parsed,
                    Err(e) => (
                        base.clone(),
                        Err(CardError::config(format!(
                            "frame {} update for {:?}: {e}",
                            frame.0, base.name
                        ))),
                    ),
                };
                let payload = serde_json::to_vec(&merged)
                    .map_err(|e| CardError::serde(format!("encode widget payload: {e}")))?;
                Ok(WidgetRecord {
                    z_pos,
                    alias: widget.alias,
                    full_name: widget.name,
                    widget_type: widget.widget_type,
                    location,
                    colour_space: widget.colour_space,
                    payload: payload.into(),
                })
            })
            .collect()
    }

    /// Load the tile mask image, if configured, keeping its alpha channel.
    pub fn load_tile_mask(&self) -> CardResult<Option<Arc<Mask>>> {
        let Some(path) = &self.def.canvas.tile_mask else {
            return Ok(None);
        };
        let path = self.base_dir.join(path);
        let img = image::open(&path).map_err(|e| {
            CardError::config(format!("open tile mask '{}': {e}", path.display()))
        })?;
        let rgba = img.to_rgba16();
        if rgba.dimensions() != (self.def.canvas.width, self.def.canvas.height) {
            tracing::warn!(
                path = %path.display(),
                mask = ?rgba.dimensions(),
                canvas = ?(self.def.canvas.width, self.def.canvas.height),
                "tile mask size differs from the canvas; uncovered areas are clipped"
            );
        }
        let mask = Mask::from_fn(rgba.width(), rgba.height(), |x, y| {
            image::Luma([rgba.get_pixel(x, y).0[3]])
        });
        Ok(Some(Arc::new(mask)))
    }

    /// Fresh per-frame layout context.
    pub fn render_context(&self, tile_mask: Option<Arc<Mask>>) -> CardResult<RenderContext> {
        let canvas = &self.def.canvas;
        let mut ctx = RenderContext::new(canvas.width, canvas.height, canvas.rows, canvas.columns)?;
        if let Some(mask) = tile_mask {
            ctx = ctx.with_tile_mask(mask);
        }
        if !self.def.grid_keys.is_empty() {
            let table: KeyTable = self
                .def
                .grid_keys
                .iter()
                .map(|(k, r)| (k.clone(), *r))
                .collect();
            ctx = ctx.with_grid_keys(Arc::new(table));
        }
        Ok(ctx)
    }

    /// Canvas filled with the configured background.
    pub fn base_canvas(&self) -> CardResult<Canvas> {
        let def = &self.def.canvas;
        let mut canvas = new_canvas(def.width, def.height);
        if let Some(bg) = &def.background {
            fill(&mut canvas, parse_hex_colour(bg)?);
        }
        Ok(canvas)
    }

    /// Output file names for `frame`, relative to the output directory.
    pub fn file_names(&self, frame: FrameIndex) -> Vec<String> {
        let label = frame.label();
        self.def
            .canvas
            .file_names
            .iter()
            .map(|name| name.replace(FRAME_NUMBER_TOKEN, &label))
            .collect()
    }
}

/// Parse the engine fields of one widget object.
///
/// A `grid` that does not parse becomes that widget's layout error instead of failing the
/// whole object; any other malformed field is returned as the outer error.
fn parse_widget(raw: &Value) -> serde_json::Result<(WidgetDef, CardResult<Location>)> {
    match serde_json::from_value::<WidgetDef>(raw.clone()) {
        Ok(widget) => {
            let location = Location::aliased(widget.alias.clone(), widget.grid.clone());
            Ok((widget, Ok(location)))
        }
        Err(grid_err) => {
            let mut fields = raw.clone();
            if let Some(obj) = fields.as_object_mut() {
                obj.remove("grid");
            }
            let widget: WidgetDef = serde_json::from_value(fields)?;
            let location = Err(CardError::layout(format!(
                "grid of {:?}: {grid_err}",
                widget.name
            )));
            Ok((widget, location))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/project.rs"]
mod tests;
