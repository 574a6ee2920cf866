use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::foundation::core::{Canvas, Mask, PixelPoint, PixelRect, new_canvas};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::alias::AliasRegistry;
use crate::layout::boxspec::Location;
use crate::layout::mask::{clip_tile_mask, intersect_masks, rounded_mask};

static GRID_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^key:\w{3,10}$").expect("grid key pattern"));

/// Placements only ever point at directly resolved boxes, so one hop is the deepest a valid
/// chain gets. The guard catches registries populated by hand.
const MAX_ALIAS_DEPTH: usize = 8;

/// Widgets may overhang the canvas, but never cover more than this many canvas areas.
const MAX_AREA_FACTOR: u64 = 4;

/// Everything layout resolution needs to know about the frame being rendered.
///
/// Created fresh for every frame; the alias registry lives and dies with it.
pub struct RenderContext {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Pixel width of one grid column.
    pub grid_unit_x: f64,
    /// Pixel height of one grid row.
    pub grid_unit_y: f64,
    /// Optional frame-wide clipping mask intersected into every widget mask.
    pub tile_mask: Option<Arc<Mask>>,
    pub aliases: AliasRegistry,
    /// Collaborator for `useGridKey` boxes.
    pub grid_keys: Option<Arc<dyn GridKeyLookup>>,
}

impl RenderContext {
    /// Context for a `width x height` canvas split into `rows x columns` grid cells.
    pub fn new(width: u32, height: u32, rows: u32, columns: u32) -> CardResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardError::config(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        if rows == 0 || columns == 0 {
            return Err(CardError::config(format!(
                "grid must have at least one row and column, got {rows}x{columns}"
            )));
        }
        Ok(Self::with_grid_units(
            width,
            height,
            f64::from(width) / f64::from(columns),
            f64::from(height) / f64::from(rows),
        ))
    }

    /// Context with explicit grid cell sizes in pixels.
    pub fn with_grid_units(width: u32, height: u32, unit_x: f64, unit_y: f64) -> Self {
        Self {
            canvas_width: width,
            canvas_height: height,
            grid_unit_x: unit_x,
            grid_unit_y: unit_y,
            tile_mask: None,
            aliases: AliasRegistry::new(),
            grid_keys: None,
        }
    }

    pub fn with_tile_mask(mut self, mask: Arc<Mask>) -> Self {
        self.tile_mask = Some(mask);
        self
    }

    pub fn with_grid_keys(mut self, keys: Arc<dyn GridKeyLookup>) -> Self {
        self.grid_keys = Some(keys);
        self
    }

    /// Build a placement for an already computed pixel rectangle, applying the tile mask.
    pub fn place_rect(&self, rect: PixelRect) -> Placement {
        let mask = self
            .tile_mask
            .as_deref()
            .map(|tile| clip_tile_mask(tile, rect.origin(), rect.width, rect.height));
        Placement {
            canvas: new_canvas(rect.width, rect.height),
            anchor: rect.origin(),
            mask,
        }
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("canvas_width", &self.canvas_width)
            .field("canvas_height", &self.canvas_height)
            .field("grid_unit_x", &self.grid_unit_x)
            .field("grid_unit_y", &self.grid_unit_y)
            .field("tile_mask", &self.tile_mask.is_some())
            .field("aliases", &self.aliases.len())
            .field("grid_keys", &self.grid_keys.is_some())
            .finish()
    }
}

/// A widget's resolved surface: blank sub-canvas, where it goes, and how it is clipped.
#[derive(Clone, Debug)]
pub struct Placement {
    pub canvas: Canvas,
    /// Top-left corner on the frame canvas. May be negative.
    pub anchor: PixelPoint,
    pub mask: Option<Mask>,
}

impl Placement {
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.anchor.x, self.anchor.y, self.width(), self.height())
    }
}

/// Named-key lookup used by `useGridKey` boxes.
pub trait GridKeyLookup: Send + Sync {
    fn resolve_key(&self, key: &str, ctx: &RenderContext) -> CardResult<Placement>;
}

/// Static table of named keys to pixel rectangles.
#[derive(Clone, Debug, Default)]
pub struct KeyTable {
    keys: HashMap<String, PixelRect>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, rect: PixelRect) {
        self.keys.insert(key.into(), rect);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(String, PixelRect)> for KeyTable {
    fn from_iter<I: IntoIterator<Item = (String, PixelRect)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl GridKeyLookup for KeyTable {
    fn resolve_key(&self, key: &str, ctx: &RenderContext) -> CardResult<Placement> {
        let rect = self
            .keys
            .get(key)
            .copied()
            .ok_or_else(|| CardError::layout(format!("grid key {key:?} was not found")))?;
        if rect.width == 0 || rect.height == 0 {
            return Err(CardError::layout(format!(
                "grid key {key:?} has an empty area {}x{}",
                rect.width, rect.height
            )));
        }
        Ok(ctx.place_rect(rect))
    }
}

/// Resolve a location into a placement, following aliases and named keys.
///
/// A location with a non-empty `alias` publishes the location that produced the placement, so
/// later `useAlias` boxes in the same context resolve to the identical result.
pub fn resolve_location(location: &Location, ctx: &RenderContext) -> CardResult<Placement> {
    resolve_with_depth(location, ctx, 0)
}

fn resolve_with_depth(
    location: &Location,
    ctx: &RenderContext,
    depth: usize,
) -> CardResult<Placement> {
    let layout = &location.layout;

    if let Some(name) = layout.use_alias.as_deref()
        && !name.is_empty()
    {
        if depth >= MAX_ALIAS_DEPTH {
            return Err(CardError::layout(format!(
                "alias {name:?} exceeds the maximum indirection depth of {MAX_ALIAS_DEPTH}"
            )));
        }
        let target = ctx
            .aliases
            .lookup(name)
            .ok_or_else(|| CardError::layout(format!("alias {name:?} has not been declared")))?;
        let placement = resolve_with_depth(&target, ctx, depth + 1)?;
        if !location.alias.is_empty() && location.alias != name {
            ctx.aliases.publish(location.alias.clone(), target);
        }
        return Ok(placement);
    }

    if let Some(key) = layout.use_grid_key.as_deref()
        && GRID_KEY.is_match(key)
    {
        let lookup = ctx.grid_keys.as_ref().ok_or_else(|| {
            CardError::layout(format!("grid key {key:?} used but no key table is loaded"))
        })?;
        let placement = lookup.resolve_key(key, ctx)?;
        publish(location, ctx);
        return Ok(placement);
    }

    resolve_direct(location, ctx)
}

fn resolve_direct(location: &Location, ctx: &RenderContext) -> CardResult<Placement> {
    let layout = &location.layout;
    let (x_dim, y_dim) = match (layout.x, layout.y) {
        (Some(x), Some(y)) => (x, y),
        (None, _) => return Err(CardError::layout("box is missing its x coordinate")),
        (_, None) => return Err(CardError::layout("box is missing its y coordinate")),
    };

    let (w_px, h_px) = (ctx.canvas_width, ctx.canvas_height);
    let (unit_x, unit_y) = (ctx.grid_unit_x, ctx.grid_unit_y);

    let y = y_dim.resolve(h_px, unit_y);
    let x = x_dim.resolve(w_px, unit_x);

    let end_y = match (layout.y2, layout.height) {
        (Some(y2), _) => y2.resolve(h_px, unit_y),
        (None, Some(height)) => y + height.resolve(h_px, unit_y),
        (None, None) => y + unit_y,
    };
    let end_x = match (layout.x2, layout.width) {
        (Some(x2), _) => x2.resolve(w_px, unit_x),
        (None, Some(width)) => x + width.resolve(w_px, unit_x),
        (None, None) => x + unit_x,
    };

    let (left, top) = (x.round(), y.round());
    let width = end_x.round() - left;
    let height = end_y.round() - top;
    if width < 1.0 || height < 1.0 {
        return Err(CardError::layout(format!(
            "box resolves to a non-positive area {width}x{height} at ({left},{top})"
        )));
    }
    if width > f64::from(u32::MAX) || height > f64::from(u32::MAX) {
        return Err(CardError::layout(format!(
            "box area {width}x{height} is too large"
        )));
    }

    let anchor = PixelPoint::new(clamp_i32(left), clamp_i32(top));
    let (width, height) = (width as u32, height as u32);
    check_area(width, height, ctx)?;

    let mut mask = ctx
        .tile_mask
        .as_deref()
        .map(|tile| clip_tile_mask(tile, anchor, width, height));

    if let Some(radius) = layout.border_radius {
        // Smallest unit and extent keep a percentage radius circular on non-square canvases.
        let unit = unit_x.min(unit_y);
        let extent = w_px.min(h_px);
        let r = radius
            .resolve(extent, unit)
            .round()
            .clamp(0.0, f64::from(u32::MAX)) as i64;
        let rounded = rounded_mask(width, height, r);
        mask = Some(match mask {
            Some(mut tile) => {
                intersect_masks(&mut tile, &rounded);
                tile
            }
            None => rounded,
        });
    }

    let canvas = new_canvas(width, height);
    publish(location, ctx);

    Ok(Placement {
        canvas,
        anchor,
        mask,
    })
}

/// Reject boxes whose sub-canvas would dwarf the frame or not fit in memory.
fn check_area(width: u32, height: u32, ctx: &RenderContext) -> CardResult<()> {
    let limit = u64::from(ctx.canvas_width) * u64::from(ctx.canvas_height) * MAX_AREA_FACTOR;
    let area = u64::from(width) * u64::from(height);
    let samples = usize::try_from(width)
        .ok()
        .zip(usize::try_from(height).ok())
        .and_then(|(w, h)| w.checked_mul(h))
        .and_then(|px| px.checked_mul(4));
    if area > limit || samples.is_none() {
        return Err(CardError::layout(format!(
            "box area {width}x{height} exceeds {MAX_AREA_FACTOR} times the {}x{} canvas",
            ctx.canvas_width, ctx.canvas_height
        )));
    }
    Ok(())
}

fn publish(location: &Location, ctx: &RenderContext) {
    if !location.alias.is_empty() {
        ctx.aliases
            .publish(location.alias.clone(), location.clone());
    }
}

fn clamp_i32(v: f64) -> i32 {
    v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
