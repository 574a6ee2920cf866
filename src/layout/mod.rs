//! Grid layout resolution: unit-polymorphic boxes to pixel placements and clipping masks.

pub mod alias;
pub mod boxspec;
pub mod geometry;
pub mod mask;
pub mod resolver;
pub mod unit;

pub use boxspec::{LayoutBox, Location};
pub use resolver::{GridKeyLookup, KeyTable, Placement, RenderContext, resolve_location};
pub use unit::Dimension;
