#![forbid(unsafe_code)]
//! Broadcast test-card rendering.
//!
//! A project declares a canvas, a stack of widgets placed on a grid, and per-frame overrides.
//! Each frame is laid out by [`layout`], generated concurrently by widget handlers, and
//! composited back onto the canvas in declaration order by [`render`].

pub mod config;
pub mod encode;
pub mod foundation;
pub mod handler;
pub mod layout;
pub mod render;
pub mod schema;
pub mod session;
pub mod widgets;

pub use config::{Project, ProjectDef};
pub use encode::{Encoder, EncoderRegistry};
pub use foundation::core::{Canvas, FrameIndex, Mask, PixelPoint, PixelRect};
pub use foundation::error::{CardError, CardResult};
pub use handler::{Handler, HandlerRegistry, Middleware, Request, Response};
pub use layout::{LayoutBox, Location, RenderContext, resolve_location};
pub use render::{FrameOutcome, WidgetCompositor, WidgetOutcome, WidgetRecord};
pub use session::{Engine, RunReport, RunnerOpts};
