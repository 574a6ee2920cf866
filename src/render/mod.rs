//! Ordered concurrent widget compositing.

pub mod composite;
pub mod compositor;
pub mod pool;
pub mod turnstile;

pub use compositor::{
    CANVAS_OPTIONS_TYPE, FrameOutcome, WidgetCompositor, WidgetOutcome, WidgetRecord,
};
pub use pool::{ConcurrencyPool, PoolPermit};
pub use turnstile::{TurnGuard, Turnstile};
