pub mod driver;
pub mod engine;
pub mod metadata;

pub use driver::{FrameDriver, FrameReport, RunReport};
pub use engine::{Engine, RunnerOpts};
pub use metadata::{FrameMetadata, MetadataLog, average_colour};
