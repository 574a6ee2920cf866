use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::config::project::Project;
use crate::encode::encoders::EncoderRegistry;
use crate::encode::manifest::{Manifest, pixel_digest};
use crate::foundation::core::{Canvas, FrameIndex, Mask};
use crate::foundation::error::{CardError, CardResult};
use crate::handler::request::FrameProperties;
use crate::render::compositor::{FrameOutcome, WidgetCompositor};
use crate::session::metadata::{FrameMetadata, MetadataLog, average_colour};

/// Result of one frame: what the widgets did and where the frame went.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub frame: FrameIndex,
    pub outcome: FrameOutcome,
    pub files: Vec<PathBuf>,
    /// One message per file that could not be written.
    pub save_errors: Vec<String>,
    pub generation: Duration,
    pub save: Duration,
}

impl FrameReport {
    pub fn error_count(&self) -> usize {
        self.outcome.error_count() + self.save_errors.len()
    }
}

/// Result of a whole run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub run_id: String,
    pub frames: Vec<FrameReport>,
    pub manifest: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
}

impl RunReport {
    pub fn error_count(&self) -> usize {
        self.frames.iter().map(FrameReport::error_count).sum()
    }
}

/// Renders a project's frames one after another and saves each before starting the next.
pub struct FrameDriver<'a> {
    pub(crate) project: &'a Project,
    pub(crate) compositor: &'a WidgetCompositor,
    pub(crate) encoders: &'a EncoderRegistry,
    pub(crate) tile_mask: Option<Arc<Mask>>,
    pub(crate) run_id: String,
}

impl FrameDriver<'_> {
    /// Build records, a fresh layout context and the base canvas, then composite.
    pub fn render(&self, frame: FrameIndex) -> CardResult<(Canvas, FrameOutcome)> {
        let records = self.project.widgets_for_frame(frame)?;
        let ctx = self.project.render_context(self.tile_mask.clone())?;
        let mut canvas = self.project.base_canvas()?;
        let props = FrameProperties {
            run_id: self.run_id.clone(),
            frame_number: frame,
            working_dir: self.project.base_dir().to_path_buf(),
        };
        let outcome = self.compositor.run_frame(&records, &props, &ctx, &mut canvas);
        Ok((canvas, outcome))
    }

    /// Run every frame into `out_dir`.
    pub fn run(&self, out_dir: &Path) -> CardResult<RunReport> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create output directory {}", out_dir.display()))?;

        let total = self.project.frame_count();
        if self.project.def().canvas.file_names.is_empty() {
            tracing::warn!("project declares no fileNames; frames are rendered but not saved");
        }

        let mut manifest = Manifest::new(&self.run_id);
        let mut metadata = MetadataLog::new(&self.run_id);
        let mut frames = Vec::with_capacity(total as usize);

        for i in 0..total {
            let frame = FrameIndex(i);
            let started = Instant::now();
            let (canvas, outcome) = self.render(frame)?;
            let generation = started.elapsed();

            let started = Instant::now();
            let (files, save_errors) = self.save(frame, &canvas, out_dir, &mut manifest);
            let save = started.elapsed();

            metadata.push(self.metadata(frame, &canvas));

            let report = FrameReport {
                frame,
                outcome,
                files,
                save_errors,
                generation,
                save,
            };
            tracing::info!(
                "generating frame {}/{}, gen: {} ms, save: {} ms, errors: {}",
                i + 1,
                total,
                generation.as_millis(),
                save.as_millis(),
                report.error_count()
            );
            for failed in report.outcome.errors() {
                tracing::warn!(
                    frame = i,
                    widget = %failed.full_name,
                    status = failed.status,
                    "{}",
                    failed.message
                );
            }
            frames.push(report);
        }

        let manifest_path = if manifest.files.is_empty() {
            None
        } else {
            Some(manifest.write_to(out_dir)?)
        };
        let metadata_path = if metadata.is_empty() {
            None
        } else {
            Some(metadata.write_to(out_dir)?)
        };

        Ok(RunReport {
            run_id: self.run_id.clone(),
            frames,
            manifest: manifest_path,
            metadata: metadata_path,
        })
    }

    /// Encode and write every configured file. Failures are logged and skipped per file.
    fn save(
        &self,
        frame: FrameIndex,
        canvas: &Canvas,
        out_dir: &Path,
        manifest: &mut Manifest,
    ) -> (Vec<PathBuf>, Vec<String>) {
        let names = self.project.file_names(frame);
        let pixels = (!names.is_empty()).then(|| pixel_digest(canvas));
        let mut written = Vec::new();
        let mut errors = Vec::new();

        for name in names {
            let path = out_dir.join(&name);
            match self.write_file(&path, canvas) {
                Ok(bytes) => {
                    manifest.record(&name, frame, &bytes, pixels.as_deref().unwrap_or_default());
                    written.push(path);
                }
                Err(e) => {
                    tracing::warn!(frame = frame.0, file = %path.display(), "save failed: {e}");
                    errors.push(format!("{}: {e}", path.display()));
                }
            }
        }
        (written, errors)
    }

    fn write_file(&self, path: &Path, canvas: &Canvas) -> CardResult<Vec<u8>> {
        let bytes = self
            .encoders
            .encode_for(path, canvas, self.project.bit_depth())?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        std::fs::write(path, &bytes).map_err(|e| {
            CardError::encode(format!("write {}: {e}", path.display()))
        })?;
        Ok(bytes)
    }

    fn metadata(&self, frame: FrameIndex, canvas: &Canvas) -> FrameMetadata {
        let wanted = self.project.metadata();
        FrameMetadata {
            frame,
            average_colour: wanted.average_colour.then(|| average_colour(canvas)),
            configuration: wanted
                .configuration
                .then(|| self.project.frame_configuration(frame)),
        }
    }
}
