use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::project::Project;
use crate::encode::encoders::{EncoderRegistry, SharedEncoder};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{CardError, CardResult};
use crate::handler::chain::{Handler, Middleware, SharedHandler};
use crate::handler::registry::HandlerRegistry;
use crate::handler::request::{Request, SearchFn};
use crate::handler::response::Response;
use crate::render::compositor::{FrameOutcome, WidgetCompositor};
use crate::schema::{JsonSchemaValidator, SchemaValidator};
use crate::session::driver::{FrameDriver, RunReport};

/// Run-wide knobs.
#[derive(Clone, Debug)]
pub struct RunnerOpts {
    /// Widget handlers allowed to generate at once. Zero is treated as one.
    pub runner_count: usize,
    /// Names the manifest and metadata files; a timestamp when absent.
    pub run_id: Option<String>,
}

impl Default for RunnerOpts {
    fn default() -> Self {
        Self {
            runner_count: 1,
            run_id: None,
        }
    }
}

/// A configured test-card session: project, handlers, middlewares and encoders.
///
/// Registration happens before [`Engine::run`]; the run itself only reads.
pub struct Engine {
    project: Project,
    registry: HandlerRegistry,
    middlewares: Vec<Middleware>,
    encoders: EncoderRegistry,
    validator: Arc<dyn SchemaValidator>,
    search: Option<SearchFn>,
    opts: RunnerOpts,
}

impl Engine {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            registry: HandlerRegistry::new(),
            middlewares: Vec::new(),
            encoders: EncoderRegistry::with_defaults(),
            validator: Arc::new(JsonSchemaValidator::new()),
            search: None,
            opts: RunnerOpts::default(),
        }
    }

    /// Load and validate a project file.
    pub fn from_path(path: impl AsRef<Path>) -> CardResult<Self> {
        let project = Project::from_path(path)?;
        project.validate()?;
        Ok(Self::new(project))
    }

    pub fn with_opts(mut self, opts: RunnerOpts) -> Self {
        self.opts = opts;
        self
    }

    pub fn with_search(mut self, search: SearchFn) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    /// See [`HandlerRegistry::register_type`]. Panics on a duplicate type.
    pub fn register_type<T>(&mut self, widget_type: &str, schema: Value)
    where
        T: Handler + serde::de::DeserializeOwned + 'static,
    {
        self.registry.register_type::<T>(widget_type, schema);
    }

    /// See [`HandlerRegistry::register_handler`]. Panics on a duplicate type.
    pub fn register_handler(&mut self, widget_type: &str, schema: Value, handler: SharedHandler) {
        self.registry.register_handler(widget_type, schema, handler);
    }

    /// See [`HandlerRegistry::register_func`]. Panics on a duplicate type.
    pub fn register_func<F>(&mut self, widget_type: &str, f: F)
    where
        F: Fn(&mut dyn Response, &Request) + Send + Sync + 'static,
    {
        self.registry.register_func(widget_type, f);
    }

    /// Append middlewares to the global chain. Earlier middlewares run first.
    pub fn use_middleware(&mut self, middlewares: impl IntoIterator<Item = Middleware>) {
        self.middlewares.extend(middlewares);
    }

    /// Register an encoder for another file extension. Panics on a duplicate extension.
    pub fn add_encoder(&mut self, extension: &str, encoder: SharedEncoder) {
        self.encoders.register(extension, encoder);
    }

    fn compositor(&self) -> WidgetCompositor {
        WidgetCompositor::new(
            Arc::new(self.registry.clone()),
            self.middlewares.clone(),
            Arc::clone(&self.validator),
            self.opts.runner_count,
        )
        .with_search(self.search.clone())
    }

    fn run_id(&self) -> String {
        self.opts
            .run_id
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%dT%H-%M-%S").to_string())
    }

    /// Render and save every frame into `out_dir`.
    #[tracing::instrument(skip(self, out_dir), fields(out_dir = %out_dir.as_ref().display()))]
    pub fn run(&self, out_dir: impl AsRef<Path>) -> CardResult<RunReport> {
        let compositor = self.compositor();
        let driver = FrameDriver {
            project: &self.project,
            compositor: &compositor,
            encoders: &self.encoders,
            tile_mask: self.project.load_tile_mask()?,
            run_id: self.run_id(),
        };
        tracing::info!(
            run_id = %driver.run_id,
            frames = self.project.frame_count(),
            runners = compositor.runner_count(),
            "starting run"
        );
        driver.run(out_dir.as_ref())
    }

    /// Render one frame in memory without saving it.
    pub fn render_frame(&self, frame: FrameIndex) -> CardResult<(Canvas, FrameOutcome)> {
        let compositor = self.compositor();
        let driver = FrameDriver {
            project: &self.project,
            compositor: &compositor,
            encoders: &self.encoders,
            tile_mask: self.project.load_tile_mask()?,
            run_id: self.run_id(),
        };
        driver.render(frame)
    }

    /// Encode `canvas` for `path`'s extension and write it.
    pub fn save_canvas(&self, path: &Path, canvas: &Canvas) -> CardResult<()> {
        let bytes = self
            .encoders
            .encode_for(path, canvas, self.project.bit_depth())?;
        std::fs::write(path, bytes)
            .map_err(|e| CardError::encode(format!("write {}: {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/engine.rs"]
mod tests;
