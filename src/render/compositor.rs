use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::core::{Canvas, ColourSpace, new_canvas};
use crate::foundation::error::CardResult;
use crate::handler::chain::{Middleware, SharedHandler, chain, error_handler};
use crate::handler::middleware::schema_validator;
use crate::handler::registry::HandlerRegistry;
use crate::handler::request::{FrameProperties, PatchProperties, Request, SearchFn};
use crate::handler::response::{BAD_REQUEST, INTERNAL, OK, Response, WidgetResponse};
use crate::layout::boxspec::Location;
use crate::layout::geometry::grid_segments;
use crate::layout::resolver::{Placement, RenderContext, resolve_location};
use crate::render::composite::composite_masked;
use crate::render::pool::ConcurrencyPool;
use crate::render::turnstile::Turnstile;
use crate::schema::SchemaValidator;

/// Widget type that only carries canvas settings and never draws.
pub const CANVAS_OPTIONS_TYPE: &str = "builtin.canvasoptions";

/// One widget instance for one frame, as produced by the configuration layer.
#[derive(Debug)]
pub struct WidgetRecord {
    /// Stacking position; `0` is drawn first.
    pub z_pos: usize,
    pub alias: String,
    pub full_name: String,
    pub widget_type: String,
    /// The widget's box, or why it could not be read. An error here is reported as a `400`
    /// for this widget only.
    pub location: CardResult<Location>,
    pub colour_space: ColourSpace,
    /// Merged widget configuration as JSON bytes.
    pub payload: Arc<[u8]>,
}

impl WidgetRecord {
    /// True for records that pass through the frame without generating anything.
    pub fn is_noop(&self) -> bool {
        self.widget_type.is_empty() || self.widget_type == CANVAS_OPTIONS_TYPE
    }
}

/// What happened to one widget.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct WidgetOutcome {
    pub z_pos: usize,
    pub full_name: String,
    pub widget_type: String,
    /// `0` when the handler never wrote.
    pub status: u16,
    pub message: String,
    pub composited: bool,
    pub skipped: bool,
}

impl WidgetOutcome {
    pub fn is_error(&self) -> bool {
        !self.skipped && self.status != OK
    }
}

/// Outcomes of one frame, in stacking order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FrameOutcome {
    pub widgets: Vec<WidgetOutcome>,
}

impl FrameOutcome {
    pub fn error_count(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_error()).count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &WidgetOutcome> {
        self.widgets.iter().filter(|w| w.is_error())
    }
}

/// Runs widget handlers concurrently and blends their output in strict `z_pos` order.
pub struct WidgetCompositor {
    registry: Arc<HandlerRegistry>,
    middlewares: Vec<Middleware>,
    validator: Arc<dyn SchemaValidator>,
    pool: ConcurrencyPool,
    search: Option<SearchFn>,
}

struct Prepared<'r> {
    position: usize,
    record: &'r WidgetRecord,
    /// `None` for no-op records.
    job: Option<Job>,
}

struct Job {
    handler: SharedHandler,
    request: Request,
    placement: Option<Placement>,
}

impl WidgetCompositor {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        middlewares: Vec<Middleware>,
        validator: Arc<dyn SchemaValidator>,
        runner_count: usize,
    ) -> Self {
        Self {
            registry,
            middlewares,
            validator,
            pool: ConcurrencyPool::new(runner_count),
            search: None,
        }
    }

    pub fn with_search(mut self, search: Option<SearchFn>) -> Self {
        self.search = search;
        self
    }

    pub fn runner_count(&self) -> usize {
        self.pool.capacity()
    }

    /// Generate and composite every record onto `canvas`. Blocks until all units finish.
    ///
    /// Layouts are resolved in stacking order on the calling thread so alias lookups always see
    /// earlier declarations. Generation then fans out under the pool; blending is serialized by
    /// a turnstile so the final canvas equals compositing in ascending `z_pos`.
    #[tracing::instrument(skip_all, fields(frame = frame.frame_number.0, widgets = records.len()))]
    pub fn run_frame(
        &self,
        records: &[WidgetRecord],
        frame: &FrameProperties,
        ctx: &RenderContext,
        canvas: &mut Canvas,
    ) -> FrameOutcome {
        let ordered = order_records(records);
        let turnstile = Turnstile::new();
        let shared = Mutex::new(canvas);

        let outcomes = std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(ordered.len());
            for (position, record) in ordered.iter().copied().enumerate() {
                let job = (!record.is_noop()).then(|| self.prepare(record, frame, ctx));
                let unit = Prepared {
                    position,
                    record,
                    job,
                };
                let permit = self.pool.acquire();
                let (turnstile, shared) = (&turnstile, &shared);
                let handle = scope.spawn(move || {
                    let (response, placement) = match unit.job {
                        Some(mut job) => {
                            let resp = generate(&mut job);
                            (Some(resp), job.placement)
                        }
                        None => (None, None),
                    };
                    permit.release();

                    let _turn = turnstile.wait_for(unit.position);
                    let composited = match (&response, placement) {
                        (Some(resp), Some(placement)) if resp.is_ok() => {
                            let mut canvas = shared.lock();
                            composite_masked(
                                &mut **canvas,
                                resp.canvas(),
                                placement.anchor,
                                placement.mask.as_ref(),
                            );
                            true
                        }
                        _ => false,
                    };
                    outcome(unit.position, unit.record, response.as_ref(), composited)
                });
                handles.push((position, record, handle));
            }

            handles
                .into_iter()
                .map(|(position, record, handle)| {
                    handle.join().unwrap_or_else(|_| WidgetOutcome {
                        z_pos: position,
                        full_name: record.full_name.clone(),
                        widget_type: record.widget_type.clone(),
                        status: INTERNAL,
                        message: "widget unit panicked while compositing".to_string(),
                        composited: false,
                        skipped: false,
                    })
                })
                .collect::<Vec<_>>()
        });

        for failed in outcomes.iter().filter(|w| w.is_error()) {
            tracing::debug!(
                widget = %failed.full_name,
                status = failed.status,
                reason = %failed.message,
                "widget not composited"
            );
        }
        FrameOutcome { widgets: outcomes }
    }

    /// Resolve layout and dispatch the handler for one record.
    ///
    /// A layout failure overrides a dispatch failure; either becomes a `400` handler.
    fn prepare(&self, record: &WidgetRecord, frame: &FrameProperties, ctx: &RenderContext) -> Job {
        let dispatched = self
            .registry
            .dispatch(&record.widget_type, &record.full_name, &record.payload);
        let placement = match &record.location {
            Ok(location) => resolve_location(location, ctx).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        let (width, height, anchor, geometry) = match &placement {
            Ok(p) => (p.width(), p.height(), p.anchor, grid_segments(p.rect(), ctx)),
            Err(_) => (0, 0, Default::default(), Vec::new()),
        };
        let request = Request::new(
            Arc::clone(&record.payload),
            frame.clone(),
            PatchProperties {
                widget_type: record.widget_type.clone(),
                full_name: record.full_name.clone(),
                width,
                height,
                anchor,
                geometry,
                colour_space: record.colour_space.clone(),
            },
        )
        .with_search(self.search.clone());

        let (endpoint, schema) = match (dispatched, &placement) {
            (_, Err(e)) => (error_handler(BAD_REQUEST, e.clone()), None),
            (Err(e), Ok(_)) => (error_handler(BAD_REQUEST, e.to_string()), None),
            (Ok((handler, schema)), Ok(_)) => (handler, Some(schema)),
        };

        let mut layers = self.middlewares.clone();
        if let Some(schema) = schema {
            layers.push(schema_validator(Arc::clone(&self.validator), schema));
        }

        Job {
            handler: chain(&layers, endpoint),
            request,
            placement: placement.ok(),
        }
    }
}

fn generate(job: &mut Job) -> WidgetResponse {
    let canvas = job
        .placement
        .as_mut()
        .map_or_else(|| new_canvas(0, 0), |p| std::mem::take(&mut p.canvas));
    let mut resp = WidgetResponse::new(canvas);
    let run = catch_unwind(AssertUnwindSafe(|| {
        job.handler.handle(&mut resp, &job.request)
    }));
    if let Err(payload) = run {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        resp.write(INTERNAL, &format!("widget handler panicked: {reason}"));
    }
    resp
}

fn outcome(
    position: usize,
    record: &WidgetRecord,
    response: Option<&WidgetResponse>,
    composited: bool,
) -> WidgetOutcome {
    let (status, message) = match response {
        Some(resp) if resp.status() == 0 => (0, "handler did not write a status".to_string()),
        Some(resp) => (resp.status(), resp.message().to_string()),
        None => (0, String::new()),
    };
    WidgetOutcome {
        z_pos: position,
        full_name: record.full_name.clone(),
        widget_type: record.widget_type.clone(),
        status,
        message,
        composited,
        skipped: response.is_none(),
    }
}

/// Sort by `z_pos`. Non-dense positions fall back to that sorted order.
fn order_records(records: &[WidgetRecord]) -> Vec<&WidgetRecord> {
    let mut ordered: Vec<&WidgetRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.z_pos);
    let dense = ordered.iter().enumerate().all(|(i, r)| r.z_pos == i);
    if !dense {
        tracing::warn!(
            widgets = ordered.len(),
            "widget z positions are not dense; compositing in sorted order"
        );
    }
    ordered
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
