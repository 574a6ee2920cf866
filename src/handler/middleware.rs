use std::sync::Arc;

use serde_json::Value;

use crate::foundation::core::Canvas;
use crate::handler::chain::{Middleware, SharedHandler, handler_fn, middleware};
use crate::handler::request::Request;
use crate::handler::response::{BAD_REQUEST, OK, Response};
use crate::schema::SchemaValidator;

/// Reject payloads that fail `schema` with a `400` before the wrapped handler runs.
///
/// Messages of every violation are joined with `,`.
pub fn schema_validator(validator: Arc<dyn SchemaValidator>, schema: Arc<Value>) -> Middleware {
    middleware(move |next: SharedHandler| {
        let validator = Arc::clone(&validator);
        let schema = Arc::clone(&schema);
        handler_fn(move |resp, req| {
            let errors = validator.validate(&schema, &req.raw, &req.patch.full_name);
            if errors.is_empty() {
                next.handle(resp, req);
                return;
            }
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            resp.write(BAD_REQUEST, &joined);
        })
    })
}

/// Emit one structured `tracing` event for every status written by the wrapped handler.
pub fn logger() -> Middleware {
    middleware(|next: SharedHandler| {
        handler_fn(move |resp, req| {
            let mut logged = LoggingResponse { inner: resp, req };
            next.handle(&mut logged, req);
        })
    })
}

struct LoggingResponse<'a> {
    inner: &'a mut dyn Response,
    req: &'a Request,
}

impl Response for LoggingResponse<'_> {
    fn write(&mut self, status: u16, message: &str) {
        let run_id = self.req.frame.run_id.as_str();
        let frame = self.req.frame.frame_number.0;
        let widget = self.req.patch.full_name.as_str();
        if status == OK {
            tracing::info!(run_id, frame, widget, status, detail = message, "widget response");
        } else {
            tracing::warn!(run_id, frame, widget, status, detail = message, "widget response");
        }
        self.inner.write(status, message);
    }

    fn canvas(&self) -> &Canvas {
        self.inner.canvas()
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        self.inner.canvas_mut()
    }
}

/// Run the wrapped handler inside a `widget` span.
pub fn trace_spans() -> Middleware {
    middleware(|next: SharedHandler| {
        handler_fn(move |resp, req| {
            let span = tracing::info_span!(
                "widget",
                run_id = %req.frame.run_id,
                frame = req.frame.frame_number.0,
                widget = %req.patch.full_name,
                widget_type = %req.patch.widget_type,
            );
            let _enter = span.enter();
            next.handle(resp, req);
        })
    })
}

#[cfg(test)]
#[path = "../../tests/unit/handler/middleware.rs"]
mod tests;
