use super::*;
use crate::foundation::core::{ColourSpace, FrameIndex, PixelPoint, new_canvas};
use crate::handler::chain::{chain, error_handler};
use crate::handler::request::{FrameProperties, PatchProperties};
use crate::handler::response::WidgetResponse;
use crate::schema::JsonSchemaValidator;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::BTreeMap;
use tracing_subscriber::layer::{Context, SubscriberExt};

fn request(raw: &str) -> Request {
    Request::new(
        raw.as_bytes().to_vec(),
        FrameProperties {
            run_id: "run-7".into(),
            frame_number: FrameIndex(2),
            working_dir: ".".into(),
        },
        PatchProperties {
            widget_type: "builtin.fill".into(),
            full_name: "frame.box".into(),
            width: 1,
            height: 1,
            anchor: PixelPoint::new(0, 0),
            geometry: Vec::new(),
            colour_space: ColourSpace::default(),
        },
    )
}

#[derive(Default)]
struct Recorded {
    events: Mutex<Vec<(tracing::Level, BTreeMap<String, String>)>>,
}

struct RecordingLayer(Arc<Recorded>);

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RecordingLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.0
            .events
            .lock()
            .push((*event.metadata().level(), fields));
    }
}

fn with_recorder(f: impl FnOnce()) -> Vec<(tracing::Level, BTreeMap<String, String>)> {
    let recorded = Arc::new(Recorded::default());
    let subscriber = tracing_subscriber::registry().with(RecordingLayer(Arc::clone(&recorded)));
    tracing::subscriber::with_default(subscriber, f);
    let events = std::mem::take(&mut *recorded.events.lock());
    events
}

#[test]
fn validator_passes_valid_payloads_through() {
    let schema = Arc::new(json!({"type": "object", "required": ["fill"]}));
    let h = chain(
        &[schema_validator(Arc::new(JsonSchemaValidator::new()), schema)],
        error_handler(OK, "drawn"),
    );
    let mut resp = WidgetResponse::new(new_canvas(1, 1));
    h.handle(&mut resp, &request(r##"{"fill":"#000"}"##));
    assert_eq!((resp.status(), resp.message()), (OK, "drawn"));
}

#[test]
fn validator_rejects_with_joined_messages() {
    let schema = Arc::new(json!({
        "type": "object",
        "properties": {"size": {"type": "integer"}},
        "required": ["fill"]
    }));
    let h = chain(
        &[schema_validator(Arc::new(JsonSchemaValidator::new()), schema)],
        error_handler(OK, "should not run"),
    );
    let mut resp = WidgetResponse::new(new_canvas(1, 1));
    h.handle(&mut resp, &request(r#"{"size":"big"}"#));
    assert_eq!(resp.status(), BAD_REQUEST);
    let parts: Vec<&str> = resp.message().split(',').collect();
    assert_eq!(parts.len(), 2, "{}", resp.message());
    assert!(parts[0].contains("fill is required"));
    assert!(parts[1].contains("$.size"));
}

#[test]
fn logger_emits_one_event_per_write() {
    let h = chain(
        &[logger()],
        handler_fn(|resp, _req| {
            resp.write(BAD_REQUEST, "bad colour");
            resp.write(OK, "fine");
        }),
    );
    let mut resp = WidgetResponse::new(new_canvas(1, 1));
    let events = with_recorder(|| h.handle(&mut resp, &request("{}")));

    assert_eq!(resp.status(), OK);
    assert_eq!(events.len(), 2);

    let (level, fields) = &events[0];
    assert_eq!(*level, tracing::Level::WARN);
    assert_eq!(fields["run_id"], "run-7");
    assert_eq!(fields["frame"], "2");
    assert_eq!(fields["widget"], "frame.box");
    assert_eq!(fields["status"], "400");
    assert_eq!(fields["detail"], "bad colour");

    assert_eq!(events[1].0, tracing::Level::INFO);
    assert_eq!(events[1].1["status"], "200");
}

#[test]
fn logger_forwards_drawing_to_the_real_response() {
    let h = chain(
        &[logger(), trace_spans()],
        handler_fn(|resp, _req| {
            resp.set_pixel(0, 0, image::Rgba([7; 4]));
            resp.write(OK, "");
        }),
    );
    let mut resp = WidgetResponse::new(new_canvas(1, 1));
    h.handle(&mut resp, &request("{}"));
    assert_eq!(resp.pixel(0, 0), image::Rgba([7; 4]));
}
