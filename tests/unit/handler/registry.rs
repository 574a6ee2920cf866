use super::*;
use crate::foundation::core::{ColourSpace, FrameIndex, PixelPoint, new_canvas};
use crate::handler::request::{FrameProperties, PatchProperties};
use crate::handler::response::{OK, WidgetResponse};
use serde_json::json;

#[derive(serde::Deserialize)]
struct Echo {
    word: String,
}

impl Handler for Echo {
    fn handle(&self, resp: &mut dyn Response, _req: &Request) {
        resp.write(OK, &self.word);
    }
}

fn request() -> Request {
    Request::new(
        b"{}".to_vec(),
        FrameProperties {
            run_id: "r".into(),
            frame_number: FrameIndex(0),
            working_dir: ".".into(),
        },
        PatchProperties {
            widget_type: "echo".into(),
            full_name: "frame.echo".into(),
            width: 1,
            height: 1,
            anchor: PixelPoint::new(0, 0),
            geometry: Vec::new(),
            colour_space: ColourSpace::default(),
        },
    )
}

#[test]
fn typed_handlers_are_decoded_per_payload() {
    let mut reg = HandlerRegistry::new();
    reg.register_type::<Echo>("echo", json!({"required": ["word"]}));

    for word in ["one", "two"] {
        let payload = serde_json::to_vec(&json!({"type": "echo", "word": word})).unwrap();
        let (handler, schema) = reg.dispatch("echo", "frame.echo", &payload).unwrap();
        assert_eq!(schema["required"][0], "word");
        let mut resp = WidgetResponse::new(new_canvas(1, 1));
        handler.handle(&mut resp, &request());
        assert_eq!(resp.message(), word);
    }
}

#[test]
fn undecodable_payload_is_a_dispatch_error() {
    let mut reg = HandlerRegistry::new();
    reg.register_type::<Echo>("echo", json!({}));
    let err = reg
        .dispatch("echo", "frame.echo", br#"{"word": 5}"#)
        .err()
        .unwrap();
    assert!(matches!(err, CardError::Dispatch(_)));
    assert!(err.to_string().contains("frame.echo"));
}

#[test]
fn missing_type_names_type_and_path() {
    let reg = HandlerRegistry::new();
    let err = reg.dispatch("ghost", "frame.a.b", b"{}").err().unwrap();
    assert!(err.to_string().contains(
        r#"no handler found for widgets of type "ghost" for widget path "frame.a.b""#
    ));
}

#[test]
fn functions_get_an_empty_schema() {
    let mut reg = HandlerRegistry::new();
    reg.register_func("noop", |resp, _req| resp.write(OK, "ok"));
    let (_, schema) = reg.dispatch("noop", "frame.noop", b"{}").unwrap();
    assert_eq!(*schema, json!({}));
    assert_eq!(reg.types(), vec!["noop"]);
}

#[test]
#[should_panic(expected = "already registered")]
fn duplicate_registration_panics() {
    let mut reg = HandlerRegistry::new();
    reg.register_type::<Echo>("echo", json!({}));
    reg.register_func("echo", |resp, _req| resp.write(OK, ""));
}

#[test]
#[should_panic(expected = "already registered")]
fn duplicate_function_registration_panics() {
    let mut reg = HandlerRegistry::new();
    reg.register_func("f", |resp, _req| resp.write(OK, ""));
    reg.register_func("f", |resp, _req| resp.write(OK, ""));
}
