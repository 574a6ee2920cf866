use super::*;
use crate::foundation::core::{FrameIndex, OPAQUE, new_canvas};
use crate::handler::request::{FrameProperties, PatchProperties};
use crate::handler::response::WidgetResponse;
use crate::schema::{JsonSchemaValidator, SchemaValidator};
use std::sync::Arc;

fn request(raw: &[u8]) -> Request {
    let frame = FrameProperties {
        run_id: "r".into(),
        frame_number: FrameIndex(0),
        working_dir: ".".into(),
    };
    let patch = PatchProperties {
        widget_type: FILL_TYPE.into(),
        full_name: "fill".into(),
        width: 4,
        height: 2,
        anchor: crate::foundation::core::PixelPoint::new(0, 0),
        geometry: Vec::new(),
        colour_space: Default::default(),
    };
    Request::new(Arc::<[u8]>::from(raw), frame, patch)
}

#[test]
fn fill_paints_every_pixel() {
    let mut resp = WidgetResponse::new(new_canvas(4, 2));
    let widget = Fill {
        fill: "#00ff0080".into(),
    };
    widget.handle(&mut resp, &request(b"{}"));
    assert_eq!(resp.status(), OK);
    let canvas = resp.into_canvas();
    assert!(canvas.pixels().all(|p| p.0 == [0, OPAQUE, 0, 0x8080]));
}

#[test]
fn bad_colour_is_a_client_error() {
    let mut resp = WidgetResponse::new(new_canvas(1, 1));
    Fill {
        fill: "red".into(),
    }
    .handle(&mut resp, &request(b"{}"));
    assert_eq!(resp.status(), BAD_REQUEST);
}

#[test]
fn schema_requires_a_hex_fill() {
    let schema = Fill::schema();
    let v = JsonSchemaValidator::new();
    assert!(v.validate(&schema, br##"{"fill": "#abc"}"##, FILL_TYPE).is_empty());
    assert!(!v.validate(&schema, br##"{"fill": "blue"}"##, FILL_TYPE).is_empty());
    assert!(!v.validate(&schema, b"{}", FILL_TYPE).is_empty());
}

#[test]
fn builtins_register_fill() {
    let mut registry = HandlerRegistry::new();
    register_builtins(&mut registry);
    assert_eq!(registry.types(), vec![FILL_TYPE]);
}
