use super::*;
use crate::layout::unit::Dimension;
use serde_json::json;

#[test]
fn canvas_defaults() {
    let canvas: CanvasDef = serde_json::from_value(json!({"width": 1920, "height": 1080})).unwrap();
    assert_eq!((canvas.rows, canvas.columns), (9, 16));
    assert_eq!(canvas.effective_bit_depth(), 16);
    assert!(canvas.background.is_none());
    assert!(canvas.file_names.is_empty());
}

#[test]
fn widget_def_reads_engine_fields_and_ignores_the_rest() {
    let widget: WidgetDef = serde_json::from_value(json!({
        "name": "bars",
        "type": "builtin.fill",
        "alias": "main",
        "grid": {"x": 0, "y": "10%", "x2": "100px", "borderRadius": "5px"},
        "fill": "#ff0000"
    }))
    .unwrap();
    assert_eq!(widget.widget_type, "builtin.fill");
    assert_eq!(widget.grid.y, Some(Dimension::Percent(10.0)));
    assert_eq!(widget.grid.x2, Some(Dimension::Pixels(100.0)));
    assert_eq!(widget.grid.border_radius, Some(Dimension::Pixels(5.0)));
}

#[test]
fn malformed_grid_literal_fails_at_load() {
    let err = serde_json::from_value::<WidgetDef>(json!({
        "name": "bad",
        "grid": {"x": "12em", "y": 0}
    }))
    .unwrap_err();
    assert!(err.to_string().contains("12em"));
}

#[test]
fn merge_is_recursive_for_objects_only() {
    let mut base = json!({"a": {"b": 1, "c": [1, 2]}, "d": "keep"});
    merge_json(&mut base, &json!({"a": {"b": 5, "c": [9]}, "e": true}));
    assert_eq!(base, json!({"a": {"b": 5, "c": [9]}, "d": "keep", "e": true}));
}
