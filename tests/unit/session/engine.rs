use super::*;
use crate::foundation::core::OPAQUE;
use crate::handler::response::{INTERNAL, OK};
use crate::widgets::{FILL_TYPE, register_builtins};
use serde_json::json;

fn engine(doc: Value) -> Engine {
    let project = Project::from_reader(serde_json::to_vec(&doc).unwrap().as_slice()).unwrap();
    project.validate().unwrap();
    let mut engine = Engine::new(project).with_opts(RunnerOpts {
        runner_count: 3,
        run_id: Some("test-run".into()),
    });
    register_builtins(engine.registry_mut());
    engine
}

fn two_frames() -> Value {
    json!({
        "canvas": {
            "width": 32,
            "height": 18,
            "fileNames": ["card-{{framenumber}}.png", "card-{{framenumber}}.csv"]
        },
        "frameCount": 2,
        "metadata": {"averageColour": true},
        "widgets": [
            {"name": "bg", "type": FILL_TYPE, "grid": {"x": 0, "y": 0, "x2": 16, "y2": 9}, "fill": "#ff0000"},
            {"name": "corner", "type": FILL_TYPE, "grid": {"x": 0, "y": 0, "width": 1, "height": 1}, "fill": "#0000ff"}
        ],
        "frames": {
            "1": {"corner": {"fill": "#00ff00"}}
        }
    })
}

#[test]
fn run_writes_frames_manifest_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let report = engine(two_frames()).run(dir.path()).unwrap();

    assert_eq!(report.run_id, "test-run");
    assert_eq!(report.frames.len(), 2);
    assert_eq!(report.error_count(), 0);
    for name in ["card-0000.png", "card-0001.png", "card-0000.csv", "card-0001.csv"] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }

    let manifest = report.manifest.unwrap();
    assert!(manifest.ends_with("test-run.manifest.json"));
    let doc: Value = serde_json::from_slice(&std::fs::read(manifest).unwrap()).unwrap();
    assert_eq!(doc["files"].as_array().unwrap().len(), 4);

    assert!(report.metadata.unwrap().is_file());
}

#[test]
fn frame_updates_change_the_rendered_pixels() {
    let engine = engine(two_frames());
    let (first, outcome) = engine.render_frame(FrameIndex(0)).unwrap();
    assert_eq!(outcome.error_count(), 0);
    assert!(outcome.widgets.iter().all(|w| w.status == OK));
    assert_eq!(first.get_pixel(0, 0).0, [0, 0, OPAQUE, OPAQUE]);
    assert_eq!(first.get_pixel(31, 17).0, [OPAQUE, 0, 0, OPAQUE]);

    let (second, _) = engine.render_frame(FrameIndex(1)).unwrap();
    assert_eq!(second.get_pixel(0, 0).0, [0, OPAQUE, 0, OPAQUE]);
}

#[test]
fn unknown_extension_is_counted_but_not_fatal() {
    let mut doc = two_frames();
    doc["frameCount"] = json!(1);
    doc["canvas"]["fileNames"] = json!(["card.png", "card.dpx"]);
    let dir = tempfile::tempdir().unwrap();

    let report = engine(doc).run(dir.path()).unwrap();
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.frames[0].files.len(), 1);
    assert!(report.frames[0].save_errors[0].contains("not a valid file type"));
    assert!(dir.path().join("card.png").is_file());
}

#[test]
fn failing_widgets_do_not_stop_the_run() {
    let mut doc = two_frames();
    doc["widgets"]
        .as_array_mut()
        .unwrap()
        .push(json!({"name": "boom", "type": "test.panic", "grid": {"x": 2, "y": 2}}));
    let mut engine = engine(doc);
    engine.register_func("test.panic", |_resp: &mut dyn Response, _req: &Request| {
        panic!("kaboom");
    });

    let dir = tempfile::tempdir().unwrap();
    let report = engine.run(dir.path()).unwrap();
    assert_eq!(report.error_count(), 2);
    let failed: Vec<_> = report.frames[0].outcome.errors().collect();
    assert_eq!(failed[0].full_name, "boom");
    assert_eq!(failed[0].status, INTERNAL);
}

#[test]
#[should_panic(expected = "already registered")]
fn duplicate_registration_panics() {
    let mut engine = engine(two_frames());
    engine.register_func(FILL_TYPE, |_resp: &mut dyn Response, _req: &Request| {});
}

#[test]
fn save_canvas_rejects_unknown_extensions() {
    let engine = engine(two_frames());
    let (canvas, _) = engine.render_frame(FrameIndex(0)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    engine.save_canvas(&dir.path().join("x.png"), &canvas).unwrap();
    assert!(engine.save_canvas(&dir.path().join("x.bmp"), &canvas).is_err());
}
