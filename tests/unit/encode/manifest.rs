use super::*;

#[test]
fn digests_are_stable_hex() {
    let a = file_digest(b"testcard");
    assert_eq!(a.len(), 32);
    assert_eq!(a, file_digest(b"testcard"));
    assert_ne!(a, file_digest(b"testcard!"));
}

#[test]
fn pixel_digest_tracks_pixels_not_encoding() {
    let mut canvas = Canvas::new(64, 64);
    let before = pixel_digest(&canvas);
    assert_eq!(before, pixel_digest(&canvas.clone()));
    canvas.put_pixel(63, 63, image::Rgba([1, 0, 0, 0]));
    assert_ne!(before, pixel_digest(&canvas));
}

#[test]
fn manifest_is_written_under_the_run_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut manifest = Manifest::new("run-1");
    manifest.record("a.png", FrameIndex(0), b"abc", "00");
    let path = manifest.write_to(dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "run-1.manifest.json");

    let back: Manifest = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(back.files[0].bytes, 3);
    assert_eq!(back.files[0].file_hash, file_digest(b"abc"));
}
