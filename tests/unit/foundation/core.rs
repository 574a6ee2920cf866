use super::*;

#[test]
fn frame_label_is_zero_padded() {
    assert_eq!(FrameIndex(7).label(), "0007");
    assert_eq!(FrameIndex(12345).label(), "12345");
}

#[test]
fn hex_colours_parse_in_all_forms() {
    assert_eq!(
        parse_hex_colour("#ff0000").unwrap(),
        image::Rgba([0xffff, 0, 0, 0xffff])
    );
    assert_eq!(
        parse_hex_colour("#0f08").unwrap(),
        parse_hex_colour("#00ff0088").unwrap()
    );
    assert_eq!(
        parse_hex_colour("00ff0080").unwrap(),
        image::Rgba([0, 0xffff, 0, 0x8080])
    );
    assert_eq!(
        parse_hex_colour("#abc").unwrap(),
        image::Rgba([0xaaaa, 0xbbbb, 0xcccc, 0xffff])
    );
}

#[test]
fn hex_colours_reject_garbage() {
    assert!(parse_hex_colour("#12").is_err());
    assert!(parse_hex_colour("#zzzzzz").is_err());
}

#[test]
fn rect_intersection_handles_negative_origins() {
    let a = PixelRect::new(-10, -10, 20, 20);
    let b = PixelRect::new(0, 0, 100, 100);
    assert_eq!(a.intersect(b), Some(PixelRect::new(0, 0, 10, 10)));
    assert_eq!(a.intersect(PixelRect::new(50, 50, 5, 5)), None);
}
