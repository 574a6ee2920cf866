use super::*;

fn is_clear(mask: &Mask, x: i64, y: i64) -> bool {
    mask.get_pixel(x as u32, y as u32).0[0] == 0
}

#[test]
fn corner_offsets_outside_radius_are_transparent() {
    let (w, h) = (120u32, 80u32);
    for r in [5i64, 17, 40] {
        let mask = rounded_mask(w, h, r);
        let anchors = [
            ((r, r), (-1, -1)),
            ((r, i64::from(h) - r), (-1, 1)),
            ((i64::from(w) - r, r), (1, -1)),
            ((i64::from(w) - r, i64::from(h) - r), (1, 1)),
        ];
        for ((ax, ay), (sx, sy)) in anchors {
            for dx in 0..=r {
                for dy in 0..=r {
                    let (px, py) = (ax + sx * dx, ay + sy * dy);
                    if px < 0 || py < 0 || px >= i64::from(w) || py >= i64::from(h) {
                        continue;
                    }
                    let outside = dx * dx + dy * dy > r * r;
                    if outside {
                        assert!(is_clear(&mask, px, py), "r={r} ({px},{py}) should be clear");
                    }
                }
            }
        }
        // Centre and edge midpoints are untouched.
        assert!(!is_clear(&mask, i64::from(w) / 2, i64::from(h) / 2));
        assert!(!is_clear(&mask, i64::from(w) / 2, 0));
        assert!(!is_clear(&mask, 0, i64::from(h) / 2));
        // The extreme corner is always cut.
        assert!(is_clear(&mask, 0, 0));
    }
}

#[test]
fn offsets_inside_radius_keep_base_opacity() {
    let r = 20i64;
    let mask = rounded_mask(100, 100, r);
    // Top-left quadrant, offsets within the circle.
    for dx in 0..=r {
        for dy in 0..=r {
            if dx * dx + dy * dy <= r * r {
                assert!(!is_clear(&mask, r - dx, r - dy), "({dx},{dy})");
            }
        }
    }
}

#[test]
fn zero_radius_is_fully_opaque() {
    let mask = rounded_mask(10, 10, 0);
    assert!(mask.pixels().all(|p| p.0[0] == OPAQUE));
    let mask = rounded_mask(10, 10, -4);
    assert!(mask.pixels().all(|p| p.0[0] == OPAQUE));
}

#[test]
fn tile_window_reads_at_anchor_offset() {
    let tile = Mask::from_fn(10, 10, |x, _| {
        if x < 5 {
            image::Luma([OPAQUE])
        } else {
            image::Luma([0])
        }
    });

    let window = clip_tile_mask(&tile, PixelPoint::new(3, 0), 4, 2);
    let row: Vec<u16> = (0..4).map(|x| window.get_pixel(x, 0).0[0]).collect();
    assert_eq!(row, vec![OPAQUE, OPAQUE, 0, 0]);

    // Window hanging off the top-left of the tile reads transparent there.
    let window = clip_tile_mask(&tile, PixelPoint::new(-2, -1), 4, 2);
    assert_eq!(window.get_pixel(0, 1).0[0], 0);
    assert_eq!(window.get_pixel(2, 0).0[0], 0);
    assert_eq!(window.get_pixel(2, 1).0[0], OPAQUE);
}

#[test]
fn intersection_never_reopens_masked_pixels() {
    let mut base = Mask::from_fn(4, 1, |x, _| image::Luma([if x < 2 { OPAQUE } else { 0 }]));
    let rounded = Mask::from_fn(4, 1, |x, _| image::Luma([if x % 2 == 0 { OPAQUE } else { 0 }]));
    intersect_masks(&mut base, &rounded);
    let got: Vec<u16> = base.pixels().map(|p| p.0[0]).collect();
    assert_eq!(got, vec![OPAQUE, 0, 0, 0]);
}

#[test]
fn partial_coverage_multiplies() {
    assert_eq!(mul_div_max(OPAQUE, OPAQUE), OPAQUE);
    assert_eq!(mul_div_max(OPAQUE, 0), 0);
    assert_eq!(mul_div_max(OPAQUE / 2 + 1, OPAQUE), OPAQUE / 2 + 1);
}

#[test]
fn oversized_radius_clears_small_masks_without_overflow() {
    for r in [3_000i64, 4_000_000_000, i64::MAX] {
        let mask = rounded_mask(4, 4, r);
        assert!(mask.pixels().all(|p| p.0[0] == 0), "r={r}");
    }
}

#[test]
fn clamped_radius_matches_the_unclamped_cut() {
    // Just above the clamp, results must not change as the radius keeps growing.
    let reference = rounded_mask(6, 3, 24);
    assert_eq!(rounded_mask(6, 3, 25), reference);
    assert_eq!(rounded_mask(6, 3, 1_000_000), reference);
}
