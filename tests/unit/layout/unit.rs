use super::*;

#[test]
fn pixels_ignore_extent_and_grid() {
    for (extent, unit) in [(1000, 100.0), (7, 0.5), (4096, 213.3)] {
        assert_eq!(resolve_unit("27px", extent, unit).unwrap(), 27.0);
        assert_eq!(resolve_unit("-27px", extent, unit).unwrap(), -27.0);
        assert_eq!(resolve_unit("0px", extent, unit).unwrap(), 0.0);
    }
}

#[test]
fn percentages_scale_with_extent() {
    let cases = [
        ("50%", 1000, 500.0),
        ("100%", 1920, 1920.0),
        ("-100%", 1080, -1080.0),
        ("12.5%", 800, 100.0),
        (".5%", 1000, 5.0),
        ("-25%", 400, -100.0),
        ("0%", 400, 0.0),
    ];
    for (literal, extent, want) in cases {
        let got = resolve_unit(literal, extent, 100.0).unwrap();
        assert!((got - want).abs() < 1e-9, "{literal}: got {got}, want {want}");
    }
}

#[test]
fn bare_integers_are_grid_cells() {
    assert_eq!(resolve_unit("3", 1000, 100.0).unwrap(), 300.0);
    assert_eq!(resolve_unit("0", 1000, 100.0).unwrap(), 0.0);
    assert_eq!(resolve_unit("2", 1080, 120.0).unwrap(), 240.0);
}

#[test]
fn unknown_literals_are_rejected_by_name() {
    for bad in ["abc", "12pt", "101%", "1.5", "-3", "", "px", "R1C1", "12 px"] {
        let err = Dimension::parse(bad).unwrap_err();
        assert!(matches!(err, CardError::Layout(_)), "{bad}: {err}");
        if !bad.is_empty() {
            assert!(err.to_string().contains(bad), "{bad}: {err}");
        }
    }
}

#[test]
fn lone_percent_sign_fails_extraction() {
    assert!(Dimension::parse("%").is_err());
}

#[test]
fn deserializes_numbers_and_strings() {
    let dims: Vec<Dimension> = serde_json::from_str(r#"[2, "2", 3.0, "15px", "-5%"]"#).unwrap();
    assert_eq!(
        dims,
        vec![
            Dimension::Grid(2.0),
            Dimension::Grid(2.0),
            Dimension::Grid(3.0),
            Dimension::Pixels(15.0),
            Dimension::Percent(-5.0),
        ]
    );
}

#[test]
fn deserialize_rejects_negative_and_fractional_grid_counts() {
    assert!(serde_json::from_str::<Dimension>("-1").is_err());
    assert!(serde_json::from_str::<Dimension>("1.5").is_err());
    assert!(serde_json::from_str::<Dimension>("\"nope\"").is_err());
}

#[test]
fn serializes_back_to_literal_form() {
    let v = serde_json::to_value([
        Dimension::Grid(4.0),
        Dimension::Pixels(-27.0),
        Dimension::Percent(12.5),
    ])
    .unwrap();
    assert_eq!(v, serde_json::json!([4, "-27px", "12.5%"]));
}
