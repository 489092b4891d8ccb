use card_impose::*;

#[test]
fn test_paper_size_dimensions() {
    assert_eq!(PaperSize::A4.dimensions_mm(), (210.0, 297.0));
    assert_eq!(PaperSize::A3.dimensions_mm(), (297.0, 420.0));
    assert_eq!(PaperSize::Letter.dimensions_mm(), (215.9, 279.4));

    let custom = PaperSize::Custom {
        width_mm: 100.0,
        height_mm: 200.0,
    };
    assert_eq!(custom.dimensions_mm(), (100.0, 200.0));
}

#[test]
fn test_a4_pixels_at_300_dpi() {
    assert_eq!(
        PaperSize::A4.pixels(Orientation::Portrait, 300.0),
        PixelSize::new(2480, 3508)
    );
    assert_eq!(
        PaperSize::A4.pixels(Orientation::Landscape, 300.0),
        PixelSize::new(3508, 2480)
    );
}

#[test]
fn test_layout_overflow_message() {
    let err = ImposeError::LayoutOverflow {
        axis: Axis::Vertical,
        required: 3600,
        available: 3508,
    };
    assert_eq!(
        err.to_string(),
        "Layout overflow: height needs 3600px but the page has 3508px"
    );
}

#[test]
fn test_side_names() {
    assert_eq!(Side::Recto.name(), "recto");
    assert_eq!(Side::Verso.name(), "verso");
}
