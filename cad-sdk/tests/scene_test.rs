use cad_sdk::{
    scene::{
        bounds, parse, raw_preview, render, DisplayList, DrawOp, Entity, EntityKind, Point,
        RasterSurface, Rgb, Surface, TextAlign, Viewport,
    },
    Bounds,
};

/// Wrap group code pairs into a minimal document with an ENTITIES section.
fn document(entities: &str) -> String {
    format!(
        "0\nSECTION\n2\nHEADER\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n{entities}0\nENDSEC\n0\nEOF\n"
    )
}

fn circle(x: f64, y: f64, radius: f64) -> String {
    format!("0\nCIRCLE\n8\nOUTLINE\n10\n{x}\n20\n{y}\n30\n0\n40\n{radius}\n")
}

const SAMPLE_ENTITIES: &str = "0\nLINE\n8\nOUTLINE\n62\n1\n10\n0\n20\n0\n30\n0\n11\n100\n21\n50\n31\n0\n\
0\nLWPOLYLINE\n8\nBORDER\n90\n4\n70\n1\n10\n0\n20\n0\n10\n100\n20\n0\n10\n100\n20\n50\n10\n0\n20\n50\n\
0\nTEXT\n8\nTEXT\n10\n50\n20\n25\n40\n5\n1\nBRACKET\n72\n1\n";

#[test]
fn parse_reads_all_supported_records() {
    let text = document(&format!("{SAMPLE_ENTITIES}{}", circle(50.0, 25.0, 10.0)));

    assert_eq!(
        parse(&text),
        vec![
            Entity::new(EntityKind::Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(100.0, 50.0),
            })
            .with_layer("OUTLINE")
            .with_color_index(1),
            Entity::new(EntityKind::Polyline {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 50.0),
                    Point::new(0.0, 50.0),
                ],
                closed: true,
            })
            .with_layer("BORDER"),
            Entity::new(EntityKind::Text {
                position: Point::new(50.0, 25.0),
                text: "BRACKET".to_string(),
                height: Some(5.0),
                centered: true,
            })
            .with_layer("TEXT"),
            Entity::new(EntityKind::Circle {
                center: Point::new(50.0, 25.0),
                radius: 10.0,
            })
            .with_layer("OUTLINE"),
        ]
    );
}

#[test]
fn parse_returns_empty_without_recognized_entities() {
    let text = document("0\nPOINT\n10\n1\n20\n2\n0\nARC\n10\n0\n20\n0\n40\n3\n");
    assert_eq!(parse(&text), Vec::new());
    assert_eq!(parse(""), Vec::new());
    assert_eq!(parse("garbage\nSECTION"), Vec::new());
}

#[test]
fn parse_skips_records_missing_mandatory_fields() {
    let text = document(
        "0\nLINE\n10\n1\n20\n1\n\
         0\nCIRCLE\n10\n1\n20\n1\n40\n0\n\
         0\nCIRCLE\n10\n1\n20\n1\n40\n-2\n\
         0\nLWPOLYLINE\n70\n0\n\
         0\nTEXT\n10\n1\n20\n1\n1\n\n",
    );
    assert_eq!(parse(&text), Vec::new());
}

#[test]
fn parse_leaves_unparsable_values_unset() {
    let text = document("0\nLINE\n62\nred\n10\nabc\n20\n1\n11\n2\n21\n2\n0\nCIRCLE\n10\n3\n20\nx\n40\n1\n");
    assert_eq!(
        parse(&text),
        vec![Entity::new(EntityKind::Circle {
            center: Point::new(3.0, 0.0),
            radius: 1.0,
        })]
    );
}

#[test]
fn parse_stops_at_end_of_entities_section() {
    let text = format!(
        "{}0\nSECTION\n2\nENTITIES\n{}0\nENDSEC\n",
        document(&circle(0.0, 0.0, 1.0)),
        circle(9.0, 9.0, 1.0)
    );
    assert_eq!(parse(&text).len(), 1);
}

#[test]
fn parse_never_yields_more_entities_than_keywords() {
    let inputs = [
        document("0\nLINE\n0\nLINE\n10\n"),
        document("0\nLWPOLYLINE\n10\n"),
        document("0\nTEXT\n1"),
        "0\nSECTION\n2\nENTITIES\n0\nCIRCLE\n10\n1\n20".to_string(),
        "SECTION\n\nENTITIES\nLINE\n10\n1\n11\n2".to_string(),
    ];
    for input in inputs {
        let keywords = input
            .lines()
            .filter(|line| matches!(line.trim(), "LINE" | "CIRCLE" | "LWPOLYLINE" | "TEXT"))
            .count();
        assert!(parse(&input).len() <= keywords, "input: {input:?}");
    }
}

#[test]
fn bounds_of_single_circle() {
    let entities = parse(&document(&circle(0.0, 0.0, 5.0)));
    assert_eq!(
        bounds(&entities),
        Some(Bounds {
            min_x: -5.0,
            min_y: -5.0,
            max_x: 5.0,
            max_y: 5.0,
        })
    );
    assert_eq!(bounds(&[]), None);
}

#[test]
fn viewport_flips_y_and_fits_padding() {
    let extent = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 100.0,
        max_y: 50.0,
    };
    let viewport = Viewport::fit(&extent, 1200.0, 600.0, 40.0);

    // min((1200 - 80) / 100, (600 - 80) / 50) = 10.4
    assert!((viewport.scale() - 10.4).abs() < 1e-9);
    assert_eq!(viewport.transform(Point::new(0.0, 0.0)), Point::new(40.0, 560.0));
    assert_eq!(viewport.transform(Point::new(0.0, 50.0)), Point::new(40.0, 40.0));
}

#[test]
fn viewport_substitutes_unit_range_for_degenerate_axes() {
    let extent = Bounds {
        min_x: 3.0,
        min_y: 3.0,
        max_x: 3.0,
        max_y: 3.0,
    };
    let viewport = Viewport::fit(&extent, 200.0, 100.0, 40.0);
    assert!((viewport.scale() - 20.0).abs() < 1e-9);
    assert_eq!(viewport.transform(Point::new(3.0, 3.0)), Point::new(40.0, 60.0));
}

#[test]
fn render_draws_placeholder_when_empty() {
    let mut surface = DisplayList::new(1200.0, 600.0);
    render("0\nEOF\n", &mut surface);

    assert_eq!(
        surface.ops(),
        &[
            DrawOp::Clear {
                color: Rgb::BACKGROUND,
            },
            DrawOp::Text {
                text: "No entities found in DXF".to_string(),
                position: Point::new(600.0, 300.0),
                size: 14.0,
                align: TextAlign::Center,
                color: Rgb::PLACEHOLDER,
            },
        ]
    );
}

#[test]
fn render_maps_entities_through_viewport() {
    let text = document(
        "0\nLINE\n62\n3\n10\n0\n20\n0\n11\n10\n21\n10\n\
         0\nCIRCLE\n62\n42\n10\n5\n20\n5\n40\n1\n\
         0\nTEXT\n10\n0\n20\n10\n1\nA\n",
    );
    let mut surface = DisplayList::new(200.0, 100.0);
    render(&text, &mut surface);

    // Range 10 on both axes: scale = min(120 / 10, 20 / 10) = 2.
    assert_eq!(
        surface.ops(),
        &[
            DrawOp::Clear {
                color: Rgb::BACKGROUND,
            },
            DrawOp::Polyline {
                points: vec![Point::new(40.0, 60.0), Point::new(60.0, 40.0)],
                closed: false,
                color: Rgb::new(0x00, 0xff, 0x00),
                width: 1.5,
            },
            DrawOp::Circle {
                center: Point::new(50.0, 50.0),
                radius: 2.0,
                color: Rgb::WHITE,
                width: 1.5,
            },
            DrawOp::Text {
                text: "A".to_string(),
                position: Point::new(40.0, 40.0),
                size: 10.0,
                align: TextAlign::Left,
                color: Rgb::WHITE,
            },
        ]
    );
}

#[test]
fn palette_maps_basic_indices_and_defaults_to_white() {
    assert_eq!(Rgb::from_color_index(1), Rgb::new(0xff, 0, 0));
    assert_eq!(Rgb::from_color_index(5), Rgb::new(0, 0, 0xff));
    assert_eq!(Rgb::from_color_index(8), Rgb::new(0x80, 0x80, 0x80));
    assert_eq!(Rgb::from_color_index(0), Rgb::WHITE);
    assert_eq!(Rgb::from_color_index(256), Rgb::WHITE);
}

#[test]
fn raster_rendering_is_deterministic() {
    let text = document(&format!("{SAMPLE_ENTITIES}{}", circle(50.0, 25.0, 10.0)));

    let mut first = RasterSurface::new(320, 160).expect("surface");
    let mut second = RasterSurface::new(320, 160).expect("surface");
    render(&text, &mut first);
    render(&text, &mut second);

    assert_eq!(first.pixels(), second.pixels());
    assert_eq!(first.width(), 320.0);

    let png = first.encode_png().expect("png");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn raster_background_fills_every_pixel() {
    let mut surface = RasterSurface::new(4, 2).expect("surface");
    render("", &mut surface);
    for pixel in surface.pixels().chunks(4) {
        assert_eq!(pixel, &[0x0a, 0x0a, 0x0a, 0xff]);
    }
}

#[test]
fn raw_preview_truncates_long_documents() {
    assert_eq!(raw_preview("0\nEOF"), "0\nEOF");

    let long = "x".repeat(3001);
    let preview = raw_preview(&long);
    assert_eq!(
        preview,
        format!("{}\n...\n(content truncated)", "x".repeat(3000))
    );
}
