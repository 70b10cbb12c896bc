use super::{
    bounds::bounds,
    parser::{parse, Entity, EntityKind, Point},
    viewport::Viewport,
};

pub const PADDING: f64 = 40.0;
pub const LINE_WIDTH: f64 = 1.5;
pub const MIN_FONT_SIZE: f64 = 10.0;
pub const DEFAULT_TEXT_HEIGHT: f64 = 2.0;
pub const PLACEHOLDER_TEXT: &str = "No entities found in DXF";
pub const PLACEHOLDER_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BACKGROUND: Self = Self::new(0x0a, 0x0a, 0x0a);
    pub const PLACEHOLDER: Self = Self::new(0x66, 0x66, 0x66);
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color of an ACI color index. Indices outside the basic eight draw
    /// white.
    #[must_use]
    pub const fn from_color_index(index: i32) -> Self {
        match index {
            1 => Self::new(0xff, 0x00, 0x00),
            2 => Self::new(0xff, 0xff, 0x00),
            3 => Self::new(0x00, 0xff, 0x00),
            4 => Self::new(0x00, 0xff, 0xff),
            5 => Self::new(0x00, 0x00, 0xff),
            6 => Self::new(0xff, 0x00, 0xff),
            8 => Self::new(0x80, 0x80, 0x80),
            _ => Self::WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A 2D target the scene can be drawn onto. Coordinates are in pixels with
/// the origin at the top-left corner; text is positioned by its baseline.
pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self, color: Rgb);
    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgb, width: f64);
    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgb, width: f64);
    fn fill_text(&mut self, text: &str, position: Point, size: f64, align: TextAlign, color: Rgb);
}

/// A recorded drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        color: Rgb,
    },
    Polyline {
        points: Vec<Point>,
        closed: bool,
        color: Rgb,
        width: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgb,
        width: f64,
    },
    Text {
        text: String,
        position: Point,
        size: f64,
        align: TextAlign,
        color: Rgb,
    },
}

/// A surface that records draw commands instead of producing pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }
}

impl Surface for DisplayList {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear { color });
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgb, width: f64) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            closed,
            color,
            width,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgb, width: f64) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, align: TextAlign, color: Rgb) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            position,
            size,
            align,
            color,
        });
    }
}

/// Parse `text` and draw it onto `surface`, fitted to the surface size.
pub fn render<S: Surface + ?Sized>(text: &str, surface: &mut S) {
    render_entities(&parse(text), surface);
}

pub fn render_entities<S: Surface + ?Sized>(entities: &[Entity], surface: &mut S) {
    surface.clear(Rgb::BACKGROUND);

    let Some(extent) = bounds(entities) else {
        let center = Point::new(surface.width() / 2.0, surface.height() / 2.0);
        surface.fill_text(
            PLACEHOLDER_TEXT,
            center,
            PLACEHOLDER_FONT_SIZE,
            TextAlign::Center,
            Rgb::PLACEHOLDER,
        );
        return;
    };

    let viewport = Viewport::fit(&extent, surface.width(), surface.height(), PADDING);
    for entity in entities {
        draw_entity(entity, &viewport, surface);
    }
}

fn draw_entity<S: Surface + ?Sized>(entity: &Entity, viewport: &Viewport, surface: &mut S) {
    let color = Rgb::from_color_index(entity.color_index);

    match &entity.kind {
        EntityKind::Line { start, end } => {
            let points = [viewport.transform(*start), viewport.transform(*end)];
            surface.stroke_polyline(&points, false, color, LINE_WIDTH);
        }
        EntityKind::Circle { center, radius } => {
            surface.stroke_circle(
                viewport.transform(*center),
                radius * viewport.scale(),
                color,
                LINE_WIDTH,
            );
        }
        EntityKind::Polyline { points, closed } => {
            let points: Vec<Point> = points.iter().map(|p| viewport.transform(*p)).collect();
            surface.stroke_polyline(&points, *closed, color, LINE_WIDTH);
        }
        EntityKind::Text {
            position,
            text,
            height,
            centered,
        } => {
            let height = height
                .filter(|h| *h != 0.0)
                .unwrap_or(DEFAULT_TEXT_HEIGHT);
            let size = (height * viewport.scale()).max(MIN_FONT_SIZE);
            let align = if *centered {
                TextAlign::Center
            } else {
                TextAlign::Left
            };
            surface.fill_text(text, viewport.transform(*position), size, align, color);
        }
    }
}
