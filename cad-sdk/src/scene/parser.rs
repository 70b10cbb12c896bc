use serde::{Deserialize, Serialize};

/// Default color index (white) for entities without a parsable group 62.
pub const DEFAULT_COLOR_INDEX: i32 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A drawing primitive read from the `ENTITIES` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Entity {
    #[serde(flatten)]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    pub color_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityKind {
    Line {
        start: Point,
        end: Point,
    },
    Circle {
        center: Point,
        radius: f64,
    },
    Polyline {
        points: Vec<Point>,
        closed: bool,
    },
    Text {
        position: Point,
        text: String,
        /// Height in drawing units, when the record carries one.
        height: Option<f64>,
        centered: bool,
    },
}

impl Entity {
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            layer: None,
            color_index: DEFAULT_COLOR_INDEX,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    #[must_use]
    pub fn with_color_index(mut self, color_index: i32) -> Self {
        self.color_index = color_index;
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RecordKind {
    Line,
    Circle,
    Polyline,
    Text,
}

impl RecordKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "LINE" => Some(Self::Line),
            "CIRCLE" => Some(Self::Circle),
            "LWPOLYLINE" => Some(Self::Polyline),
            "TEXT" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Accumulates the group codes of one record until its terminating `0`.
struct RecordBuilder {
    kind: RecordKind,
    layer: Option<String>,
    color_index: Option<i32>,
    first: Option<Point>,
    second: Option<Point>,
    size: Option<f64>,
    points: Vec<Point>,
    closed: bool,
    text: Option<String>,
    centered: bool,
}

impl RecordBuilder {
    fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            layer: None,
            color_index: None,
            // Text placement starts at the origin; the other kinds need an
            // explicit X before their Y is accepted.
            first: (kind == RecordKind::Text).then(Point::default),
            second: None,
            size: None,
            points: Vec::new(),
            closed: false,
            text: None,
            centered: false,
        }
    }

    /// Apply one `(code, value)` pair. `lookahead` is the line three lines
    /// after the code line, which holds a polyline vertex's Y.
    fn apply(&mut self, code: &str, value: Option<&str>, lookahead: Option<&str>) {
        let Some(value) = value else {
            return;
        };

        match (self.kind, code) {
            (_, "8") => self.layer = Some(value.to_string()),
            (_, "62") => self.color_index = parse_int(value),
            (RecordKind::Polyline, "10") => {
                if let Some(x) = parse_number(value) {
                    let y = lookahead.and_then(parse_number).unwrap_or(0.0);
                    self.points.push(Point::new(x, y));
                }
            }
            (RecordKind::Polyline, "70") => {
                self.closed = parse_int(value).is_some_and(|flags| flags & 1 == 1);
            }
            (RecordKind::Line | RecordKind::Circle, "10") => {
                self.first = parse_number(value).map(|x| Point::new(x, 0.0));
            }
            (RecordKind::Text, "10") => {
                if let (Some(point), Some(x)) = (self.first.as_mut(), parse_number(value)) {
                    point.x = x;
                }
            }
            (RecordKind::Line | RecordKind::Circle | RecordKind::Text, "20") => {
                if let (Some(point), Some(y)) = (self.first.as_mut(), parse_number(value)) {
                    point.y = y;
                }
            }
            (RecordKind::Line, "11") => {
                self.second = parse_number(value).map(|x| Point::new(x, 0.0));
            }
            (RecordKind::Line, "21") => {
                if let (Some(point), Some(y)) = (self.second.as_mut(), parse_number(value)) {
                    point.y = y;
                }
            }
            (RecordKind::Circle | RecordKind::Text, "40") => self.size = parse_number(value),
            (RecordKind::Text, "1") => self.text = Some(value.to_string()),
            (RecordKind::Text, "72") => {
                self.centered = parse_int(value).is_some_and(|align| align != 0);
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<Entity> {
        let kind = match self.kind {
            RecordKind::Line => EntityKind::Line {
                start: self.first?,
                end: self.second?,
            },
            RecordKind::Circle => {
                let radius = self.size.filter(|radius| *radius > 0.0)?;
                EntityKind::Circle {
                    center: self.first?,
                    radius,
                }
            }
            RecordKind::Polyline => {
                if self.points.is_empty() {
                    return None;
                }
                EntityKind::Polyline {
                    points: self.points,
                    closed: self.closed,
                }
            }
            RecordKind::Text => {
                let text = self.text.filter(|text| !text.is_empty())?;
                EntityKind::Text {
                    position: self.first.unwrap_or_default(),
                    text,
                    height: self.size,
                    centered: self.centered,
                }
            }
        };

        Some(Entity {
            kind,
            layer: self.layer,
            color_index: self.color_index.unwrap_or(DEFAULT_COLOR_INDEX),
        })
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_int(value: &str) -> Option<i32> {
    value.parse::<i32>().ok()
}

/// Parse the `ENTITIES` section of a DXF document.
///
/// Never fails: unknown record types, records missing mandatory fields and
/// malformed values are skipped. Only `LINE`, `CIRCLE`, `LWPOLYLINE` and
/// `TEXT` records are recognized.
#[must_use]
pub fn parse(text: &str) -> Vec<Entity> {
    let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
    let mut entities = Vec::new();
    let mut inside = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line == "SECTION" && lines.get(i + 2).copied() == Some("ENTITIES") {
            inside = true;
            i += 3;
            continue;
        }

        if line == "ENDSEC" && inside {
            break;
        }

        if let Some(kind) = RecordKind::from_keyword(line).filter(|_| inside) {
            let mut record = RecordBuilder::new(kind);
            i += 1;
            while i < lines.len() {
                let code = lines[i];
                if code == "0" {
                    break;
                }
                record.apply(
                    code,
                    lines.get(i + 1).copied(),
                    lines.get(i + 3).copied(),
                );
                i += 2;
            }
            entities.extend(record.finish());
            continue;
        }

        i += 1;
    }

    entities
}
