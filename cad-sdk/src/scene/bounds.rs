use super::parser::{Entity, EntityKind, Point};
use crate::Bounds;

impl Bounds {
    fn from_point(point: Point) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
        }
    }

    fn include(&mut self, point: Point) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.1}, {:.1}] → [{:.1}, {:.1}]",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Points that delimit an entity's extent. Circles contribute the corners of
/// their bounding square.
fn extent_points(entity: &Entity) -> Vec<Point> {
    match &entity.kind {
        EntityKind::Line { start, end } => vec![*start, *end],
        EntityKind::Circle { center, radius } => vec![
            Point::new(center.x - radius, center.y - radius),
            Point::new(center.x + radius, center.y + radius),
        ],
        EntityKind::Polyline { points, .. } => points.clone(),
        EntityKind::Text { position, .. } => vec![*position],
    }
}

/// Extents over all entities, or `None` when there is nothing to measure.
#[must_use]
pub fn bounds(entities: &[Entity]) -> Option<Bounds> {
    let mut points = entities.iter().flat_map(extent_points);
    let mut bounds = Bounds::from_point(points.next()?);
    for point in points {
        bounds.include(point);
    }
    Some(bounds)
}
