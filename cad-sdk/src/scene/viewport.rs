use super::parser::Point;
use crate::Bounds;

/// Maps drawing coordinates (Y up) onto surface pixels (Y down), fitting the
/// drawing inside the surface with a uniform scale and fixed padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min_x: f64,
    min_y: f64,
    height: f64,
    padding: f64,
    scale: f64,
}

impl Viewport {
    #[must_use]
    pub fn fit(bounds: &Bounds, width: f64, height: f64, padding: f64) -> Self {
        let range_x = usable_range(bounds.width());
        let range_y = usable_range(bounds.height());
        let scale = ((width - 2.0 * padding) / range_x).min((height - 2.0 * padding) / range_y);

        Self {
            min_x: bounds.min_x,
            min_y: bounds.min_y,
            height,
            padding,
            scale,
        }
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn transform(&self, point: Point) -> Point {
        Point::new(
            self.padding + (point.x - self.min_x) * self.scale,
            self.height - (self.padding + (point.y - self.min_y) * self.scale),
        )
    }
}

// A degenerate axis still needs a non-zero divisor.
fn usable_range(range: f64) -> f64 {
    if range == 0.0 || !range.is_finite() {
        1.0
    } else {
        range
    }
}
