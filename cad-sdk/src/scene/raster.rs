use super::{
    parser::Point,
    render::{Rgb, Surface, TextAlign},
};
use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use thiserror::Error;
use tiny_skia::{Color, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Invalid surface size: {0}x{1}")]
    InvalidSize(u32, u32),
    #[error("Invalid font: {0}")]
    InvalidFont(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Anti-aliased RGBA surface backed by a `tiny_skia::Pixmap`.
///
/// Text is only drawn when a font was supplied with [`RasterSurface::with_font`].
pub struct RasterSurface {
    pixmap: Pixmap,
    font: Option<FontArc>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RasterError> {
        let pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize(width, height))?;
        Ok(Self { pixmap, font: None })
    }

    #[must_use]
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Load a TrueType/OpenType font from raw bytes.
    pub fn load_font(data: Vec<u8>) -> Result<FontArc, RasterError> {
        FontArc::try_from_vec(data).map_err(|error| RasterError::InvalidFont(error.to_string()))
    }

    /// Premultiplied RGBA8 pixel data, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|error| RasterError::Encode(error.to_string()))
    }

    fn stroke(&mut self, path: Option<tiny_skia::Path>, color: Rgb, width: f64) {
        let Some(path) = path else {
            return;
        };
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 0xff);
    paint.anti_alias = true;
    paint
}

impl Surface for RasterSurface {
    fn width(&self) -> f64 {
        f64::from(self.pixmap.width())
    }

    fn height(&self) -> f64 {
        f64::from(self.pixmap.height())
    }

    fn clear(&mut self, color: Rgb) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, 0xff));
    }

    fn stroke_polyline(&mut self, points: &[Point], closed: bool, color: Rgb, width: f64) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut builder = PathBuilder::new();
        builder.move_to(first.x as f32, first.y as f32);
        for p in rest {
            builder.line_to(p.x as f32, p.y as f32);
        }
        if closed {
            builder.close();
        }
        self.stroke(builder.finish(), color, width);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgb, width: f64) {
        let path = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32);
        self.stroke(path, color, width);
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, align: TextAlign, color: Rgb) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };

        let scale = PxScale::from(size as f32);
        let scaled = font.as_scaled(scale);
        let glyph_ids: Vec<_> = text.chars().map(|c| scaled.glyph_id(c)).collect();

        let mut advance = 0.0f32;
        let mut offsets = Vec::with_capacity(glyph_ids.len());
        for (index, id) in glyph_ids.iter().enumerate() {
            if index > 0 {
                advance += scaled.kern(glyph_ids[index - 1], *id);
            }
            offsets.push(advance);
            advance += scaled.h_advance(*id);
        }

        let origin_x = match align {
            TextAlign::Left => position.x as f32,
            TextAlign::Center => position.x as f32 - advance / 2.0,
        };
        let baseline = position.y as f32;

        let mask_width = mask.width();
        let mask_height = mask.height();
        let coverage = mask.data_mut();
        for (id, offset) in glyph_ids.into_iter().zip(offsets) {
            let glyph = id.with_scale_and_position(scale, point(origin_x + offset, baseline));
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if x < 0 || y < 0 || x >= i64::from(mask_width) || y >= i64::from(mask_height) {
                    return;
                }
                let index = (y as usize) * (mask_width as usize) + x as usize;
                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                coverage[index] = coverage[index].max(value);
            });
        }

        if let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32) {
            self.pixmap
                .fill_rect(rect, &paint(color), Transform::identity(), Some(&mask));
        }
    }
}
