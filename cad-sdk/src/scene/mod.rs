//! Interpreter for the drawing-interchange (DXF) text produced by the
//! execution service: parses the `ENTITIES` section into typed entities and
//! draws them onto a [`Surface`].

mod bounds;
mod parser;
mod raster;
mod render;
mod viewport;

pub use bounds::bounds;
pub use parser::{parse, Entity, EntityKind, Point, DEFAULT_COLOR_INDEX};
pub use raster::{RasterError, RasterSurface};
pub use render::{
    render, render_entities, DisplayList, DrawOp, Rgb, Surface, TextAlign, DEFAULT_TEXT_HEIGHT,
    LINE_WIDTH, MIN_FONT_SIZE, PADDING, PLACEHOLDER_FONT_SIZE, PLACEHOLDER_TEXT,
};
pub use viewport::Viewport;

/// Characters of raw drawing text shown by [`raw_preview`].
pub const RAW_PREVIEW_LIMIT: usize = 3000;

/// The leading part of a drawing document for display, with a truncation
/// marker when the document is longer than [`RAW_PREVIEW_LIMIT`] characters.
#[must_use]
pub fn raw_preview(text: &str) -> String {
    match text.char_indices().nth(RAW_PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}\n...\n(content truncated)", &text[..cut]),
        None => text.to_string(),
    }
}
