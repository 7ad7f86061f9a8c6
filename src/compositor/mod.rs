//! Text-overlay compositor.
//!
//! When the generation service returns a textual description instead of
//! pixels, the description is drawn over the original character image as
//! wrapped text on a semi-transparent band at the bottom. The layout
//! constants below are part of the contract; tests assert against the exact
//! numbers.
//!
//! Drawing goes through the `Surface` trait so the wrap and layout logic can
//! be tested with a deterministic fake; `RasterSurface` is the production
//! backend.

mod raster;

pub use raster::RasterSurface;

use tracing::debug;

use crate::character::CharacterImage;
use crate::error::GenerationError;

/// Height of the bottom band
pub const BAND_HEIGHT: i64 = 150;
/// Vertical advance per wrapped line
pub const LINE_HEIGHT: i64 = 25;
/// Horizontal space reserved around the text (line limit = width - 40)
pub const WRAP_MARGIN: i64 = 40;
/// No new line starts once the cursor passes height - 20
pub const BOTTOM_MARGIN: i64 = 20;
/// Left edge of the caption and the wrapped lines
pub const TEXT_X: i64 = 20;
/// Caption offset from the top of the band
pub const CAPTION_OFFSET: i64 = 25;
/// First wrapped line's offset from the top of the band
pub const TEXT_START_OFFSET: i64 = 55;

/// Semi-transparent dark band (70% alpha)
pub const BAND_COLOR: [u8; 4] = [0, 0, 0, 178];
/// Highlighted caption color
pub const CAPTION_COLOR: [u8; 4] = [255, 215, 0, 255];
/// Wrapped description color
pub const TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Fixed caption drawn near the top of the band
pub const CAPTION_TEXT: &str = "Scene description";

/// Font role for measurement and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Bold caption
    CaptionBold,
    /// Regular body text
    Body,
}

/// Minimal 2D rendering surface. Any backend with these primitives works.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Alpha-blend a filled rectangle over the surface, clipped to bounds.
    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: [u8; 4]);
    /// Rendered width of `text` in the given style, in surface units.
    fn measure_text(&self, text: &str, style: TextStyle) -> f32;
    /// Draw `text` with its top-left corner at (x, y), clipped to bounds.
    fn draw_text(&mut self, text: &str, x: i64, y: i64, style: TextStyle, color: [u8; 4]);
}

/// Greedy-fill word wrap with the band's vertical clipping rule.
///
/// Tokens are accumulated onto the current line; when the next token would
/// push the line past `width - 40` the line is committed at the current
/// cursor and the cursor advances by 25. Once the cursor passes
/// `height - 20` no further lines are started and remaining tokens are
/// dropped. The final partial line is flushed regardless of the bound.
/// Returns (line, y) pairs.
pub fn wrap_description(
    description: &str,
    surface_width: u32,
    surface_height: u32,
    measure: impl Fn(&str) -> f32,
) -> Vec<(String, i64)> {
    let max_width = (surface_width as i64 - WRAP_MARGIN) as f32;
    let bound = surface_height as i64 - BOTTOM_MARGIN;
    let mut y = surface_height as i64 - BAND_HEIGHT + TEXT_START_OFFSET;

    let mut lines = Vec::new();
    let mut line = String::new();

    for token in description.split_whitespace() {
        let candidate = if line.is_empty() {
            token.to_string()
        } else {
            format!("{} {}", line, token)
        };

        if measure(&candidate) > max_width && !line.is_empty() {
            lines.push((std::mem::take(&mut line), y));
            y += LINE_HEIGHT;
            line = token.to_string();
            if y > bound {
                break;
            }
        } else {
            line = candidate;
        }
    }

    if !line.is_empty() {
        lines.push((line, y));
    }

    lines
}

/// Draw the band, caption, and wrapped description onto the surface.
pub fn render_overlay<S: Surface>(surface: &mut S, description: &str) {
    let width = surface.width();
    let height = surface.height();
    let band_top = height as i64 - BAND_HEIGHT;

    surface.fill_rect(0, band_top, width, BAND_HEIGHT as u32, BAND_COLOR);
    surface.draw_text(
        CAPTION_TEXT,
        TEXT_X,
        band_top + CAPTION_OFFSET,
        TextStyle::CaptionBold,
        CAPTION_COLOR,
    );

    let lines = wrap_description(description, width, height, |text| {
        surface.measure_text(text, TextStyle::Body)
    });

    debug!("Overlay layout: {} wrapped lines", lines.len());

    for (line, y) in &lines {
        surface.draw_text(line, TEXT_X, *y, TextStyle::Body, TEXT_COLOR);
    }
}

/// Composite a textual description over the original character image and
/// return the result as a PNG payload.
pub fn compose_description(
    original: &CharacterImage,
    description: &str,
) -> Result<CharacterImage, GenerationError> {
    let mut surface = RasterSurface::from_bytes(original.data())?;
    render_overlay(&mut surface, description);
    let png = surface.into_png()?;
    Ok(CharacterImage::new("image/png", png))
}
