//! Raster backend for the overlay surface.
//!
//! Backed by the `image` crate with `imageproc` + `ab_glyph` for text. The
//! DejaVu fonts are bundled so measurement is identical on every platform.

use ab_glyph::{FontRef, PxScale};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::GenerationError;

use super::{Surface, TextStyle};

static FONT_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static FONT_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

const CAPTION_SCALE: f32 = 20.0;
const BODY_SCALE: f32 = 16.0;

/// Pixel surface sized to the source image, with the image drawn at (0,0).
pub struct RasterSurface {
    canvas: RgbaImage,
    regular: FontRef<'static>,
    bold: FontRef<'static>,
}

impl RasterSurface {
    /// Decode an image payload into a surface of its natural size.
    pub fn from_bytes(data: &[u8]) -> Result<Self, GenerationError> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| GenerationError::ImageLoadError(e.to_string()))?;

        let regular = FontRef::try_from_slice(FONT_REGULAR)
            .map_err(|e| GenerationError::Unknown(format!("bundled font failed to parse: {}", e)))?;
        let bold = FontRef::try_from_slice(FONT_BOLD)
            .map_err(|e| GenerationError::Unknown(format!("bundled font failed to parse: {}", e)))?;

        Ok(Self {
            canvas: decoded.to_rgba8(),
            regular,
            bold,
        })
    }

    fn font_and_scale(&self, style: TextStyle) -> (&FontRef<'static>, PxScale) {
        match style {
            TextStyle::CaptionBold => (&self.bold, PxScale::from(CAPTION_SCALE)),
            TextStyle::Body => (&self.regular, PxScale::from(BODY_SCALE)),
        }
    }

    /// Encode the composited surface as PNG.
    pub fn into_png(self) -> Result<Vec<u8>, GenerationError> {
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(self.canvas)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| GenerationError::Unknown(format!("PNG encoding failed: {}", e)))?;
        Ok(buf)
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: u32, h: u32, color: [u8; 4]) {
        let x0 = x.clamp(0, self.canvas.width() as i64) as u32;
        let y0 = y.clamp(0, self.canvas.height() as i64) as u32;
        let x1 = (x + w as i64).clamp(0, self.canvas.width() as i64) as u32;
        let y1 = (y + h as i64).clamp(0, self.canvas.height() as i64) as u32;

        let overlay = Rgba(color);
        for yy in y0..y1 {
            for xx in x0..x1 {
                self.canvas.get_pixel_mut(xx, yy).blend(&overlay);
            }
        }
    }

    fn measure_text(&self, text: &str, style: TextStyle) -> f32 {
        let (font, scale) = self.font_and_scale(style);
        text_size(scale, font, text).0 as f32
    }

    fn draw_text(&mut self, text: &str, x: i64, y: i64, style: TextStyle, color: [u8; 4]) {
        // imageproc clips glyphs that fall outside the canvas
        let (font, scale) = self.font_and_scale(style);
        let font = font.clone();
        draw_text_mut(
            &mut self.canvas,
            Rgba(color),
            x as i32,
            y as i32,
            scale,
            &font,
            text,
        );
    }
}
