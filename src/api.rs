//! Host-facing call boundary.
//!
//! Every entry point is synchronous and reports failures as one opaque [`CallError`] carrying the
//! underlying diagnostic text. Font handles, surfaces and the backend guard acquired during a
//! call are released before it returns, on success and on error alike.

use std::path::{Path, PathBuf};

use crate::compose::{CompositorOpts, TextCompositor};
use crate::font::FontHandle;
use crate::foundation::core::{PixelFormat, Rgb};
use crate::foundation::error::{RenderTextError, RenderTextResult};
use crate::raster::VelloRasterizer;
use crate::surface::Surface;

/// Opaque boundary error: only the message crosses the call boundary.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallError {
    message: String,
}

impl CallError {
    /// Diagnostic text of the underlying failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RenderTextError> for CallError {
    fn from(err: RenderTextError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Rendered text as handed to the host: `{w, h, data}` with RGBA8888 rows, top row first.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TextBitmap {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
    /// Pixel bytes; `data.len() == h * pitch()`.
    pub data: Vec<u8>,
}

impl std::fmt::Debug for TextBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBitmap")
            .field("w", &self.w)
            .field("h", &self.h)
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl TextBitmap {
    /// Convert a surface to RGBA8888 and take its bytes.
    pub fn from_surface(mut surface: Surface) -> RenderTextResult<Self> {
        surface.convert_format(PixelFormat::Rgba8888)?;
        Ok(Self {
            w: surface.width(),
            h: surface.height(),
            data: surface.into_data(),
        })
    }

    /// Row stride implied by the buffer length. Do not assume `w * 4`.
    pub fn pitch(&self) -> usize {
        if self.h == 0 {
            return 0;
        }
        self.data.len() / self.h as usize
    }
}

/// A batch render request, as read from JSON by hosts such as the CLI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    /// Font file to render with.
    pub font_path: PathBuf,
    /// Font size in pixels.
    pub size_px: u32,
    /// Strings to render, one result per entry.
    pub texts: Vec<String>,
    /// Glyph fill color.
    pub fill: Rgb,
    /// Stroke color.
    pub outline: Rgb,
    /// Stroke width in pixels; fractional values are truncated.
    #[serde(default)]
    pub thickness: f32,
}

impl RenderRequest {
    /// Render every text in the request.
    pub fn render(&self) -> Result<Vec<TextBitmap>, CallError> {
        render_texts(
            &self.font_path,
            self.size_px,
            &self.texts,
            self.fill,
            self.outline,
            self.thickness,
        )
    }
}

fn stroke_width(thickness: f32) -> RenderTextResult<u32> {
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(RenderTextError::argument(format!(
            "outline thickness must be finite and >= 0, got {thickness}"
        )));
    }
    if thickness >= u32::MAX as f32 {
        return Err(RenderTextError::argument(format!(
            "outline thickness {thickness} is too large"
        )));
    }
    Ok(thickness.trunc() as u32)
}

fn render_batch<S: AsRef<str>>(
    font_path: &Path,
    size_px: u32,
    texts: &[S],
    fill: Rgb,
    outline: Rgb,
    thickness: f32,
) -> RenderTextResult<Vec<TextBitmap>> {
    let thickness = stroke_width(thickness)?;

    let fill_font = FontHandle::open(font_path, size_px)?;
    let mut outline_font = FontHandle::open(font_path, size_px)?;
    outline_font.set_outline(thickness);

    let mut compositor =
        TextCompositor::new(VelloRasterizer::new(), fill_font, outline_font, thickness)
            .with_opts(CompositorOpts::from_env());

    compositor
        .render_all(texts, fill, outline)?
        .into_iter()
        .map(TextBitmap::from_surface)
        .collect()
}

/// Render one outlined string into a power-of-two RGBA8888 bitmap.
#[tracing::instrument(skip(font_path, fill, outline), fields(font = %font_path.as_ref().display()))]
pub fn render_text(
    font_path: impl AsRef<Path>,
    size_px: u32,
    text: &str,
    fill: Rgb,
    outline: Rgb,
    thickness: f32,
) -> Result<TextBitmap, CallError> {
    let mut out = render_batch(
        font_path.as_ref(),
        size_px,
        &[text],
        fill,
        outline,
        thickness,
    )?;
    out.pop()
        .ok_or_else(|| CallError::from(RenderTextError::rasterize("no bitmap produced")))
}

/// Render several strings with one pair of font handles, one bitmap per input in input order.
#[tracing::instrument(
    skip(font_path, texts, fill, outline),
    fields(font = %font_path.as_ref().display(), count = texts.len())
)]
pub fn render_texts<S: AsRef<str>>(
    font_path: impl AsRef<Path>,
    size_px: u32,
    texts: &[S],
    fill: Rgb,
    outline: Rgb,
    thickness: f32,
) -> Result<Vec<TextBitmap>, CallError> {
    Ok(render_batch(
        font_path.as_ref(),
        size_px,
        texts,
        fill,
        outline,
        thickness,
    )?)
}

/// Write a tightly packed RGBA8888 bitmap to `path` as PNG.
///
/// `bitmap.data` must be exactly `w * h * 4` bytes; the bitmap itself is never modified.
#[tracing::instrument(
    skip(path, bitmap),
    fields(dest = %path.as_ref().display(), w = bitmap.w, h = bitmap.h)
)]
pub fn save_png(path: impl AsRef<Path>, bitmap: &TextBitmap) -> Result<(), CallError> {
    let expected = (bitmap.w as usize)
        .checked_mul(bitmap.h as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| RenderTextError::argument("bitmap size overflows"))?;
    if bitmap.data.len() != expected {
        return Err(RenderTextError::argument(format!(
            "bitmap data is {} bytes, {}x{} RGBA8888 needs {expected}",
            bitmap.data.len(),
            bitmap.w,
            bitmap.h
        ))
        .into());
    }

    let surface = Surface::from_raw(
        bitmap.data.clone(),
        bitmap.w,
        bitmap.h,
        bitmap.w as usize * 4,
        PixelFormat::Rgba8888,
    )?;
    surface.export_png(path)?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/api.rs"]
mod tests;
