//! Outlined-text compositing: stroke pass, fill pass on top, centered on a power-of-two canvas.

use crate::foundation::core::{BlendMode, Rgb};
use crate::foundation::error::{RenderTextError, RenderTextResult};
use crate::foundation::math::next_power_of_two;
use crate::raster::GlyphRasterizer;
use crate::surface::Surface;

/// Env var overriding [`CompositorOpts::fill_offset`] as `"x,y"`.
pub const FILL_OFFSET_ENV: &str = "RENDER_TEXT_FILL_OFFSET";

/// Options for [`composite_outlined`] and [`TextCompositor`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositorOpts {
    pub(crate) fill_offset: Option<(i32, i32)>,
}

impl CompositorOpts {
    /// Return options with the fill pass blitted at `offset` instead of `(thickness, thickness)`.
    pub fn with_fill_offset(mut self, offset: Option<(i32, i32)>) -> Self {
        self.fill_offset = offset;
        self
    }

    /// Offset override, if any.
    pub fn fill_offset(&self) -> Option<(i32, i32)> {
        self.fill_offset
    }

    /// Defaults, with [`FILL_OFFSET_ENV`] applied when it parses.
    pub fn from_env() -> Self {
        let fill_offset = std::env::var(FILL_OFFSET_ENV)
            .ok()
            .and_then(|v| parse_offset(&v));
        Self { fill_offset }
    }
}

fn parse_offset(s: &str) -> Option<(i32, i32)> {
    let (x, y) = s.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Render one outlined string.
///
/// `outline_font` must already be in outline mode with width `thickness`; `fill_font` must not
/// be. The result is an RGBA8888 surface whose width and height are powers of two, with the
/// stroked run centered in it.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip(rasterizer, fill_font, outline_font, fill, outline, opts))]
pub fn composite_outlined<R: GlyphRasterizer + ?Sized>(
    rasterizer: &mut R,
    fill_font: &mut R::Font,
    outline_font: &mut R::Font,
    thickness: u32,
    text: &str,
    fill: Rgb,
    outline: Rgb,
    opts: CompositorOpts,
) -> RenderTextResult<Surface> {
    let mut bg = Surface::from_glyph_run(rasterizer, outline_font, text, outline)?;
    let mut fg = Surface::from_glyph_run(rasterizer, fill_font, text, fill)?;

    fg.set_blend_mode(BlendMode::Blend);
    let (fx, fy) = match opts.fill_offset {
        Some(offset) => offset,
        None => {
            let t = i32::try_from(thickness).map_err(|_| {
                RenderTextError::argument(format!("outline thickness {thickness} is too large"))
            })?;
            (t, t)
        }
    };
    Surface::blit(&fg, &mut bg, fx, fy);
    drop(fg);

    let canvas_w = next_power_of_two(bg.width()).ok_or_else(|| {
        RenderTextError::alloc(format!("width {} has no u32 power of two", bg.width()))
    })?;
    let canvas_h = next_power_of_two(bg.height()).ok_or_else(|| {
        RenderTextError::alloc(format!("height {} has no u32 power of two", bg.height()))
    })?;
    let mut canvas = Surface::blank(canvas_w, canvas_h)?;

    let dx = (canvas_w / 2) as i64 - (bg.width() / 2) as i64;
    let dy = (canvas_h / 2) as i64 - (bg.height() / 2) as i64;
    bg.set_blend_mode(BlendMode::None);
    Surface::blit(&bg, &mut canvas, dx as i32, dy as i32);

    tracing::debug!(
        run_w = bg.width(),
        run_h = bg.height(),
        canvas_w,
        canvas_h,
        "outlined text composited"
    );
    Ok(canvas)
}

/// Reusable compositor for a batch of strings sharing font, size, colors and thickness.
///
/// Fonts are opened once by the caller and reused for every string.
pub struct TextCompositor<R: GlyphRasterizer> {
    rasterizer: R,
    fill_font: R::Font,
    outline_font: R::Font,
    thickness: u32,
    opts: CompositorOpts,
}

impl<R: GlyphRasterizer> TextCompositor<R> {
    /// Build a compositor. `outline_font` must already be in outline mode with `thickness`.
    pub fn new(rasterizer: R, fill_font: R::Font, outline_font: R::Font, thickness: u32) -> Self {
        Self {
            rasterizer,
            fill_font,
            outline_font,
            thickness,
            opts: CompositorOpts::default(),
        }
    }

    /// Return the compositor with `opts` applied.
    pub fn with_opts(mut self, opts: CompositorOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Outline thickness in pixels.
    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    /// Render one string.
    pub fn render(&mut self, text: &str, fill: Rgb, outline: Rgb) -> RenderTextResult<Surface> {
        composite_outlined(
            &mut self.rasterizer,
            &mut self.fill_font,
            &mut self.outline_font,
            self.thickness,
            text,
            fill,
            outline,
            self.opts,
        )
    }

    /// Render every string, returning one surface per input in input order.
    ///
    /// Stops at the first failure; surfaces rendered so far are dropped.
    #[tracing::instrument(skip_all)]
    pub fn render_all<I, S>(
        &mut self,
        texts: I,
        fill: Rgb,
        outline: Rgb,
    ) -> RenderTextResult<Vec<Surface>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let texts = texts.into_iter();
        let mut out = Vec::with_capacity(texts.size_hint().0);
        for (i, text) in texts.enumerate() {
            tracing::debug!(index = i, "rendering batch entry");
            out.push(self.render(text.as_ref(), fill, outline)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../tests/unit/compose.rs"]
mod tests;
