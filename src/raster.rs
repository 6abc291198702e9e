//! Glyph rasterization: the seam between the compositor and the font backend.

use crate::font::FontHandle;
use crate::foundation::core::{PixelFormat, Rgb};
use crate::foundation::error::{RenderTextError, RenderTextResult};
use crate::surface::Surface;

/// Renders a run of text in one font to an anti-aliased surface.
///
/// Implementations return a surface exactly the size of the run's bounding box. When the font
/// is in outline mode with width `t`, the box grows by `t` on every side and the glyphs are
/// shifted by `(t, t)`, so a fill-pass surface lines up at offset `(t, t)`.
pub trait GlyphRasterizer {
    /// Font type this rasterizer draws with.
    type Font;

    /// Rasterize `text` with `font` in `color` (alpha 255).
    fn rasterize(
        &mut self,
        font: &mut Self::Font,
        text: &str,
        color: Rgb,
    ) -> RenderTextResult<Surface>;
}

/// CPU glyph rasterizer: Parley for shaping/layout, `vello_cpu` for coverage.
///
/// Produces [`PixelFormat::Rgba8Premul`] surfaces.
pub struct VelloRasterizer {
    layout_ctx: parley::LayoutContext<Rgb>,
}

impl Default for VelloRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRasterizer {
    /// Construct a rasterizer with a fresh layout context.
    pub fn new() -> Self {
        Self {
            layout_ctx: parley::LayoutContext::new(),
        }
    }
}

impl GlyphRasterizer for VelloRasterizer {
    type Font = FontHandle;

    #[tracing::instrument(skip(self, font, color), fields(outline = font.outline()))]
    fn rasterize(
        &mut self,
        font: &mut FontHandle,
        text: &str,
        color: Rgb,
    ) -> RenderTextResult<Surface> {
        let size_px = font.size_px() as f32;
        let family = font.family_name().to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut font.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(color));
        let mut layout: parley::Layout<Rgb> = builder.build(text);
        layout.break_all_lines(None);

        // The box is the advance box grown to cover any overhanging ink, so both passes of
        // one text share an origin and the fill lands at (t, t) inside the stroke. Overhangs
        // get one extra pixel so anti-aliased edges stay off the border.
        let ink = ink_bounds(font.font_bytes(), &layout)?;
        let (mut x0, mut y0) = (0.0f32, 0.0f32);
        let (mut x1, mut y1) = (layout.full_width(), layout.height());
        if let Some(ink) = ink {
            if ink.min_x < x0 {
                x0 = ink.min_x.floor() - 1.0;
            }
            if ink.min_y < y0 {
                y0 = ink.min_y.floor() - 1.0;
            }
            if ink.max_x > x1 {
                x1 = ink.max_x.ceil() + 1.0;
            }
            if ink.max_y > y1 {
                y1 = ink.max_y.ceil() + 1.0;
            }
        }
        let run_w = (x1.ceil() - x0).max(0.0) as u32;
        let run_h = (y1.ceil() - y0).max(0.0) as u32;
        if layout.full_width() <= 0.0 || run_w == 0 || run_h == 0 {
            return Err(RenderTextError::rasterize("text has zero width"));
        }

        let margin = font.outline();
        let grow = |v: u32| {
            margin
                .checked_mul(2)
                .and_then(|m| v.checked_add(m))
                .and_then(|v| u16::try_from(v).ok())
                .ok_or_else(|| {
                    RenderTextError::rasterize(format!(
                        "glyph run {run_w}x{run_h} with outline {margin} exceeds {} pixels",
                        u16::MAX
                    ))
                })
        };
        let (w, h) = (grow(run_w)?, grow(run_h)?);

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let [r, g, b, a] = color.to_rgba8();
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        if margin > 0 {
            ctx.set_stroke(vello_cpu::kurbo::Stroke::new(2.0 * f64::from(margin)));
        }

        let (shift_x, shift_y) = (margin as f32 - x0, margin as f32 - y0);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x + shift_x,
                    y: g.y + shift_y,
                });
                let builder = ctx
                    .glyph_run(&font.font_data)
                    .font_size(run.run().font_size());
                if margin > 0 {
                    builder.stroke_glyphs(glyphs);
                } else {
                    builder.fill_glyphs(glyphs);
                }
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        tracing::trace!(w, h, "glyph run rasterized");

        let width = u32::from(w);
        Surface::from_raw(
            pixmap.data_as_u8_slice().to_vec(),
            width,
            u32::from(h),
            width as usize * 4,
            PixelFormat::Rgba8Premul,
        )
    }
}

/// Union of glyph outline extents in layout coordinates (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
struct InkBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

struct BoundsPen<'a> {
    ink: &'a mut Option<InkBounds>,
    origin_x: f32,
    origin_y: f32,
}

impl BoundsPen<'_> {
    // Control points bound the curve, so tracking them never under-reports the ink.
    fn add(&mut self, x: f32, y: f32) {
        let (x, y) = (self.origin_x + x, self.origin_y - y);
        let b = self.ink.get_or_insert(InkBounds {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        });
        b.min_x = b.min_x.min(x);
        b.min_y = b.min_y.min(y);
        b.max_x = b.max_x.max(x);
        b.max_y = b.max_y.max(y);
    }
}

impl skrifa::outline::OutlinePen for BoundsPen<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.add(cx0, cy0);
        self.add(x, y);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.add(cx0, cy0);
        self.add(cx1, cy1);
        self.add(x, y);
    }

    fn close(&mut self) {}
}

fn ink_bounds(
    font_bytes: &[u8],
    layout: &parley::Layout<Rgb>,
) -> RenderTextResult<Option<InkBounds>> {
    use skrifa::MetadataProvider as _;

    let font_ref = skrifa::FontRef::from_index(font_bytes, 0)
        .map_err(|e| RenderTextError::rasterize(format!("couldn't read glyph outlines: {e}")))?;
    let outlines = font_ref.outline_glyphs();

    let mut ink = None;
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let coords: Vec<skrifa::instance::NormalizedCoord> = run
                .run()
                .normalized_coords()
                .iter()
                .map(|c| skrifa::instance::NormalizedCoord::from_bits(*c))
                .collect();
            let size = skrifa::instance::Size::new(run.run().font_size());
            for g in run.positioned_glyphs() {
                let Some(outline) = outlines.get(skrifa::GlyphId::from(g.id)) else {
                    continue;
                };
                let mut pen = BoundsPen {
                    ink: &mut ink,
                    origin_x: g.x,
                    origin_y: g.y,
                };
                let settings = skrifa::outline::DrawSettings::unhinted(
                    size,
                    skrifa::instance::LocationRef::new(&coords),
                );
                if let Err(e) = outline.draw(settings, &mut pen) {
                    tracing::trace!(glyph = g.id, error = %e, "glyph outline skipped");
                }
            }
        }
    }
    Ok(ink)
}

#[cfg(test)]
#[path = "../tests/unit/raster.rs"]
mod tests;
