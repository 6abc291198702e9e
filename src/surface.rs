//! Owned RGBA pixel surfaces and the blit/convert operations the compositor is built from.

mod png;

use crate::foundation::core::{BlendMode, PixelFormat, Rgb};
use crate::foundation::error::{RenderTextError, RenderTextResult};
use crate::foundation::math::{premul_over, premultiply, unpremultiply};
use crate::raster::GlyphRasterizer;

/// A single-owner RGBA pixel buffer with width/height/pitch metadata.
///
/// Invariant: `pitch >= width * 4` and `data.len() == pitch * height`.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pitch: usize,
    format: PixelFormat,
    blend: BlendMode,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pitch", &self.pitch)
            .field("format", &self.format)
            .field("blend", &self.blend)
            .field("data_len", &self.data.len())
            .finish()
    }
}

fn tight_pitch(width: u32, format: PixelFormat) -> Option<usize> {
    (width as usize).checked_mul(format.bytes_per_pixel())
}

fn try_alloc_zeroed(len: usize) -> RenderTextResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| {
        RenderTextError::alloc(format!("couldn't allocate {len} bytes of pixels: {e}"))
    })?;
    buf.resize(len, 0);
    Ok(buf)
}

fn convert_px(px: [u8; 4], from: PixelFormat, to: PixelFormat) -> [u8; 4] {
    match (from, to) {
        (PixelFormat::Rgba8888, PixelFormat::Rgba8Premul) => premultiply(px),
        (PixelFormat::Rgba8Premul, PixelFormat::Rgba8888) => unpremultiply(px),
        _ => px,
    }
}

impl Surface {
    /// Transparent RGBA8888 canvas of the given size.
    pub fn blank(width: u32, height: u32) -> RenderTextResult<Self> {
        Self::blank_with_format(width, height, PixelFormat::Rgba8888)
    }

    /// Transparent canvas of the given size and format, tightly packed.
    pub fn blank_with_format(
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> RenderTextResult<Self> {
        let pitch = tight_pitch(width, format).ok_or_else(|| {
            RenderTextError::alloc(format!("surface width {width} overflows row pitch"))
        })?;
        let len = pitch.checked_mul(height as usize).ok_or_else(|| {
            RenderTextError::alloc(format!("surface {width}x{height} overflows buffer size"))
        })?;
        Ok(Self {
            width,
            height,
            pitch,
            format,
            blend: BlendMode::None,
            data: try_alloc_zeroed(len)?,
        })
    }

    /// Wrap an existing pixel buffer whose rows are `pitch` bytes apart.
    ///
    /// Bytes past `pitch * height` are dropped. A buffer that is too short, or a pitch smaller
    /// than one row of pixels, is an [`RenderTextError::Argument`].
    pub fn from_raw(
        mut data: Vec<u8>,
        width: u32,
        height: u32,
        pitch: usize,
        format: PixelFormat,
    ) -> RenderTextResult<Self> {
        let min_pitch = tight_pitch(width, format)
            .ok_or_else(|| RenderTextError::argument("surface width overflows row pitch"))?;
        if pitch < min_pitch {
            return Err(RenderTextError::argument(format!(
                "pitch {pitch} is smaller than a {width}px row ({min_pitch} bytes)"
            )));
        }
        let needed = pitch
            .checked_mul(height as usize)
            .ok_or_else(|| RenderTextError::argument("surface size overflows buffer length"))?;
        if data.len() < needed {
            return Err(RenderTextError::argument(format!(
                "pixel buffer holds {} bytes, {width}x{height} with pitch {pitch} needs {needed}",
                data.len()
            )));
        }
        data.truncate(needed);
        Ok(Self {
            width,
            height,
            pitch,
            format,
            blend: BlendMode::None,
            data,
        })
    }

    /// Rasterize `text` with `font` through `rasterizer`.
    ///
    /// The result is exactly the bounding box of the rendered glyphs, in the rasterizer's
    /// native format.
    pub fn from_glyph_run<R: GlyphRasterizer + ?Sized>(
        rasterizer: &mut R,
        font: &mut R::Font,
        text: &str,
        color: Rgb,
    ) -> RenderTextResult<Self> {
        rasterizer.rasterize(font, text, color)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row, including any padding.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Pixel format of [`Self::data`].
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Blend mode used when this surface is the source of a blit.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Raw pixel bytes, `pitch * height` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the surface, returning its raw pixel bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)` as stored (in [`Self::format`]).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.px(x as usize, y as usize))
    }

    /// Pixel at `(x, y)` converted to straight RGBA.
    pub fn pixel_rgba8888(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixel(x, y)
            .map(|px| convert_px(px, self.format, PixelFormat::Rgba8888))
    }

    /// Set the blend mode used by subsequent blits from this surface.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    /// Convert the pixels to `format` in place, repacking rows tightly.
    pub fn convert_format(&mut self, format: PixelFormat) -> RenderTextResult<()> {
        let tight = tight_pitch(self.width, format);
        if format == self.format && tight == Some(self.pitch) {
            return Ok(());
        }

        let mut out = Self::blank_with_format(self.width, self.height, format)?;
        let row_bytes = out.pitch;
        for y in 0..self.height as usize {
            let src_row = &self.data[y * self.pitch..y * self.pitch + row_bytes];
            let dst_row = &mut out.data[y * row_bytes..(y + 1) * row_bytes];
            if format == self.format {
                dst_row.copy_from_slice(src_row);
                continue;
            }
            for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let px = convert_px([s[0], s[1], s[2], s[3]], self.format, format);
                d.copy_from_slice(&px);
            }
        }

        tracing::trace!(from = ?self.format, to = ?format, "surface format converted");
        self.format = format;
        self.pitch = out.pitch;
        self.data = out.data;
        Ok(())
    }

    /// Composite `src` onto `dst` with its top-left corner at `(dst_x, dst_y)`.
    ///
    /// Uses `src`'s blend mode, clips to `dst`'s bounds and never resizes `dst`.
    pub fn blit(src: &Surface, dst: &mut Surface, dst_x: i32, dst_y: i32) {
        let x0 = i64::from(dst_x).max(0);
        let y0 = i64::from(dst_y).max(0);
        let x1 = (i64::from(dst_x) + i64::from(src.width)).min(i64::from(dst.width));
        let y1 = (i64::from(dst_y) + i64::from(src.height)).min(i64::from(dst.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for y in y0..y1 {
            let sy = (y - i64::from(dst_y)) as usize;
            for x in x0..x1 {
                let sx = (x - i64::from(dst_x)) as usize;
                let s = src.px(sx, sy);
                let out = match src.blend {
                    BlendMode::None => convert_px(s, src.format, dst.format),
                    BlendMode::Blend => {
                        if s[3] == 0 {
                            continue;
                        }
                        let d = dst.px(x as usize, y as usize);
                        if s[3] == 255 || d[3] == 0 {
                            convert_px(s, src.format, dst.format)
                        } else {
                            let s = convert_px(s, src.format, PixelFormat::Rgba8Premul);
                            let d = convert_px(d, dst.format, PixelFormat::Rgba8Premul);
                            convert_px(premul_over(d, s), PixelFormat::Rgba8Premul, dst.format)
                        }
                    }
                };
                dst.put_px(x as usize, y as usize, out);
            }
        }
    }

    fn px(&self, x: usize, y: usize) -> [u8; 4] {
        let i = y * self.pitch + x * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    fn put_px(&mut self, x: usize, y: usize, px: [u8; 4]) {
        let i = y * self.pitch + x * 4;
        self.data[i..i + 4].copy_from_slice(&px);
    }
}

#[cfg(test)]
#[path = "../tests/unit/surface.rs"]
mod tests;
