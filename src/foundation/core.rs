use std::str::FromStr;

use crate::foundation::error::{RenderTextError, RenderTextResult};

/// Opaque RGB color. Alpha is implicitly 255 for every color entering the renderer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Straight RGBA8 with alpha forced to 255.
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl FromStr for Rgb {
    type Err = RenderTextError;

    /// Parse `"r,g,b"` (decimal, 0-255) or `"#rrggbb"`.
    fn from_str(s: &str) -> RenderTextResult<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(RenderTextError::argument(format!(
                    "color '{s}' must be #rrggbb"
                )));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                    RenderTextError::argument(format!("color '{s}' has invalid hex digits"))
                })
            };
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(RenderTextError::argument(format!(
                "color '{s}' must have three components (r,g,b)"
            )));
        };
        let channel = |v: &str| {
            v.parse::<u8>().map_err(|_| {
                RenderTextError::argument(format!("color component '{v}' is not in 0..=255"))
            })
        };
        Ok(Self::new(channel(r)?, channel(g)?, channel(b)?))
    }
}

/// Memory layout of a surface's pixels. Both formats are 4 bytes per pixel, R-G-B-A byte order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Straight (non-premultiplied) alpha. Every surface leaving the core uses this format.
    #[default]
    Rgba8888,
    /// Color premultiplied by alpha; the rasterizer-native format.
    Rgba8Premul,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }
}

/// How a surface composites when it is the source of a blit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Replace destination pixels.
    #[default]
    None,
    /// Straight-alpha source-over.
    Blend,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
