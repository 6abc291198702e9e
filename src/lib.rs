//! Render short strings into outlined, GPU-texture-friendly RGBA8 bitmaps.
//!
//! Each string is rendered twice: once as a stroke in the outline color, and once as filled
//! glyphs in the fill color. The fill pass is alpha-blended on top of the stroke. The result is
//! centered on a transparent canvas whose width and height are powers of two.
//!
//! # Pipeline overview
//!
//! 1. **Open fonts**: two [`FontHandle`]s on the same file. One of them is switched to outline
//!    mode.
//! 2. **Rasterize**: a [`GlyphRasterizer`] turns each pass into a tight [`Surface`]. The default
//!    is [`VelloRasterizer`], which uses Parley layout and `vello_cpu` coverage.
//! 3. **Composite**: [`composite_outlined`] / [`TextCompositor`] blend the passes and center
//!    them on the power-of-two canvas.
//! 4. **Hand off**: the call boundary ([`render_text`], [`render_texts`], [`save_png`]) returns
//!    `{w, h, data}` bitmaps or writes PNG files.
//!
//! Everything runs synchronously on the calling thread. The only process-wide state is the
//! reference-counted rasterizer [`backend`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod api;
mod compose;
mod font;
mod foundation;
mod raster;
mod surface;

/// Reference-counted rasterizer backend lifecycle.
pub mod backend;

pub use api::{CallError, RenderRequest, TextBitmap, render_text, render_texts, save_png};
pub use compose::{CompositorOpts, FILL_OFFSET_ENV, TextCompositor, composite_outlined};
pub use font::FontHandle;
pub use foundation::core::{BlendMode, PixelFormat, Rgb};
pub use foundation::error::{RenderTextError, RenderTextResult};
pub use foundation::math::next_power_of_two;
pub use raster::{GlyphRasterizer, VelloRasterizer};
pub use surface::Surface;
