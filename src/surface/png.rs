use std::io::Cursor;
use std::path::Path;

use crate::foundation::core::PixelFormat;
use crate::foundation::error::{RenderTextError, RenderTextResult};
use crate::surface::Surface;

impl Surface {
    /// Write the surface to `path` as an RGBA8 PNG.
    ///
    /// Premultiplied surfaces are converted to straight alpha first; `self` is left untouched.
    #[tracing::instrument(skip(self, path), fields(w = self.width(), h = self.height()))]
    pub fn export_png(&self, path: impl AsRef<Path>) -> RenderTextResult<()> {
        let path = path.as_ref();
        let rgba = self.tight_rgba8888()?;
        image::save_buffer_with_format(
            path,
            &rgba,
            self.width(),
            self.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| RenderTextError::encode(format!("couldn't write '{}': {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "png written");
        Ok(())
    }

    /// Encode the surface as RGBA8 PNG bytes in memory.
    pub fn encode_png(&self) -> RenderTextResult<Vec<u8>> {
        let rgba = self.tight_rgba8888()?;
        let img = image::RgbaImage::from_raw(self.width(), self.height(), rgba)
            .ok_or_else(|| RenderTextError::encode("pixel buffer does not match image size"))?;
        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| RenderTextError::encode(format!("couldn't encode png: {e}")))?;
        Ok(out)
    }

    fn tight_rgba8888(&self) -> RenderTextResult<Vec<u8>> {
        if self.format() == PixelFormat::Rgba8888 && self.pitch() == self.width() as usize * 4 {
            return Ok(self.data().to_vec());
        }
        let mut copy = self.clone();
        copy.convert_format(PixelFormat::Rgba8888)?;
        Ok(copy.into_data())
    }
}
