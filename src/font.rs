use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::backend::{self, BackendGuard};
use crate::foundation::error::{RenderTextError, RenderTextResult};

/// A font loaded from disk at a fixed pixel size.
///
/// Each handle owns its own Parley font context, so two handles opened from the same path are
/// fully independent. The stroke pass and the fill pass of one render use two such handles, one
/// of them with a non-zero [outline width](FontHandle::set_outline).
pub struct FontHandle {
    path: PathBuf,
    size_px: u32,
    outline_px: u32,
    family: String,
    font_bytes: Arc<Vec<u8>>,
    pub(crate) font_ctx: parley::FontContext,
    pub(crate) font_data: vello_cpu::peniko::FontData,
    _backend: BackendGuard,
}

impl std::fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontHandle")
            .field("path", &self.path)
            .field("size_px", &self.size_px)
            .field("outline_px", &self.outline_px)
            .field("family", &self.family)
            .field("font_bytes_len", &self.font_bytes.len())
            .finish()
    }
}

impl FontHandle {
    /// Load the font at `path` for rendering at `size_px` pixels.
    ///
    /// Fails with [`RenderTextError::FontLoad`] when the file cannot be read or contains no
    /// usable font face, and with [`RenderTextError::Argument`] for a zero size.
    #[tracing::instrument(skip(path), fields(font = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, size_px: u32) -> RenderTextResult<Self> {
        let path = path.as_ref();
        if size_px == 0 {
            return Err(RenderTextError::argument("font size must be > 0"));
        }

        let backend = backend::acquire()?;
        let font_bytes = Arc::new(std::fs::read(path).map_err(|e| {
            RenderTextError::font_load(format!("couldn't open '{}': {e}", path.display()))
        })?);

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            RenderTextError::font_load(format!(
                "'{}' does not contain a usable font face",
                path.display()
            ))
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| {
                RenderTextError::font_load(format!(
                    "font family in '{}' has no name",
                    path.display()
                ))
            })?
            .to_string();

        let font_data =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::new(font_bytes.clone()), 0);

        tracing::debug!(%family, size_px, "font opened");
        Ok(Self {
            path: path.to_path_buf(),
            size_px,
            outline_px: 0,
            family,
            font_bytes,
            font_ctx,
            font_data,
            _backend: backend,
        })
    }

    /// Switch the handle to stroke rendering with the given width in pixels (0 = filled glyphs).
    pub fn set_outline(&mut self, width_px: u32) {
        self.outline_px = width_px;
    }

    /// Current outline width in pixels.
    pub fn outline(&self) -> u32 {
        self.outline_px
    }

    /// Pixel size the font was opened at.
    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    /// Path the font was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Family name of the first face in the font file.
    pub fn family_name(&self) -> &str {
        &self.family
    }

    /// Raw font file bytes.
    pub fn font_bytes(&self) -> &[u8] {
        &self.font_bytes
    }
}

#[cfg(test)]
#[path = "../tests/unit/font.rs"]
mod tests;
