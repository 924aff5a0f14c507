//! PNG export of a rasterized frame.
//!
//! Feature-gated behind `png` (default on), which turns on the `image` PNG
//! codec. The rasterization itself lives in [`crate::pixel`] (always
//! available).

use std::path::Path;

use tracing::debug;
use vector_field_core::draw::DrawList;
use vector_field_core::error::EngineError;

use crate::pixel::rasterize;

/// Writes an RGBA8 buffer as a PNG image.
///
/// Returns `EngineError::InvalidDimensions` if the size overflows `u32`, or
/// `EngineError::Io` on a buffer mismatch or write failure.
pub fn write_png(rgba: Vec<u8>, width: usize, height: usize, path: &Path) -> Result<(), EngineError> {
    let w = u32::try_from(width).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))?;
    debug!(path = %path.display(), width, height, "snapshot written");
    Ok(())
}

/// Rasterizes a draw list and writes it as a PNG image.
pub fn render_png(list: &DrawList, width: usize, height: usize, path: &Path) -> Result<(), EngineError> {
    let rgba = rasterize(list, width, height)?;
    write_png(rgba, width, height, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vector_field_core::color::CYAN;
    use vector_field_core::draw::{BlendMode, DrawCommand};

    #[test]
    fn render_png_round_trip() {
        let mut list = DrawList::new(16.0, 16.0, BlendMode::Normal);
        list.push(DrawCommand::Circle {
            x: 8.0,
            y: 8.0,
            radius: 4.0,
            color: CYAN,
            alpha: 1.0,
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        render_png(&list, 16, 16, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 16);
        assert_eq!(img.get_pixel(8, 8).0, [6, 182, 212, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [5, 5, 8, 255]);
    }

    #[test]
    fn write_png_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.png");
        let result = write_png(vec![0; 10], 4, 4, &path);
        assert!(matches!(result, Err(EngineError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        let list = DrawList::new(2.0, 2.0, BlendMode::Normal);
        assert!(matches!(
            render_png(&list, 2, 2, &path),
            Err(EngineError::Io(_))
        ));
    }
}
