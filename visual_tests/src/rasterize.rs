use crate::{Result, VisualTestError};
use image::RgbaImage;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg;

/// Render an exported SVG document onto an opaque background.
pub fn rasterize_document(document: &[u8], background: [u8; 4]) -> Result<RgbaImage> {
    let tree = usvg::Tree::from_data(document, &usvg::Options::default())
        .map_err(|e| VisualTestError::Rasterize(e.to_string()))?;
    let size = tree.size().to_int_size();

    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        VisualTestError::Rasterize(format!(
            "invalid document size {}x{}",
            size.width(),
            size.height()
        ))
    })?;
    let [r, g, b, a] = background;
    pixmap.fill(Color::from_rgba8(r, g, b, a));
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size.width(), size.height(), data)
        .ok_or_else(|| VisualTestError::Rasterize("pixel buffer size mismatch".into()))
}
