use super::{RenderError, Renderer, new_pixmap};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Fallback renderer: loads SVG bytes against a base directory so relative
/// `href`s resolve, and encodes through the `image` crate.
///
/// It shares the usvg parser with [`super::EngineRenderer`], so text usvg
/// rejects fails both. What differs is everything after parsing: the surface
/// takes the tree's own size (unit lengths such as `mm` resolved, viewBox
/// used when width/height are missing) instead of the root's plain pixel
/// attributes or a fixed fallback, and pixels go through `image` instead of
/// tiny-skia's encoder.
pub struct HeadlessRenderer {
    base_dir: PathBuf,
}

impl HeadlessRenderer {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn name(&self) -> &'static str {
        "usvg-headless"
    }

    fn render(&self, svg: &str) -> Result<Vec<u8>, RenderError> {
        let mut opt = usvg::Options {
            resources_dir: Some(self.base_dir.clone()),
            ..Default::default()
        };
        opt.fontdb_mut().load_system_fonts();

        let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)?;
        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());

        let mut pixmap = new_pixmap(width, height)?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // tiny-skia stores premultiplied alpha, PNG wants straight alpha
        let mut rgba = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let image = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".to_string()))?;

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_intrinsic_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="30" height="10"><rect width="30" height="10" fill="blue"/></svg>"#;
        let dir = tempfile::tempdir().unwrap();
        let png = HeadlessRenderer::new(dir.path()).render(svg).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (30, 10));
        assert_eq!(decoded.get_pixel(5, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_sizes_from_the_parsed_tree() {
        use super::super::EngineRenderer;

        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10mm" height="5mm"><rect width="100%" height="100%"/></svg>"#;
        let dir = tempfile::tempdir().unwrap();

        let headless = HeadlessRenderer::new(dir.path()).render(svg).unwrap();
        let (w, h) = image::load_from_memory(&headless).unwrap().to_rgba8().dimensions();
        assert!((37..=38).contains(&w) && (18..=19).contains(&h), "{w}x{h}");

        let engine = EngineRenderer::new((64, 64)).render(svg).unwrap();
        let decoded = image::load_from_memory(&engine).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn test_unparseable_svg_fails_like_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let err = HeadlessRenderer::new(dir.path()).render("this is not svg").unwrap_err();
        assert!(matches!(err, RenderError::SvgParse(_)));
    }

    #[test]
    fn test_oversized_canvas_is_an_error() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1080" height="108000000000"><rect width="1" height="1"/></svg>"#;
        let dir = tempfile::tempdir().unwrap();
        assert!(HeadlessRenderer::new(dir.path()).render(svg).is_err());
    }

    #[test]
    fn test_resolves_relative_images_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut tile = RgbaImage::new(2, 2);
        for pixel in tile.pixels_mut() {
            pixel.0 = [255, 0, 0, 255];
        }
        tile.save(dir.path().join("tile.png")).unwrap();

        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8"><image href="tile.png" x="0" y="0" width="8" height="8"/></svg>"#;
        let png = HeadlessRenderer::new(dir.path()).render(svg).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(4, 4).0, [255, 0, 0, 255]);
    }
}
