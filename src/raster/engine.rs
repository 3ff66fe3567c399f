use super::{RenderError, Renderer, new_pixmap};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::{Path, PathBuf};

/// Primary renderer: parses SVG text straight into a tiny-skia surface
/// sized to the document's declared `width`/`height`.
pub struct EngineRenderer {
    fallback_size: (u32, u32),
    resources_dir: Option<PathBuf>,
}

impl EngineRenderer {
    pub fn new(fallback_size: (u32, u32)) -> Self {
        Self {
            fallback_size,
            resources_dir: None,
        }
    }

    pub fn with_resources_dir(mut self, dir: &Path) -> Self {
        self.resources_dir = Some(dir.to_path_buf());
        self
    }
}

fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let value = value.strip_suffix("px").unwrap_or(value);
    value.parse::<f32>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// `width`/`height` of the root `<svg>` element, if both are plain lengths
pub fn declared_size(svg: &str) -> Option<(f32, f32)> {
    let mut reader = Reader::from_str(svg);
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() != b"svg" {
                    return None;
                }
                let mut width = None;
                let mut height = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"width" => width = parse_length(&value),
                        b"height" => height = parse_length(&value),
                        _ => {}
                    }
                }
                return width.zip(height);
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

impl Renderer for EngineRenderer {
    fn name(&self) -> &'static str {
        "resvg-engine"
    }

    fn render(&self, svg: &str) -> Result<Vec<u8>, RenderError> {
        let mut opt = usvg::Options {
            resources_dir: self.resources_dir.clone(),
            ..Default::default()
        };
        opt.fontdb_mut().load_system_fonts();

        let tree = usvg::Tree::from_str(svg, &opt)?;

        let (width, height) = match declared_size(svg) {
            Some((w, h)) => (w.round().max(1.0) as u32, h.round().max(1.0) as u32),
            None => self.fallback_size,
        };
        let mut pixmap = new_pixmap(width, height)?;

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_size() {
        assert_eq!(
            declared_size(
                r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="1080" height="540.5px"/>"#
            ),
            Some((1080.0, 540.5))
        );
        assert_eq!(declared_size(r#"<svg viewBox="0 0 10 10"/>"#), None);
        assert_eq!(declared_size(r#"<svg width="100%" height="10"/>"#), None);
        assert_eq!(declared_size("<html/>"), None);
    }

    #[test]
    fn test_renders_declared_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20" viewBox="0 0 4 2"><rect width="4" height="2" fill="red"/></svg>"#;
        let png = EngineRenderer::new((1000, 1000)).render(svg).unwrap();
        assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn test_fallback_size_without_declared_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10"/></svg>"#;
        let png = EngineRenderer::new((64, 32)).render(svg).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn test_oversized_canvas_is_refused() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="1080" height="108000000000" viewBox="0 0 1 100000000"><rect width="1" height="1"/></svg>"#;
        let err = EngineRenderer::new((1000, 1000)).render(svg).unwrap_err();
        assert!(matches!(err, RenderError::PixmapAlloc { width: 1080, .. }), "{err}");
    }

    #[test]
    fn test_invalid_svg_is_an_error() {
        let err = EngineRenderer::new((10, 10)).render("this is not svg").unwrap_err();
        assert!(matches!(err, RenderError::SvgParse(_)));
    }
}
