//! SVG document assembly

use super::image::{ImageMode, compact_base64};
use super::lookup::Lookup::{Attr, Child};
use super::lookup::{Lookup, resolve};
use super::shapes::{Fragment, FragmentKind};
use super::walk::collect_fragments;
use super::xml::{Element, parse_document};
use crate::error::Result;
use quick_xml::escape::escape;
use tracing::{debug, warn};

const CANVAS_WIDTH: &[Lookup] = &[Attr("Width"), Child("Width")];
const CANVAS_HEIGHT: &[Lookup] = &[Attr("Height"), Child("Height")];
const DEFAULT_CANVAS: f64 = 1000.0;

/// Minimum output dimension used by default
pub const MIN_OUTPUT_SIZE: f64 = 1080.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeOptions {
    pub images: ImageMode,
    /// Scale the declared `width`/`height` so the smaller side reaches this
    /// size. The `viewBox` is never scaled.
    pub min_output_size: Option<f64>,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            images: ImageMode::Inline,
            min_output_size: Some(MIN_OUTPUT_SIZE),
        }
    }
}

/// Project canvas and the size the SVG declares for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub output_width: f64,
    pub output_height: f64,
}

fn canvas_dimension(root: &Element, candidates: &[Lookup], axis: &str) -> f64 {
    let Some(raw) = resolve(root, candidates) else {
        return DEFAULT_CANVAS;
    };
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => {
            warn!(axis, value = raw, "invalid canvas size, using {DEFAULT_CANVAS}");
            DEFAULT_CANVAS
        }
    }
}

impl Canvas {
    pub fn new(width: f64, height: f64, min_output_size: Option<f64>) -> Self {
        let (output_width, output_height) = match min_output_size {
            Some(min) if width.min(height) < min => {
                if width <= height {
                    (min, height * min / width)
                } else {
                    (width * min / height, min)
                }
            }
            _ => (width, height),
        };
        Self {
            width,
            height,
            output_width,
            output_height,
        }
    }

    pub fn from_root(root: &Element, min_output_size: Option<f64>) -> Self {
        Self::new(
            canvas_dimension(root, CANVAS_WIDTH, "width"),
            canvas_dimension(root, CANVAS_HEIGHT, "height"),
            min_output_size,
        )
    }

    fn envelope(&self, body: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n  \
             {}\n\
             </svg>\n",
            self.output_width, self.output_height, self.width, self.height, body
        )
    }
}

/// Result of transcoding one project
#[derive(Debug, Clone)]
pub struct SvgDocument {
    pub svg: String,
    /// At least one shape was recognized and emitted
    pub has_elements: bool,
    /// Base64 PNG preview embedded by LightBurn
    pub thumbnail: Option<String>,
    pub canvas: Canvas,
}

impl SvgDocument {
    /// The thumbnail as a standalone SVG covering the canvas
    pub fn thumbnail_svg(&self) -> Option<String> {
        let payload = compact_base64(self.thumbnail.as_deref()?);
        let image = format!(
            r#"<image href="data:image/png;base64,{}" x="0" y="0" width="{}" height="{}" />"#,
            escape(payload.as_str()),
            self.canvas.width,
            self.canvas.height
        );
        Some(self.canvas.envelope(&image))
    }
}

fn find_thumbnail(root: &Element) -> Option<String> {
    root.find_descendant("Thumbnail")?
        .attr("Source")
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Images paint first so vectors stay visible on top of them
fn order_fragments(fragments: Vec<Fragment>) -> Vec<String> {
    let (images, vectors): (Vec<_>, Vec<_>) = fragments
        .into_iter()
        .partition(|f| f.kind == FragmentKind::Image);
    images.into_iter().chain(vectors).map(|f| f.markup).collect()
}

/// Transcode a parsed project into an SVG document
pub fn transcode(root: &Element, options: &TranscodeOptions) -> Result<SvgDocument> {
    let canvas = Canvas::from_root(root, options.min_output_size);
    let fragments = collect_fragments(root, &options.images)?;
    let has_elements = !fragments.is_empty();
    debug!(
        shapes = fragments.len(),
        width = canvas.width,
        height = canvas.height,
        "transcoded project"
    );

    let body = order_fragments(fragments).join("\n  ");
    Ok(SvgDocument {
        svg: canvas.envelope(&body),
        has_elements,
        thumbnail: find_thumbnail(root),
        canvas,
    })
}

pub fn transcode_str(xml: &str, options: &TranscodeOptions) -> Result<SvgDocument> {
    let root = parse_document(xml)?;
    transcode(&root, options)
}
