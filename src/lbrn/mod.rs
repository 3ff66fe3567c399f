//! LightBurn project to SVG transcoding
//!
//! This module reads LightBurn `.lbrn` / `.lbrn2` XML projects and converts
//! their shapes into SVG markup.

pub mod image;
pub mod lookup;
pub mod matrix;
pub mod shapes;
pub mod style;
pub mod svg;
pub mod vertices;
pub mod walk;
pub mod xml;

// Re-export main public API
pub use image::{ImageFormat, ImageMode};
pub use svg::{Canvas, MIN_OUTPUT_SIZE, SvgDocument, TranscodeOptions, transcode, transcode_str};
pub use walk::{ShapeKind, WalkContext};
pub use xml::{Element, XmlError, parse_document};
