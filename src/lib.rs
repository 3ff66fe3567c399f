//! # lbrn-export
//!
//! A Rust library for exporting LightBurn projects to SVG and PNG.
//!
//! ## Features
//!
//! - **LBRN/LBRN2 to SVG**: Transcode rectangles, ellipses, paths, polygons,
//!   text and embedded bitmaps, with transforms and basic stroke/fill
//! - **SVG to PNG**: Rasterize through an ordered chain of renderers
//! - **Thumbnail fallback**: Use the project's embedded preview when no
//!   shapes are recognized
//! - **Batch export**: Convert whole directories into an output subfolder
//!
//! ## Example - SVG Conversion
//!
//! ```rust,ignore
//! use lbrn_export::lbrn::{transcode_str, TranscodeOptions};
//!
//! let xml = std::fs::read_to_string("example.lbrn2").unwrap();
//! let doc = transcode_str(&xml, &TranscodeOptions::default()).unwrap();
//! std::fs::write("output.svg", doc.svg).unwrap();
//! ```
//!
//! ## Example - PNG Export
//!
//! ```rust,ignore
//! use lbrn_export::convert::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! let converted = convert_file(Path::new("example.lbrn2"), None, &ConvertOptions::default()).unwrap();
//! println!("wrote {}", converted.output.display());
//! ```

pub mod batch;
pub mod convert;
pub mod error;
pub mod lbrn;
pub mod raster;
pub mod thumbnail;

// Re-export commonly used items
pub use batch::{BatchOptions, BatchReport, run_batch};
pub use convert::{ConvertOptions, Converted, OutputFormat, OutputSource, convert_file};
pub use error::{Error, Result};
pub use lbrn::{SvgDocument, TranscodeOptions, transcode, transcode_str};
