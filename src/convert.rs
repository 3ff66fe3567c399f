//! Single-file conversion flow.

use crate::error::{Error, Result};
use crate::lbrn::svg::{MIN_OUTPUT_SIZE, SvgDocument, TranscodeOptions, transcode};
use crate::lbrn::{ImageMode, parse_document};
use crate::raster::{FALLBACK_SIZE, RasterChain};
use crate::lbrn::XmlError;
use crate::thumbnail::{ThumbnailError, ThumbnailMode, decode_thumbnail, thumbnail_png};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub format: OutputFormat,
    /// Write embedded bitmaps next to the output instead of inlining them
    pub sibling_images: bool,
    pub min_output_size: Option<f64>,
    pub thumbnail: ThumbnailMode,
    /// Raster size for SVGs without a declared size
    pub fallback_size: (u32, u32),
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            sibling_images: false,
            min_output_size: Some(MIN_OUTPUT_SIZE),
            thumbnail: ThumbnailMode::Raw,
            fallback_size: FALLBACK_SIZE,
        }
    }
}

impl ConvertOptions {
    fn transcode_options(&self, output: &Path) -> TranscodeOptions {
        let images = if self.sibling_images {
            ImageMode::SiblingFiles {
                dir: parent_dir(output).to_path_buf(),
                prefix: file_stem(output),
            }
        } else {
            ImageMode::Inline
        };
        TranscodeOptions {
            images,
            min_output_size: self.min_output_size,
        }
    }
}

/// What the written output was made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// Transcoded shapes; `renderer` is set for PNG output
    Vector { renderer: Option<&'static str> },
    Thumbnail,
}

#[derive(Debug, Clone)]
pub struct Converted {
    pub output: PathBuf,
    pub source: OutputSource,
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// `input` with the format's extension
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    input.with_extension(format.extension())
}

/// Replace the extension of `output` unless it already matches `format`
pub fn coerce_extension(output: &Path, format: OutputFormat) -> PathBuf {
    let matches = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
    if matches {
        output.to_path_buf()
    } else {
        output.with_extension(format.extension())
    }
}

/// Read and transcode a project file
///
/// Unreadable files are [`Error::Io`]; content that is not UTF-8 is an
/// [`Error::Parse`] positioned at the first invalid byte.
pub fn transcode_file(input: &Path, options: &TranscodeOptions) -> Result<SvgDocument> {
    let bytes = fs::read(input).map_err(|source| Error::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let xml = String::from_utf8(bytes).map_err(|e| Error::Parse {
        path: input.to_path_buf(),
        source: XmlError::new(e.utf8_error().valid_up_to() as u64, "invalid UTF-8"),
    })?;
    let root = parse_document(&xml).map_err(|source| Error::Parse {
        path: input.to_path_buf(),
        source,
    })?;
    transcode(&root, options)
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Convert one project to SVG or PNG.
///
/// Recognized shapes win; a project without any falls back to its embedded
/// thumbnail, and one with neither fails with [`Error::NoContent`].
pub fn convert_file(input: &Path, output: Option<&Path>, options: &ConvertOptions) -> Result<Converted> {
    let output = match output {
        Some(path) => coerce_extension(path, options.format),
        None => default_output_path(input, options.format),
    };
    let out_dir = parent_dir(&output);
    fs::create_dir_all(out_dir).map_err(|source| Error::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let doc = transcode_file(input, &options.transcode_options(&output))?;

    let source = if doc.has_elements {
        match options.format {
            OutputFormat::Svg => {
                write(&output, doc.svg.as_bytes())?;
                OutputSource::Vector { renderer: None }
            }
            OutputFormat::Png => {
                let chain = RasterChain::with_defaults(out_dir, options.fallback_size);
                let rendered = chain
                    .render(&doc.svg)
                    .map_err(|failures| Error::RenderUnavailable { failures })?;
                write(&output, &rendered.png)?;
                OutputSource::Vector {
                    renderer: Some(rendered.renderer),
                }
            }
        }
    } else if let Some(b64) = doc.thumbnail.as_deref() {
        let thumbnail_error = |source: ThumbnailError| Error::ThumbnailDecode {
            path: input.to_path_buf(),
            source,
        };
        match options.format {
            OutputFormat::Png => {
                let png = thumbnail_png(b64, options.thumbnail).map_err(thumbnail_error)?;
                write(&output, &png)?;
            }
            OutputFormat::Svg => {
                decode_thumbnail(b64).map_err(thumbnail_error)?;
                let svg = doc.thumbnail_svg().unwrap_or_default();
                write(&output, svg.as_bytes())?;
            }
        }
        OutputSource::Thumbnail
    } else {
        return Err(Error::NoContent {
            path: input.to_path_buf(),
        });
    };

    info!(input = %input.display(), output = %output.display(), ?source, "converted");
    Ok(Converted { output, source })
}
