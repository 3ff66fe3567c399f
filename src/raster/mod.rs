//! SVG to PNG rasterization
//!
//! Rendering is an ordered chain of interchangeable [`Renderer`]s. The first
//! one that succeeds wins; if all of them fail, every failure is reported.

mod engine;
mod headless;

use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub use engine::{EngineRenderer, declared_size};
pub use headless::HeadlessRenderer;

/// Fixed surface size used when an SVG declares no intrinsic size
pub const FALLBACK_SIZE: (u32, u32) = (1000, 1000);

/// Largest surface a renderer will allocate, in pixels
pub const MAX_PIXELS: u64 = 100_000_000;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse SVG: {0}")]
    SvgParse(#[from] usvg::Error),
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Allocate a transparent surface, refusing sizes beyond [`MAX_PIXELS`]
pub(crate) fn new_pixmap(width: u32, height: u32) -> Result<tiny_skia::Pixmap, RenderError> {
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(RenderError::PixmapAlloc { width, height });
    }
    tiny_skia::Pixmap::new(width, height).ok_or(RenderError::PixmapAlloc { width, height })
}

/// One rasterization backend
pub trait Renderer {
    fn name(&self) -> &'static str;

    /// Render SVG text to PNG bytes
    fn render(&self, svg: &str) -> Result<Vec<u8>, RenderError>;
}

/// A renderer that failed, and why
#[derive(Debug)]
pub struct RenderFailure {
    pub renderer: &'static str,
    pub error: RenderError,
}

impl fmt::Display for RenderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.renderer, self.error)
    }
}

/// PNG bytes plus the name of the renderer that produced them
#[derive(Debug)]
pub struct Rendered {
    pub png: Vec<u8>,
    pub renderer: &'static str,
}

pub struct RasterChain {
    renderers: Vec<Box<dyn Renderer>>,
}

impl RasterChain {
    pub fn new(renderers: Vec<Box<dyn Renderer>>) -> Self {
        Self { renderers }
    }

    /// Engine first, then the headless loader. Relative image references
    /// resolve against `base_dir`.
    pub fn with_defaults(base_dir: &Path, fallback_size: (u32, u32)) -> Self {
        Self::new(vec![
            Box::new(EngineRenderer::new(fallback_size).with_resources_dir(base_dir)),
            Box::new(HeadlessRenderer::new(base_dir)),
        ])
    }

    pub fn renderer_names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    pub fn render(&self, svg: &str) -> Result<Rendered, Vec<RenderFailure>> {
        let mut failures = Vec::new();

        for renderer in &self.renderers {
            match renderer.render(svg) {
                Ok(png) => {
                    debug!(renderer = renderer.name(), bytes = png.len(), "rendered SVG");
                    return Ok(Rendered {
                        png,
                        renderer: renderer.name(),
                    });
                }
                Err(error) => {
                    warn!(renderer = renderer.name(), %error, "renderer failed, trying the next one");
                    failures.push(RenderFailure {
                        renderer: renderer.name(),
                        error,
                    });
                }
            }
        }

        Err(failures)
    }
}
