//! Shape discovery and dispatch over the project tree.

use super::image::{ImageMode, embed_image};
use super::lookup::resolve;
use super::shapes::{self, Fragment, SHAPE_PATH_DATA};
use super::vertices::GeometryCache;
use super::xml::Element;
use crate::error::Result;
use tracing::debug;

/// Elements whose subtrees hold the drawable shapes, in priority order
pub const CONTAINER_NAMES: [&str; 6] = ["Shapes", "Items", "Children", "Objects", "Root", "Document"];

/// Which emitter handles an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Ellipse,
    /// `Shape Type="Text"` with `Str`, `H` and `Font`
    StructuredText,
    /// Flat `Text` tag
    LegacyText,
    Bitmap,
    /// `Shape Type="Path"`: inline data or native vertex geometry
    ShapePath,
    /// `Path`, `SvgPath` and `Item` tags
    LegacyPath,
    Polygon,
}

impl ShapeKind {
    pub fn classify(element: &Element) -> Option<Self> {
        let tag = element.name.to_ascii_lowercase();
        if tag == "shape" {
            let kind = element.attr("Type").unwrap_or_default().to_ascii_lowercase();
            return match kind.as_str() {
                "rect" | "rectangle" => Some(ShapeKind::Rect),
                "ellipse" | "circle" => Some(ShapeKind::Ellipse),
                "text" => Some(ShapeKind::StructuredText),
                "bitmap" => Some(ShapeKind::Bitmap),
                "path" => Some(ShapeKind::ShapePath),
                _ => None,
            };
        }

        match tag.as_str() {
            "path" | "svgpath" | "item" => Some(ShapeKind::LegacyPath),
            "polygon" | "polyline" => Some(ShapeKind::Polygon),
            "rect" | "rectangle" => Some(ShapeKind::Rect),
            "ellipse" | "circle" => Some(ShapeKind::Ellipse),
            "text" => Some(ShapeKind::LegacyText),
            "image" => Some(ShapeKind::Bitmap),
            _ => None,
        }
    }
}

fn container_rank(element: &Element) -> Option<usize> {
    CONTAINER_NAMES.iter().position(|name| *name == element.name)
}

/// Subtrees to walk: every container below `root`, grouped by container
/// name then document order, or `root` itself when there are none.
///
/// A container nested in another one is a root of its own, so its shapes
/// are emitted once per enclosing root.
pub fn walk_roots(root: &Element) -> Vec<&Element> {
    let mut found: Vec<&Element> = root
        .descendants()
        .filter(|e| container_rank(e).is_some())
        .collect();
    if found.is_empty() {
        return vec![root];
    }
    found.sort_by_key(|e| container_rank(e).unwrap_or(usize::MAX));
    found
}

/// Per-document conversion state
pub struct WalkContext<'m> {
    mode: &'m ImageMode,
    image_count: usize,
    geometry: GeometryCache,
    fragments: Vec<Fragment>,
}

impl<'m> WalkContext<'m> {
    pub fn new(mode: &'m ImageMode) -> Self {
        Self {
            mode,
            image_count: 0,
            geometry: GeometryCache::new(),
            fragments: Vec::new(),
        }
    }

    /// Convert `element` and its whole subtree, in pre-order
    pub fn visit(&mut self, element: &Element) -> Result<()> {
        if let Some(kind) = ShapeKind::classify(element) {
            if let Some(fragment) = self.emit(kind, element)? {
                debug!(?kind, tag = %element.name, "emitted shape");
                self.fragments.push(fragment);
            }
        }
        for child in &element.children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn emit(&mut self, kind: ShapeKind, element: &Element) -> Result<Option<Fragment>> {
        let fragment = match kind {
            ShapeKind::Rect => Some(shapes::rect(element)),
            ShapeKind::Ellipse => Some(shapes::ellipse(element)),
            ShapeKind::StructuredText => shapes::structured_text(element),
            ShapeKind::LegacyText => Some(shapes::legacy_text(element)),
            ShapeKind::LegacyPath => shapes::legacy_path(element),
            ShapeKind::Polygon => shapes::polygon(element),
            ShapeKind::ShapePath => match resolve(element, SHAPE_PATH_DATA) {
                Some(d) => Some(shapes::path(d, element)),
                None => self
                    .geometry
                    .path_data(element)
                    .map(|d| shapes::path(&d, element)),
            },
            ShapeKind::Bitmap => {
                let fragment = embed_image(element, self.mode, self.image_count)?;
                if fragment.is_some() {
                    self.image_count += 1;
                }
                fragment
            }
        };
        Ok(fragment)
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

/// Walk every shape container of a document and collect its fragments
pub fn collect_fragments(root: &Element, mode: &ImageMode) -> Result<Vec<Fragment>> {
    let mut ctx = WalkContext::new(mode);
    for node in walk_roots(root) {
        ctx.visit(node)?;
    }
    Ok(ctx.into_fragments())
}
