//! LightBurn native path geometry: `VertList` and `PrimList`.
//!
//! A vertex list looks like `V49 48c0x1c1x49c1y48V62 63`: each `V` carries a
//! position followed by optional Bézier control points (`c0*` leaves the
//! vertex, `c1*` arrives at it). A primitive list is either the keyword
//! `LineClosed` or a sequence such as `L0 1 B1 2` indexing into the vertices.

use super::xml::Element;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub c0x: Option<f64>,
    pub c0y: Option<f64>,
    pub c1x: Option<f64>,
    pub c1y: Option<f64>,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    fn leaving_control(&self) -> Option<(f64, f64)> {
        Some((self.c0x?, self.c0y?))
    }

    fn arriving_control(&self) -> Option<(f64, f64)> {
        Some((self.c1x?, self.c1y?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Line { start: usize, end: usize },
    Bezier { start: usize, end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimList {
    /// Every vertex joined by straight lines, then closed
    LineClosed,
    Explicit(Vec<Primitive>),
}

fn take_number(text: &str) -> (Option<f64>, &str) {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    (text[..end].parse().ok(), &text[end..])
}

fn parse_controls(mut rest: &str, vertex: &mut Vertex) {
    while let Some(pos) = rest.find('c') {
        rest = &rest[pos..];
        let slot = match rest.get(..3) {
            Some("c0x") => &mut vertex.c0x,
            Some("c0y") => &mut vertex.c0y,
            Some("c1x") => &mut vertex.c1x,
            Some("c1y") => &mut vertex.c1y,
            _ => {
                rest = &rest[1..];
                continue;
            }
        };
        let (value, tail) = take_number(&rest[3..]);
        if value.is_some() {
            *slot = value;
        }
        rest = tail;
    }
}

pub fn parse_vert_list(text: &str) -> Vec<Vertex> {
    let mut vertices = Vec::new();

    for chunk in text.split('V').skip(1) {
        let (x, rest) = take_number(chunk.trim_start());
        let (y, rest) = take_number(rest.trim_start());
        let (Some(x), Some(y)) = (x, y) else {
            warn!(vertex = chunk, "skipping vertex without a position");
            continue;
        };

        let mut vertex = Vertex::new(x, y);
        parse_controls(rest, &mut vertex);
        vertices.push(vertex);
    }

    vertices
}

pub fn parse_prim_list(text: &str) -> PrimList {
    let text = text.trim();
    if text == "LineClosed" {
        return PrimList::LineClosed;
    }

    let mut primitives = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(|c: char| c.is_ascii_alphabetic()) {
        let kind = rest.as_bytes()[start];
        let body = &rest[start + 1..];
        let end = body
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(body.len());
        let args: Vec<usize> = body[..end]
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();

        match (kind, args.as_slice()) {
            (b'L', [start, end, ..]) => primitives.push(Primitive::Line {
                start: *start,
                end: *end,
            }),
            (b'B', [start, end, ..]) => primitives.push(Primitive::Bezier {
                start: *start,
                end: *end,
            }),
            _ => {}
        }
        rest = &body[end..];
    }

    PrimList::Explicit(primitives)
}

fn line_closed(vertices: &[Vertex]) -> Option<String> {
    let (first, others) = vertices.split_first()?;
    let mut d = format!("M {} {}", first.x, first.y);
    for v in others {
        d.push_str(&format!(" L {} {}", v.x, v.y));
    }
    d.push_str(" Z");
    Some(d)
}

/// Build SVG path data from LightBurn vertices and primitives.
///
/// Returns `None` when nothing drawable remains.
pub fn path_data(vertices: &[Vertex], prims: &PrimList) -> Option<String> {
    let primitives = match prims {
        PrimList::LineClosed => return line_closed(vertices),
        PrimList::Explicit(p) if p.is_empty() || vertices.is_empty() => return None,
        PrimList::Explicit(p) => p,
    };

    let mut d = String::new();
    let mut first_idx: Option<usize> = None;
    let mut last_idx: Option<usize> = None;

    for prim in primitives {
        let (start, end) = match *prim {
            Primitive::Line { start, end } | Primitive::Bezier { start, end } => (start, end),
        };
        let (Some(p0), Some(p1)) = (vertices.get(start), vertices.get(end)) else {
            warn!(start, end, "primitive references a missing vertex");
            continue;
        };

        if first_idx.is_none() {
            d.push_str(&format!("M {} {}", p0.x, p0.y));
            first_idx = Some(start);
        } else if last_idx != Some(start) {
            d.push_str(&format!(" M {} {}", p0.x, p0.y));
        }

        let curve = match prim {
            Primitive::Bezier { .. } => p0.leaving_control().zip(p1.arriving_control()),
            Primitive::Line { .. } => None,
        };
        match curve {
            Some(((c0x, c0y), (c1x, c1y))) => d.push_str(&format!(
                " C {} {} {} {} {} {}",
                c0x, c0y, c1x, c1y, p1.x, p1.y
            )),
            None => d.push_str(&format!(" L {} {}", p1.x, p1.y)),
        }
        last_idx = Some(end);
    }

    if d.is_empty() {
        return None;
    }
    if first_idx.is_some() && first_idx == last_idx {
        d.push_str(" Z");
    }
    Some(d)
}

/// `VertID`/`PrimID` registry for one document.
///
/// LightBurn writes a list once and lets later shapes point at it by id.
#[derive(Debug, Default)]
pub struct GeometryCache {
    vertices: HashMap<String, Vec<Vertex>>,
    primitives: HashMap<String, PrimList>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn vertices_for(&mut self, element: &Element) -> Option<Vec<Vertex>> {
        let id = element.attr("VertID").filter(|id| !id.is_empty());
        match (element.child_text("VertList").filter(|t| !t.is_empty()), id) {
            (Some(text), id) => {
                let vertices = parse_vert_list(text);
                if let Some(id) = id {
                    self.vertices.insert(id.to_string(), vertices.clone());
                }
                Some(vertices)
            }
            (None, Some(id)) => {
                let cached = self.vertices.get(id).cloned();
                if cached.is_none() {
                    warn!(vert_id = id, "shape references an unknown VertID");
                }
                cached
            }
            (None, None) => None,
        }
    }

    fn primitives_for(&mut self, element: &Element) -> Option<PrimList> {
        let id = element.attr("PrimID").filter(|id| !id.is_empty());
        match (element.child_text("PrimList").filter(|t| !t.is_empty()), id) {
            (Some(text), id) => {
                let prims = parse_prim_list(text);
                if let Some(id) = id {
                    self.primitives.insert(id.to_string(), prims.clone());
                }
                Some(prims)
            }
            (None, Some(id)) => {
                let cached = self.primitives.get(id).cloned();
                if cached.is_none() {
                    warn!(prim_id = id, "shape references an unknown PrimID");
                }
                cached
            }
            (None, None) => None,
        }
    }

    /// Path data for a native `Shape Type="Path"`, registering its lists
    pub fn path_data(&mut self, element: &Element) -> Option<String> {
        let vertices = self.vertices_for(element);
        let prims = self.primitives_for(element);
        path_data(&vertices?, &prims?)
    }
}
