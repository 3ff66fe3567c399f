use super::lookup::Lookup::{Attr, Child};
use super::lookup::{Lookup, resolve};
use super::xml::Element;
use std::fmt;

const STROKE: &[Lookup] = &[Attr("Color"), Attr("colour"), Child("Color")];
const STROKE_WIDTH: &[Lookup] = &[Attr("StrokeWidth"), Child("StrokeWidth")];
const FILL: &[Lookup] = &[Attr("Fill"), Child("Fill")];

const HIDDEN_FILLS: [&str; 3] = ["none", "false", "0"];

/// Ordered CSS-like `property:value` list for the SVG `style` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    properties: Vec<(&'static str, String)>,
}

impl Style {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its position if it already exists
    pub fn set(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.properties.push((key, value)),
        }
    }

    pub fn set_default(&mut self, key: &'static str, value: impl Into<String>) {
        if self.get(key).is_none() {
            self.properties.push((key, value.into()));
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}:{value}")?;
        }
        Ok(())
    }
}

/// Derive the stroke/fill style of a shape element.
///
/// A shape with neither a stroke color nor a visible fill gets a black
/// 1-unit stroke so it still shows up in the output.
pub fn resolve_style(element: &Element) -> Style {
    let mut style = Style::default();

    if let Some(color) = resolve(element, STROKE) {
        style.set("stroke", color);
    }
    if let Some(width) = resolve(element, STROKE_WIDTH) {
        style.set("stroke-width", width);
    }

    match resolve(element, FILL) {
        Some(fill) if !HIDDEN_FILLS.contains(&fill.to_ascii_lowercase().as_str()) => {
            style.set("fill", fill);
        }
        _ => style.set_default("fill", "none"),
    }

    if style.get("stroke").is_none() && style.get("fill") == Some("none") {
        style.set("stroke", "#000");
        style.set_default("stroke-width", "1");
    }

    style
}
