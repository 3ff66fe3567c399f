//! Ordered field lookups across attribute and child-text spellings.

use super::xml::Element;

/// One place a field value may live on a shape element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Attr(&'static str),
    Child(&'static str),
}

impl Lookup {
    fn read(self, element: &Element) -> Option<&str> {
        match self {
            Lookup::Attr(name) => element.attr(name),
            Lookup::Child(name) => element.child_text(name),
        }
    }
}

/// First non-empty value among `candidates`, tried in order
pub fn resolve<'a>(element: &'a Element, candidates: &[Lookup]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|candidate| candidate.read(element))
        .find(|value| !value.is_empty())
}

pub fn resolve_or<'a>(element: &'a Element, candidates: &[Lookup], default: &'a str) -> &'a str {
    resolve(element, candidates).unwrap_or(default)
}
