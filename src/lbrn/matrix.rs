//! Transform matrix resolution.

use super::lookup::Lookup::{Attr, Child};
use super::lookup::{Lookup, resolve};
use super::xml::Element;
use quick_xml::escape::escape;

const DISCRETE_KEYS: [&str; 6] = ["m11", "m12", "m21", "m22", "m31", "m32"];

const PACKED: &[Lookup] = &[Attr("Matrix"), Child("Matrix"), Child("XForm")];

/// Split a coordinate list on commas and whitespace
pub fn split_tokens(text: &str) -> Vec<&str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect()
}

fn format_matrix(parts: &[&str]) -> String {
    format!(
        "matrix({} {} {} {} {} {})",
        parts[0], parts[1], parts[2], parts[3], parts[4], parts[5]
    )
}

/// Resolve an SVG `matrix(a b c d e f)` for a shape, if it declares one
pub fn resolve_transform(element: &Element) -> Option<String> {
    let discrete: Vec<&str> = DISCRETE_KEYS
        .iter()
        .map_while(|key| element.attr(key))
        .collect();
    if discrete.len() == DISCRETE_KEYS.len() {
        return Some(format_matrix(&discrete));
    }

    let packed = split_tokens(resolve(element, PACKED)?);
    (packed.len() >= 6).then(|| format_matrix(&packed[..6]))
}

/// ` transform="..."` attribute text, or nothing
pub fn transform_attr(element: &Element) -> String {
    resolve_transform(element)
        .map(|t| format!(" transform=\"{}\"", escape(t.as_str())))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbrn::xml::parse_document;

    fn transform_of(xml: &str) -> Option<String> {
        resolve_transform(&parse_document(xml).unwrap())
    }

    #[test]
    fn test_discrete_attributes() {
        assert_eq!(
            transform_of(r#"<Rect m11="1" m12="0" m21="0" m22="1" m31="55" m32="-4.5"/>"#),
            Some("matrix(1 0 0 1 55 -4.5)".to_string())
        );
    }

    #[test]
    fn test_discrete_and_packed_agree() {
        let discrete = transform_of(r#"<Rect m11="2" m12="0.5" m21="0" m22="3" m31="10" m32="20"/>"#);
        let packed = transform_of(r#"<Rect Matrix="2,0.5,0,3,10,20"/>"#);
        assert_eq!(discrete, packed);
    }

    #[test]
    fn test_incomplete_discrete_falls_back_to_packed() {
        assert_eq!(
            transform_of(r#"<Rect m11="1" m12="0" m21="0" m22="1" m31="5" Matrix="1 0 0 1 7 8"/>"#),
            Some("matrix(1 0 0 1 7 8)".to_string())
        );
    }

    #[test]
    fn test_xform_child() {
        assert_eq!(
            transform_of("<Shape><XForm>1 0 0 1 55 55</XForm></Shape>"),
            Some("matrix(1 0 0 1 55 55)".to_string())
        );
    }

    #[test]
    fn test_empty_matrix_child_falls_through_to_xform() {
        assert_eq!(
            transform_of("<Shape><Matrix/><XForm>1,0,0,1,2,3,99</XForm></Shape>"),
            Some("matrix(1 0 0 1 2 3)".to_string())
        );
    }

    #[test]
    fn test_too_few_values_means_no_transform() {
        assert_eq!(transform_of(r#"<Rect Matrix="1 0 0 1 5"/>"#), None);
        assert_eq!(transform_of("<Rect/>"), None);
        assert_eq!(transform_attr(&parse_document("<Rect/>").unwrap()), "");
    }
}
