//! SVG emitters for the LightBurn shape vocabulary.
//!
//! Geometry values are copied into the output as the strings found in the
//! project, never re-formatted, so no precision is lost.

use super::lookup::Lookup::{Attr, Child};
use super::lookup::{Lookup, resolve, resolve_or};
use super::matrix::{split_tokens, transform_attr};
use super::style::resolve_style;
use super::xml::Element;
use quick_xml::escape::escape;

const RECT_X: &[Lookup] = &[Attr("X"), Attr("x"), Child("X")];
const RECT_Y: &[Lookup] = &[Attr("Y"), Attr("y"), Child("Y")];
const RECT_WIDTH: &[Lookup] = &[Attr("Width"), Child("Width"), Attr("W")];
const RECT_HEIGHT: &[Lookup] = &[Attr("Height"), Child("Height"), Attr("H")];

const ELLIPSE_CX: &[Lookup] = &[Attr("CX"), Attr("cx"), Child("CX")];
const ELLIPSE_CY: &[Lookup] = &[Attr("CY"), Attr("cy"), Child("CY")];
const ELLIPSE_RX: &[Lookup] = &[
    Attr("RX"),
    Attr("rx"),
    Child("RX"),
    Attr("RadiusX"),
    Attr("Rx"),
];
const ELLIPSE_RY: &[Lookup] = &[
    Attr("RY"),
    Attr("ry"),
    Child("RY"),
    Attr("RadiusY"),
    Attr("Ry"),
];

const LEGACY_PATH_DATA: &[Lookup] = &[
    Attr("D"),
    Attr("d"),
    Child("D"),
    Child("d"),
    Child("Path"),
];
pub(crate) const SHAPE_PATH_DATA: &[Lookup] = &[Attr("D"), Attr("d")];
const POINTS: &[Lookup] = &[Attr("Points"), Child("Points")];

const TEXT_CONTENT: &[Lookup] = &[Attr("Text"), Child("Text")];
const TEXT_X: &[Lookup] = &[Attr("X"), Child("X")];
const TEXT_Y: &[Lookup] = &[Attr("Y"), Child("Y")];

/// Whether a fragment paints as background raster or as vector content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Image,
    Vector,
}

/// One emitted SVG element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub markup: String,
}

impl Fragment {
    pub fn vector(markup: String) -> Self {
        Self {
            kind: FragmentKind::Vector,
            markup,
        }
    }

    pub fn image(markup: String) -> Self {
        Self {
            kind: FragmentKind::Image,
            markup,
        }
    }
}

pub fn rect(element: &Element) -> Fragment {
    let style = resolve_style(element).to_string();
    let x = resolve_or(element, RECT_X, "0");
    let y = resolve_or(element, RECT_Y, "0");
    let w = resolve_or(element, RECT_WIDTH, "0");
    let h = resolve_or(element, RECT_HEIGHT, "0");
    Fragment::vector(format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" style="{}"{} />"#,
        escape(x),
        escape(y),
        escape(w),
        escape(h),
        escape(&style),
        transform_attr(element)
    ))
}

pub fn ellipse(element: &Element) -> Fragment {
    let style = resolve_style(element).to_string();
    let cx = resolve_or(element, ELLIPSE_CX, "0");
    let cy = resolve_or(element, ELLIPSE_CY, "0");
    let rx = resolve_or(element, ELLIPSE_RX, "0");
    let ry = resolve_or(element, ELLIPSE_RY, "0");
    Fragment::vector(format!(
        r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" style="{}"{} />"#,
        escape(cx),
        escape(cy),
        escape(rx),
        escape(ry),
        escape(&style),
        transform_attr(element)
    ))
}

/// `<path>` from raw path data, styled and transformed by `element`
pub fn path(d: &str, element: &Element) -> Fragment {
    let style = resolve_style(element).to_string();
    Fragment::vector(format!(
        r#"<path d="{}" style="{}"{} />"#,
        escape(d),
        escape(&style),
        transform_attr(element)
    ))
}

/// Turn a flat `x,y x,y ...` point list into path data.
///
/// Needs at least two points; the path is closed when it ends where it began.
pub fn points_to_path(points: &str) -> Option<String> {
    let tokens = split_tokens(points);
    if tokens.len() < 4 {
        return None;
    }

    let pairs: Vec<(&str, &str)> = tokens.chunks_exact(2).map(|p| (p[0], p[1])).collect();
    let (first, rest) = pairs.split_first()?;

    let mut d = format!("M {} {}", first.0, first.1);
    for (x, y) in rest {
        d.push_str(&format!(" L {x} {y}"));
    }
    if pairs.last() == Some(first) {
        d.push_str(" Z");
    }
    Some(d)
}

/// `Polygon` / `Polyline` tags
pub fn polygon(element: &Element) -> Option<Fragment> {
    let d = points_to_path(resolve(element, POINTS)?)?;
    Some(path(&d, element))
}

/// Legacy `Path`, `SvgPath` and `Item` tags: path data, else a point list
pub fn legacy_path(element: &Element) -> Option<Fragment> {
    match resolve(element, LEGACY_PATH_DATA) {
        Some(d) => Some(path(d, element)),
        None => polygon(element),
    }
}

/// `Shape Type="Text"`: multi-line text centered on its origin
pub fn structured_text(element: &Element) -> Option<Fragment> {
    let text = element.attr("Str").filter(|s| !s.is_empty())?;

    let mut style = resolve_style(element);
    if let Some(size) = element.attr("H").filter(|s| !s.is_empty()) {
        style.set("font-size", format!("{size}px"));
    }
    if let Some(font) = element.attr("Font").filter(|s| !s.is_empty()) {
        let family = font.split(',').next().unwrap_or(font);
        style.set("font-family", family);
    }
    style.set("text-anchor", "middle");

    let mut markup = format!(
        r#"<text x="0" y="0" style="{}"{}>"#,
        escape(&style.to_string()),
        transform_attr(element)
    );
    for (i, line) in escape(text).split('\n').enumerate() {
        let dy = if i > 0 { "1.2em" } else { "0" };
        markup.push_str(&format!(r#"<tspan x="0" dy="{dy}">{line}</tspan>"#));
    }
    markup.push_str("</text>");

    Some(Fragment::vector(markup))
}

/// Legacy flat `Text` tag
pub fn legacy_text(element: &Element) -> Fragment {
    let style = resolve_style(element).to_string();
    let text = resolve_or(element, TEXT_CONTENT, "");
    let x = resolve_or(element, TEXT_X, "0");
    let y = resolve_or(element, TEXT_Y, "0");
    Fragment::vector(format!(
        r#"<text x="{}" y="{}" style="{}"{}>{}</text>"#,
        escape(x),
        escape(y),
        escape(&style),
        transform_attr(element),
        escape(text)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbrn::xml::parse_document;

    fn el(xml: &str) -> Element {
        parse_document(xml).unwrap()
    }

    #[test]
    fn test_rect_values_are_verbatim() {
        let frag = rect(&el(r#"<Rect X="1.250000" Y="-0.5" Width="100.0001" Height="3e2"/>"#));
        assert_eq!(frag.kind, FragmentKind::Vector);
        assert_eq!(
            frag.markup,
            r#"<rect x="1.250000" y="-0.5" width="100.0001" height="3e2" style="fill:none;stroke:#000;stroke-width:1" />"#
        );
    }

    #[test]
    fn test_rect_fallbacks() {
        let frag = rect(&el(
            r#"<Shape Type="Rect" W="20" H="10"><XForm>1 0 0 1 55 55</XForm></Shape>"#,
        ));
        assert_eq!(
            frag.markup,
            r#"<rect x="0" y="0" width="20" height="10" style="fill:none;stroke:#000;stroke-width:1" transform="matrix(1 0 0 1 55 55)" />"#
        );
    }

    #[test]
    fn test_rect_child_text_fields() {
        let frag = rect(&el("<Rect><X>4</X><Y>5</Y><Width>6</Width><Height>7</Height></Rect>"));
        assert!(frag.markup.starts_with(r#"<rect x="4" y="5" width="6" height="7""#));
    }

    #[test]
    fn test_ellipse_fallbacks() {
        let frag = ellipse(&el(r#"<Ellipse cx="5" CY="6" RadiusX="7" Ry="8"/>"#));
        assert!(frag.markup.starts_with(r#"<ellipse cx="5" cy="6" rx="7" ry="8""#));
    }

    #[test]
    fn test_points_to_path_closes() {
        assert_eq!(
            points_to_path("0,0 10,0 10,10 0,0").as_deref(),
            Some("M 0 0 L 10 0 L 10 10 L 0 0 Z")
        );
    }

    #[test]
    fn test_points_to_path_open_and_degenerate() {
        assert_eq!(
            points_to_path("0 0\n5 5\n9 1").as_deref(),
            Some("M 0 0 L 5 5 L 9 1")
        );
        assert_eq!(points_to_path("1,2 3"), None);
        assert_eq!(points_to_path(""), None);
    }

    #[test]
    fn test_path_data_is_escaped() {
        let frag = path("M 0 0 L \"1\" <2>", &el("<Path/>"));
        assert!(frag.markup.starts_with(r#"<path d="M 0 0 L &quot;1&quot; &lt;2&gt;""#));
    }

    #[test]
    fn test_legacy_path_prefers_data_over_points() {
        let frag = legacy_path(&el(r#"<Path Points="0,0 1,1"><d>M 5 5</d></Path>"#)).unwrap();
        assert!(frag.markup.starts_with(r#"<path d="M 5 5""#));

        let frag = legacy_path(&el(r#"<Item Points="0,0 1,1"/>"#)).unwrap();
        assert!(frag.markup.starts_with(r#"<path d="M 0 0 L 1 1""#));

        assert!(legacy_path(&el("<Item/>")).is_none());
    }

    #[test]
    fn test_structured_text_multi_line() {
        let frag = structured_text(&el(
            r#"<Shape Type="Text" Str="Hello&#10;A &amp; B" H="12" Font="Arial,-1,100,5,50,0,0,0,0,0"/>"#,
        ))
        .unwrap();
        assert_eq!(
            frag.markup,
            concat!(
                r#"<text x="0" y="0" style="fill:none;stroke:#000;stroke-width:1;font-size:12px;font-family:Arial;text-anchor:middle">"#,
                r#"<tspan x="0" dy="0">Hello</tspan>"#,
                r#"<tspan x="0" dy="1.2em">A &amp; B</tspan>"#,
                "</text>"
            )
        );
    }

    #[test]
    fn test_structured_text_without_content() {
        assert!(structured_text(&el(r#"<Shape Type="Text"/>"#)).is_none());
    }

    #[test]
    fn test_legacy_text() {
        let frag = legacy_text(&el(r##"<Text X="3" Color="#f00"><Text>a &lt; b</Text></Text>"##));
        assert_eq!(
            frag.markup,
            r##"<text x="3" y="0" style="stroke:#f00;fill:none">a &lt; b</text>"##
        );
    }
}
