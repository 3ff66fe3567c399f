//! Embedded bitmap handling.

use super::lookup::Lookup::{Attr, Child};
use super::lookup::{Lookup, resolve, resolve_or};
use super::matrix::transform_attr;
use super::shapes::Fragment;
use super::xml::Element;
use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::escape;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

const DATA: &[Lookup] = &[Attr("Data"), Child("Data")];
const WIDTH: &[Lookup] = &[Attr("Width"), Child("Width"), Attr("W")];
const HEIGHT: &[Lookup] = &[Attr("Height"), Child("Height"), Attr("H")];

/// How embedded bitmaps end up in the SVG
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// `data:` URI inside the `<image>` element; the SVG is self-contained
    #[default]
    Inline,
    /// Decoded into `<dir>/<prefix>_<index>.<ext>` and referenced by file name
    SiblingFiles { dir: PathBuf, prefix: String },
}

/// Raster format sniffed from magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// PNG unless the bytes carry a JPEG signature
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(b"\x89PNG") {
            ImageFormat::Png
        } else if bytes.starts_with(b"\xff\xd8\xff") {
            ImageFormat::Jpeg
        } else {
            ImageFormat::Png
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }
}

/// Base64 payload with all whitespace removed
pub fn compact_base64(text: &str) -> String {
    text.split_whitespace().collect()
}

fn data_uri(payload: &str, format: ImageFormat) -> String {
    format!("data:{};base64,{}", format.mime(), payload)
}

/// Emit an `<image>` for a bitmap shape. `index` is the document-wide image
/// counter; it only names files in [`ImageMode::SiblingFiles`] mode.
pub fn embed_image(element: &Element, mode: &ImageMode, index: usize) -> Result<Option<Fragment>> {
    let Some(data) = resolve(element, DATA) else {
        return Ok(None);
    };
    let payload = compact_base64(data);
    let decoded = STANDARD.decode(&payload);

    let href = match (mode, decoded) {
        (ImageMode::Inline, Ok(bytes)) => data_uri(&payload, ImageFormat::sniff(&bytes)),
        (ImageMode::Inline, Err(_)) => data_uri(&payload, ImageFormat::Png),
        (ImageMode::SiblingFiles { dir, prefix }, Ok(bytes)) => {
            let format = ImageFormat::sniff(&bytes);
            let name = format!("{prefix}_{index}.{}", format.extension());
            let path = dir.join(&name);
            fs::write(&path, &bytes).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "wrote embedded image");
            name
        }
        (ImageMode::SiblingFiles { .. }, Err(err)) => {
            warn!(index, error = %err, "embedded image is not valid base64, inlining it");
            data_uri(&payload, ImageFormat::Png)
        }
    };

    let x = element.attr("X").filter(|v| !v.is_empty()).unwrap_or("0");
    let y = element.attr("Y").filter(|v| !v.is_empty()).unwrap_or("0");
    let w = resolve_or(element, WIDTH, "auto");
    let h = resolve_or(element, HEIGHT, "auto");

    Ok(Some(Fragment::image(format!(
        r#"<image href="{}" x="{}" y="{}" width="{}" height="{}"{} />"#,
        escape(&href),
        escape(x),
        escape(y),
        escape(w),
        escape(h),
        transform_attr(element)
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbrn::shapes::FragmentKind;
    use crate::lbrn::xml::parse_document;

    const PNG_MAGIC_B64: &str = "iVBORw0KGgo="; // \x89PNG\r\n\x1a\n
    const JPEG_MAGIC_B64: &str = "/9j/4AAQ"; // \xff\xd8\xff\xe0\x00\x10

    #[test]
    fn test_sniff() {
        assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n"), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(b"\xff\xd8\xff\xe0"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff(b"GIF89a"), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(b""), ImageFormat::Png);
    }

    #[test]
    fn test_inline_png() {
        let el = parse_document(&format!(
            r#"<Image X="5" Width="10" Height="20" Data="{PNG_MAGIC_B64}"/>"#
        ))
        .unwrap();
        let frag = embed_image(&el, &ImageMode::Inline, 0).unwrap().unwrap();
        assert_eq!(frag.kind, FragmentKind::Image);
        assert_eq!(
            frag.markup,
            format!(
                r#"<image href="data:image/png;base64,{PNG_MAGIC_B64}" x="5" y="0" width="10" height="20" />"#
            )
        );
    }

    #[test]
    fn test_inline_jpeg_from_child_with_whitespace() {
        let el = parse_document("<Image><Data>\n  /9j/\n  4AAQ\n</Data></Image>").unwrap();
        let frag = embed_image(&el, &ImageMode::Inline, 0).unwrap().unwrap();
        assert!(
            frag.markup
                .contains(&format!("data:image/jpeg;base64,{JPEG_MAGIC_B64}"))
        );
        assert!(frag.markup.contains(r#"width="auto" height="auto""#));
    }

    #[test]
    fn test_undecodable_payload_defaults_to_png() {
        let el = parse_document(r#"<Image Data="not base64!"/>"#).unwrap();
        let frag = embed_image(&el, &ImageMode::Inline, 0).unwrap().unwrap();
        assert!(frag.markup.contains("data:image/png;base64,notbase64!"));
    }

    #[test]
    fn test_missing_data_emits_nothing() {
        let el = parse_document(r#"<Image Width="3"/>"#).unwrap();
        assert!(embed_image(&el, &ImageMode::Inline, 0).unwrap().is_none());
    }

    #[test]
    fn test_sibling_file_written() {
        let dir = tempfile::tempdir().unwrap();
        let mode = ImageMode::SiblingFiles {
            dir: dir.path().to_path_buf(),
            prefix: "doc".to_string(),
        };
        let el = parse_document(&format!(r#"<Image Data="{JPEG_MAGIC_B64}"/>"#)).unwrap();
        let frag = embed_image(&el, &mode, 3).unwrap().unwrap();
        assert!(frag.markup.starts_with(r#"<image href="doc_3.jpg""#));
        let written = fs::read(dir.path().join("doc_3.jpg")).unwrap();
        assert_eq!(written, b"\xff\xd8\xff\xe0\x00\x10");
    }
}
