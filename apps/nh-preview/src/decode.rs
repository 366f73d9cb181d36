//! Byte decoding for documents and images.

use encoding_rs::Encoding;
use image::GenericImageView;
use nh_core::RenderError;
use nh_core::RenderResult;

const MAX_IMAGE_PIXELS: usize = 16 * 1024 * 1024;
const CHARSET_SNIFF_BYTES: usize = 8192;

/// RGBA8 pixels of a decoded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Decodes an HTML file honouring a `<meta charset>` in its prefix,
/// falling back to UTF-8.
pub fn decode_html(body: &[u8]) -> String {
    if let Some(encoding) =
        parse_charset_from_html_prefix(body).and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let (decoded, _, _) = encoding_rs::UTF_8.decode(body);
    decoded.into_owned()
}

/// Decodes raster or SVG bytes. `uri` names the resource in errors and
/// hints at SVG content through its extension.
pub fn decode_image(uri: &str, body: &[u8]) -> RenderResult<DecodedImage> {
    if is_svg_candidate(uri, body) {
        return decode_svg(uri, body);
    }

    let decoded = image::load_from_memory(body).map_err(|error| decode_failed(uri, error))?;
    let (width, height) = decoded.dimensions();
    let width = usize::try_from(width).map_err(|error| decode_failed(uri, error))?;
    let height = usize::try_from(height).map_err(|error| decode_failed(uri, error))?;
    check_pixels(uri, width, height)?;

    Ok(DecodedImage {
        width,
        height,
        rgba: decoded.to_rgba8().into_raw(),
    })
}

fn decode_svg(uri: &str, body: &[u8]) -> RenderResult<DecodedImage> {
    let options = resvg::usvg::Options::default();
    let tree =
        resvg::usvg::Tree::from_data(body, &options).map_err(|error| decode_failed(uri, error))?;
    let size = tree.size().to_int_size();
    let width = usize::try_from(size.width()).map_err(|error| decode_failed(uri, error))?;
    let height = usize::try_from(size.height()).map_err(|error| decode_failed(uri, error))?;
    check_pixels(uri, width, height)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| decode_failed(uri, "failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        width,
        height,
        rgba: pixmap.data().to_vec(),
    })
}

fn check_pixels(uri: &str, width: usize, height: usize) -> RenderResult<()> {
    match width.checked_mul(height) {
        Some(pixels) if pixels > 0 && pixels <= MAX_IMAGE_PIXELS => Ok(()),
        _ => Err(RenderError::resource(
            "preview.img.too_large",
            uri,
            format!("image of {width}x{height} pixels is not supported"),
        )),
    }
}

fn decode_failed(uri: &str, error: impl std::fmt::Display) -> RenderError {
    RenderError::resource("preview.img.decode_failed", uri, error.to_string())
}

fn is_svg_candidate(path_hint: &str, body: &[u8]) -> bool {
    path_hint.to_ascii_lowercase().ends_with(".svg") || looks_like_svg_document(body)
}

fn looks_like_svg_document(body: &[u8]) -> bool {
    let bytes = body.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(body);
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let bytes = bytes.get(start..).unwrap_or_default();

    if bytes.starts_with(b"<svg") {
        return true;
    }
    bytes.starts_with(b"<?xml") && bytes.windows(4).any(|window| window == b"<svg")
}

fn parse_charset_from_html_prefix(body: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(body.get(..CHARSET_SNIFF_BYTES).unwrap_or(body));
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower.get(search_start..)?.find("charset=") {
        let charset_start = search_start + relative + "charset=".len();
        if let Some(label) = prefix.get(charset_start..).and_then(parse_charset_label) {
            return Some(label);
        }
        search_start = charset_start;
    }

    None
}

fn parse_charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = trimmed.get(first.len_utf8()..)?;
        rest.get(..rest.find(first)?)?
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        trimmed.get(..end)?
    };

    let label = label.trim();
    (!label.is_empty()).then(|| label.to_owned())
}
