//! Markup reader producing typed document trees.

use nh_css::parse_inline_style;
use nh_dom::Document;
use nh_dom::DocumentMetadata;
use nh_dom::DocumentNode;
use nh_dom::NodeKind;

/// Parses raw HTML into a [`Document`].
///
/// The reader is lenient: malformed markup never fails, and end tags with no
/// matching open element are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let tokens = tokenize(input);
        let token_count = tokens.len();
        let mut root = build_tree(tokens);

        let mut metadata = DocumentMetadata::default();
        collect_metadata(&root, &mut metadata);
        prune_non_rendered(&mut root);

        tracing::debug!(
            tokens = token_count,
            children = root.children.len(),
            title = metadata.title.as_deref().unwrap_or(""),
            "parsed document"
        );

        Document { root, metadata }
    }
}

#[derive(Debug)]
enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if starts_with(bytes, i, b"<!--") {
            i = skip_comment(bytes, i);
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with(bytes, i, b"</") {
                if let Some((tok, next)) = parse_end_tag(bytes, i) {
                    out.push(tok);
                    i = next;
                    continue;
                }
            } else if starts_with(bytes, i, b"<!") || starts_with(bytes, i, b"<?") {
                i = skip_decl(bytes, i);
                continue;
            } else if let Some((tok, next)) = parse_start_tag(bytes, i) {
                let raw_text_tag = match &tok {
                    Token::Start {
                        name, self_closing, ..
                    } if !*self_closing && is_raw_text_tag(name) => Some(name.clone()),
                    _ => None,
                };

                out.push(tok);
                i = next;

                if let Some(tag_name) = raw_text_tag {
                    let (raw_text, closing_end) = read_raw_text_until_end_tag(bytes, i, &tag_name);
                    if !raw_text.is_empty() {
                        out.push(Token::Text(raw_text));
                    }
                    out.push(Token::End { name: tag_name });
                    i = closing_end.unwrap_or(bytes.len());
                }

                continue;
            }
        }

        let (text, next) = read_text(bytes, i);
        if !text.is_empty() {
            out.push(Token::Text(text));
        }
        i = next.max(i.saturating_add(1));
    }

    out
}

fn build_tree(tokens: Vec<Token>) -> DocumentNode {
    let mut stack = vec![DocumentNode::element("document")];

    for token in tokens {
        match token {
            Token::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    push_text(current, &decode_entities(&text));
                }
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let element = make_element(&name, attrs);
                if self_closing || is_void(&name) {
                    if let Some(current) = stack.last_mut() {
                        current.children.push(element);
                    }
                } else {
                    stack.push(element);
                }
            }
            Token::End { name } => {
                let is_open = stack
                    .iter()
                    .skip(1)
                    .any(|node| node.tag_name() == Some(name.as_str()));
                if !is_open {
                    continue;
                }
                while stack.len() > 1 {
                    let Some(node) = stack.pop() else {
                        break;
                    };
                    let matched = node.tag_name() == Some(name.as_str());
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(close_element(node));
                    }
                    if matched {
                        break;
                    }
                }
            }
        }
    }

    while stack.len() > 1 {
        let Some(node) = stack.pop() else {
            break;
        };
        if let Some(parent) = stack.last_mut() {
            parent.children.push(close_element(node));
        }
    }

    stack
        .pop()
        .unwrap_or_else(|| DocumentNode::element("document"))
}

fn make_element(name: &str, attrs: Vec<(String, String)>) -> DocumentNode {
    let mut element = DocumentNode::element(name);
    for (key, value) in attrs {
        element.attributes.insert(key, value);
    }
    if let Some(style) = element.attribute("style") {
        element.style = parse_inline_style(style);
    }
    element
}

/// An anchor wrapping block content is itself a block.
fn close_element(mut node: DocumentNode) -> DocumentNode {
    let wraps_block = node
        .children
        .iter()
        .any(|child| child.kind == NodeKind::Block);
    if node.kind == NodeKind::Phrasing && node.tag_name() == Some("a") && wraps_block {
        node.kind = NodeKind::Block;
    }
    node
}

fn push_text(parent: &mut DocumentNode, text: &str) {
    if parent.tag_name().is_some_and(is_raw_text_tag) {
        parent.children.push(DocumentNode::text(text));
        return;
    }

    // Whitespace between inline siblings separates words; anywhere else in
    // a block it is insignificant.
    let collapsed = collapse_whitespace(text);
    let after_inline = parent
        .children
        .last()
        .is_some_and(|last| last.kind != NodeKind::Block);
    if collapsed.trim().is_empty() && parent.kind == NodeKind::Block && !after_inline {
        return;
    }
    parent.children.push(DocumentNode::text(collapsed));
}

fn collect_metadata(node: &DocumentNode, out: &mut DocumentMetadata) {
    match node.tag_name() {
        Some("title") if out.title.is_none() => {
            let title = node.text_content().trim().to_owned();
            if !title.is_empty() {
                out.title = Some(title);
            }
        }
        Some("base") => {
            if out.base_url.is_none() {
                out.base_url = non_empty(node.attribute("href"));
            }
            if out.base_target.is_none() {
                out.base_target = non_empty(node.attribute("target"));
            }
        }
        Some("html") if out.lang.is_none() => {
            out.lang = non_empty(node.attribute("lang"));
        }
        _ => {}
    }

    for child in &node.children {
        collect_metadata(child, out);
    }
}

fn prune_non_rendered(node: &mut DocumentNode) {
    node.children.retain(|child| {
        !matches!(
            child.tag_name(),
            Some("head" | "script" | "style" | "noscript" | "template")
        )
    });
    for child in &mut node.children {
        prune_non_rendered(child);
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut ws = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !ws {
                out.push(' ');
                ws = true;
            }
        } else {
            out.push(ch);
            ws = false;
        }
    }
    out
}

fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(rel_amp) = input[cursor..].find('&') {
        let amp = cursor + rel_amp;
        out.push_str(&input[cursor..amp]);

        let rest = &input[(amp + 1)..];
        let Some(rel_semi) = rest.find(';') else {
            out.push('&');
            cursor = amp + 1;
            continue;
        };

        let semi = amp + 1 + rel_semi;
        let entity = &input[(amp + 1)..semi];
        if let Some(decoded) = decode_entity(entity) {
            out.push(decoded);
            cursor = semi + 1;
        } else {
            out.push('&');
            cursor = amp + 1;
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                char::from_u32(u32::from_str_radix(hex, 16).ok()?)
            } else if let Some(dec) = entity.strip_prefix('#') {
                char::from_u32(dec.parse::<u32>().ok()?)
            } else {
                None
            }
        }
    }
}

fn starts_with(bytes: &[u8], i: usize, pat: &[u8]) -> bool {
    let end = i.saturating_add(pat.len());
    end <= bytes.len() && &bytes[i..end] == pat
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    let mut i = start.saturating_add(4);
    while i + 2 < bytes.len() {
        if bytes[i] == b'-' && bytes[i + 1] == b'-' && bytes[i + 2] == b'>' {
            return i + 3;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_decl(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i < bytes.len() {
        if bytes[i] == b'>' {
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn read_text(bytes: &[u8], start: usize) -> (String, usize) {
    // A stray `<` that failed to parse as a tag is kept as text.
    let mut i = if bytes.get(start) == Some(&b'<') {
        start + 1
    } else {
        start
    };
    while i < bytes.len() && bytes[i] != b'<' {
        i += 1;
    }
    (String::from_utf8_lossy(&bytes[start..i]).to_string(), i)
}

fn read_raw_text_until_end_tag(
    bytes: &[u8],
    start: usize,
    tag_name: &str,
) -> (String, Option<usize>) {
    let tag_bytes = tag_name.as_bytes();
    let mut i = start;

    while i < bytes.len() {
        if bytes[i] != b'<' || i + 2 + tag_bytes.len() > bytes.len() || bytes[i + 1] != b'/' {
            i = i.saturating_add(1);
            continue;
        }

        let name_start = i + 2;
        let name_end = name_start + tag_bytes.len();
        if !bytes[name_start..name_end].eq_ignore_ascii_case(tag_bytes) {
            i = i.saturating_add(1);
            continue;
        }

        let mut close = name_end;
        while close < bytes.len() && bytes[close].is_ascii_whitespace() {
            close = close.saturating_add(1);
        }

        if close < bytes.len() && bytes[close] == b'>' {
            let text = String::from_utf8_lossy(&bytes[start..i]).to_string();
            return (text, Some(close + 1));
        }

        i = i.saturating_add(1);
    }

    (String::from_utf8_lossy(&bytes[start..]).to_string(), None)
}

fn parse_end_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut i = start + 2;
    skip_spaces(bytes, &mut i);
    let begin = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    if i == begin {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..i]).to_ascii_lowercase();
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }

    Some((Token::End { name }, i + 1))
}

fn parse_start_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut i = start + 1;
    let begin = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    if i == begin {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..i]).to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        skip_spaces(bytes, &mut i);
        if i >= bytes.len() {
            return None;
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' {
            self_closing = true;
            i += 1;
            continue;
        }

        let a_start = i;
        while i < bytes.len() && is_name_char(bytes[i]) {
            i += 1;
        }
        if i == a_start {
            // Garbage inside the tag: skip to its end.
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            if i < bytes.len() {
                i += 1;
            }
            break;
        }

        let a_name = String::from_utf8_lossy(&bytes[a_start..i]).to_ascii_lowercase();
        skip_spaces(bytes, &mut i);

        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_spaces(bytes, &mut i);
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                i += 1;
                let v_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = String::from_utf8_lossy(&bytes[v_start..i]).to_string();
                if i < bytes.len() {
                    i += 1;
                }
            } else {
                let v_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                value = String::from_utf8_lossy(&bytes[v_start..i]).to_string();
            }
        }

        attrs.push((a_name, decode_entities(&value)));
    }

    Some((
        Token::Start {
            name,
            attrs,
            self_closing,
        },
        i,
    ))
}

fn skip_spaces(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;
    use super::decode_entities;
    use nh_css::Length;
    use nh_css::ObjectFit;
    use nh_dom::NodeKind;

    #[test]
    fn parses_image_with_attributes_and_inline_style() {
        let doc = HtmlParser.parse(
            r#"<img
  width="1200" height="800"
  style="object-fit: contain; width: 50%; height: 100px; align-self: center;"
  src="http://placeimg.com/1200/800/animals"
/>"#,
        );

        let Some(img) = doc.root.find_first("img") else {
            panic!("img element missing");
        };
        assert_eq!(img.attribute("width"), Some("1200"));
        assert_eq!(img.attribute("src"), Some("http://placeimg.com/1200/800/animals"));
        assert_eq!(img.style.width, Some(Length::Percent(50.0)));
        assert_eq!(img.style.object_fit, Some(ObjectFit::Contain));
        assert!(img.children.is_empty());
    }

    #[test]
    fn extracts_metadata_and_prunes_head() {
        let doc = HtmlParser.parse(
            "<html lang=\"en\"><head><title> Docs </title><base href=\"https://example.com/docs/\" target=\"_blank\"></head><body><p>Hi</p></body></html>",
        );
        assert_eq!(doc.metadata.title.as_deref(), Some("Docs"));
        assert_eq!(
            doc.metadata.base_url.as_deref(),
            Some("https://example.com/docs/")
        );
        assert_eq!(doc.metadata.base_target.as_deref(), Some("_blank"));
        assert_eq!(doc.metadata.lang.as_deref(), Some("en"));
        assert!(doc.root.find_first("head").is_none());
        assert!(doc.root.find_first("p").is_some());
    }

    #[test]
    fn anchors_are_phrasing_and_keep_text() {
        let doc = HtmlParser.parse("<p>Go <a href=\"/x\">there</a> now</p>");
        let Some(anchor) = doc.root.find_first("a") else {
            panic!("anchor missing");
        };
        assert_eq!(anchor.kind, NodeKind::Phrasing);
        assert_eq!(anchor.text_content(), "there");
        let Some(paragraph) = doc.root.find_first("p") else {
            panic!("paragraph missing");
        };
        assert_eq!(paragraph.text_content(), "Go there now");
    }

    #[test]
    fn anchor_wrapping_block_becomes_block() {
        let doc = HtmlParser.parse("<body><a href=\"/x\"><div>Card</div></a><a href=\"/y\"><b>y</b></a></body>");
        let Some(body) = doc.root.find_first("body") else {
            panic!("body missing");
        };
        let kinds: Vec<_> = body.children.iter().map(|child| child.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Block, NodeKind::Phrasing]);
    }

    #[test]
    fn recovers_from_unbalanced_markup() {
        let doc = HtmlParser.parse("<div><p>one</span>two</div></em><p>three");
        assert_eq!(doc.root.text_content(), "onetwothree");
    }

    #[test]
    fn keeps_spaces_between_inline_siblings_only() {
        let doc = HtmlParser.parse("<div>\n<p><b>a</b> <i>b</i></p>\n<p>c</p></div>");
        let Some(div) = doc.root.find_first("div") else {
            panic!("div missing");
        };
        assert_eq!(div.children.len(), 2);
        assert_eq!(div.text_content(), "a bc");
    }

    #[test]
    fn decodes_numeric_and_named_entities() {
        assert_eq!(decode_entities("a &amp; b &#x41;&#66; &bogus;"), "a & b AB &bogus;");
    }
}
