//! Renderers registered by default.

use crate::element::NativeElement;
use crate::element::TextElement;
use crate::element::ViewElement;
use crate::element::ViewStyle;
use crate::img::ImageLoadState;
use crate::img::img_container;
use crate::img::img_error;
use crate::img::img_loading;
use crate::img::img_success;
use crate::model::RendererModel;
use crate::props::TagProps;
use crate::session::RenderContext;
use nh_core::RenderResult;
use nh_dom::NodeKind;

type BuiltinRenderer = fn(TagProps<'_>, &mut RenderContext<'_>) -> RenderResult<NativeElement>;

const BLOCK_TAGS: &[&str] = &[
    "document", "html", "body", "main", "section", "article", "header", "footer", "nav",
    "aside", "address", "div", "p", "pre", "hr", "form", "fieldset", "ul", "ol", "li", "dl",
    "dt", "dd", "h1", "h2", "h3", "h4", "h5", "h6", "figure", "figcaption", "table", "thead",
    "tbody", "tfoot", "tr", "td", "th", "blockquote",
];

const TEXT_TAGS: &[&str] = &[
    "span", "em", "strong", "b", "i", "u", "s", "small", "code", "kbd", "samp", "var", "mark",
    "abbr", "cite", "q", "sub", "sup", "del", "ins", "label", "time",
];

pub(crate) fn renderers() -> Vec<(&'static str, RendererModel, BuiltinRenderer)> {
    let mut out = Vec::with_capacity(BLOCK_TAGS.len() + TEXT_TAGS.len() + 3);
    out.extend(
        BLOCK_TAGS
            .iter()
            .map(|tag| (*tag, RendererModel::block(), render_container as BuiltinRenderer)),
    );
    out.extend(
        TEXT_TAGS
            .iter()
            .map(|tag| (*tag, RendererModel::textual(), render_container as BuiltinRenderer)),
    );
    out.push(("a", RendererModel::anchor(), render_container as BuiltinRenderer));
    out.push(("img", RendererModel::image(), render_img as BuiltinRenderer));
    out.push((
        "br",
        RendererModel::line_break(),
        render_line_break as BuiltinRenderer,
    ));
    out
}

/// Generic element: a view for blocks, a text element for phrasing content.
pub(crate) fn default_container(props: TagProps<'_>, cx: &mut RenderContext<'_>) -> NativeElement {
    let node = props.node;
    let tag = node.tag_name().map(str::to_owned);
    let children = cx.render_children(node);

    match node.kind {
        NodeKind::Block => NativeElement::View(ViewElement {
            tag,
            style: ViewStyle::from_record(&props.style, cx.content_width()),
            props: props.view_props,
            on_press: props.on_press,
            children,
        }),
        NodeKind::Phrasing => NativeElement::Text(TextElement {
            tag,
            props: props.text_props,
            on_press: props.on_press,
            children,
            ..TextElement::default()
        }),
        NodeKind::Text => NativeElement::RawText(node.data.clone()),
    }
}

fn render_container(props: TagProps<'_>, cx: &mut RenderContext<'_>) -> RenderResult<NativeElement> {
    Ok(default_container(props, cx))
}

fn render_line_break(_props: TagProps<'_>, _cx: &mut RenderContext<'_>) -> RenderResult<NativeElement> {
    Ok(NativeElement::RawText("\n".to_owned()))
}

fn render_img(props: TagProps<'_>, cx: &mut RenderContext<'_>) -> RenderResult<NativeElement> {
    let snapshot = cx.use_img_state(&props);
    let content = match (&snapshot.uri, &snapshot.state) {
        (None, _) | (_, ImageLoadState::Error { .. }) => img_error(&snapshot),
        (Some(_), ImageLoadState::Success { .. }) => img_success(&snapshot),
        (Some(_), ImageLoadState::Idle | ImageLoadState::Loading) => img_loading(&snapshot),
    };
    Ok(img_container(&snapshot, &props.style, content))
}
