//! Capability-scoped prop hooks.

use crate::config::RenderConfig;
use crate::props::AccessibilityProps;
use crate::props::PressHandler;
use crate::props::PropsPatch;
use crate::props::TagProps;
use crate::props::TextProps;
use crate::props::ViewProps;
use nh_dom::DocumentMetadata;
use nh_net::UrlNormalizer;

/// Read-only ambient context visible to prop hooks.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    pub config: &'a RenderConfig,
    pub metadata: &'a DocumentMetadata,
    pub normalizer: &'a UrlNormalizer,
}

impl HookContext<'_> {
    /// Navigation target for a node without its own `target` attribute.
    pub fn base_target(&self) -> &str {
        self.metadata
            .base_target
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
            .unwrap_or(&self.config.default_base_target)
    }
}

/// Makes an anchor interactive.
///
/// Requires the `a` tag, an href that normalizes, and a configured press
/// callback. Otherwise the patch is empty and props stay untouched.
pub fn anchor_hook(props: &TagProps<'_>, cx: &HookContext<'_>) -> PropsPatch {
    if props.tag() != "a" {
        return PropsPatch::default();
    }
    let Some(on_press) = cx.config.renderers_props.a.on_press.clone() else {
        return PropsPatch::default();
    };
    let Some(href) = props
        .node
        .attribute("href")
        .and_then(|href| cx.normalizer.normalize(href))
    else {
        return PropsPatch::default();
    };

    let target = props
        .node
        .attribute("target")
        .map(str::trim)
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| cx.base_target())
        .to_owned();
    let attributes = props.node.attributes.clone();

    let link = AccessibilityProps::link();
    PropsPatch {
        on_press: Some(PressHandler::new(move |event| {
            on_press(event, &href, &attributes, &target)
        })),
        text_props: Some(TextProps {
            accessibility: link.clone(),
            ..props.text_props.clone()
        }),
        view_props: Some(ViewProps {
            accessibility: link,
            ..props.view_props.clone()
        }),
        ..PropsPatch::default()
    }
}
