//! Props handed to renderers and the patches prop hooks return.

use crate::path::NodePath;
use nh_css::StyleRecord;
use nh_dom::DocumentNode;
use std::fmt;
use std::sync::Arc;

/// The event that triggered a press.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressEvent {
    pub x: f32,
    pub y: f32,
}

/// Press callback attached to an interactive element.
///
/// Equality is identity: two handlers are equal only if they share the same
/// closure.
#[derive(Clone)]
pub struct PressHandler(Arc<dyn Fn(&PressEvent) + Send + Sync>);

impl PressHandler {
    pub fn new(handler: impl Fn(&PressEvent) + Send + Sync + 'static) -> Self {
        Self(Arc::new(handler))
    }

    pub fn press(&self, event: &PressEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for PressHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PressHandler(..)")
    }
}

impl PartialEq for PressHandler {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessibilityRole {
    Link,
    Image,
}

impl AccessibilityRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessibilityProps {
    pub accessible: bool,
    pub role: Option<AccessibilityRole>,
    pub label: Option<String>,
}

impl AccessibilityProps {
    pub fn link() -> Self {
        Self {
            accessible: true,
            role: Some(AccessibilityRole::Link),
            label: None,
        }
    }
}

/// Props slot applied when the node renders as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextProps {
    pub accessibility: AccessibilityProps,
    pub selectable: bool,
}

/// Props slot applied when the node renders as a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewProps {
    pub accessibility: AccessibilityProps,
}

/// Props of one element, as passed to its renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TagProps<'n> {
    pub node: &'n DocumentNode,
    pub path: NodePath,
    pub style: StyleRecord,
    pub on_press: Option<PressHandler>,
    pub text_props: TextProps,
    pub view_props: ViewProps,
}

impl<'n> TagProps<'n> {
    /// Base props derived from the node alone.
    pub fn from_node(node: &'n DocumentNode, path: NodePath) -> Self {
        Self {
            node,
            path,
            style: node.style.clone(),
            on_press: None,
            text_props: TextProps::default(),
            view_props: ViewProps::default(),
        }
    }

    pub fn tag(&self) -> &'n str {
        self.node.tag_name().unwrap_or_default()
    }

    /// Shallow merge: every slot set in `patch` replaces the current one.
    pub fn merge(&mut self, patch: PropsPatch) {
        if let Some(style) = patch.style {
            self.style = style;
        }
        if let Some(on_press) = patch.on_press {
            self.on_press = Some(on_press);
        }
        if let Some(text_props) = patch.text_props {
            self.text_props = text_props;
        }
        if let Some(view_props) = patch.view_props {
            self.view_props = view_props;
        }
    }
}

/// Slots a prop hook wants to override. An empty patch is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropsPatch {
    pub style: Option<StyleRecord>,
    pub on_press: Option<PressHandler>,
    pub text_props: Option<TextProps>,
    pub view_props: Option<ViewProps>,
}

impl PropsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::AccessibilityProps;
    use super::PressHandler;
    use super::PropsPatch;
    use super::TagProps;
    use super::TextProps;
    use crate::path::NodePath;
    use nh_dom::DocumentNode;

    #[test]
    fn empty_patch_leaves_props_unchanged() {
        let node = DocumentNode::element("span");
        let mut props = TagProps::from_node(&node, NodePath::root());
        let before = props.clone();
        props.merge(PropsPatch::default());
        assert_eq!(props, before);
    }

    #[test]
    fn later_patch_overrides_earlier_slot() {
        let node = DocumentNode::element("a");
        let mut props = TagProps::from_node(&node, NodePath::root());
        props.merge(PropsPatch {
            text_props: Some(TextProps {
                selectable: true,
                ..TextProps::default()
            }),
            ..PropsPatch::default()
        });
        props.merge(PropsPatch {
            text_props: Some(TextProps {
                accessibility: AccessibilityProps::link(),
                selectable: false,
            }),
            ..PropsPatch::default()
        });
        assert!(!props.text_props.selectable);
        assert_eq!(props.text_props.accessibility, AccessibilityProps::link());
    }

    #[test]
    fn press_handler_equality_is_identity() {
        let first = PressHandler::new(|_| {});
        let second = PressHandler::new(|_| {});
        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }
}
