//! Native element tree produced by a render pass.

use crate::props::PressHandler;
use crate::props::TextProps;
use crate::props::ViewProps;
use nh_css::AlignSelf;
use nh_css::Edges;
use nh_css::Length;
use nh_css::ObjectFit;
use nh_css::StyleRecord;
use nh_layout::Size;

#[derive(Debug, Clone, PartialEq)]
pub enum NativeElement {
    View(ViewElement),
    Text(TextElement),
    /// Character data inside a text or view element.
    RawText(String),
    Image(ImageElement),
    /// Children rendered without a wrapping element.
    Fragment(Vec<NativeElement>),
}

impl NativeElement {
    pub fn children(&self) -> &[NativeElement] {
        match self {
            Self::View(view) => &view.children,
            Self::Text(text) => &text.children,
            Self::Fragment(children) => children,
            Self::RawText(_) | Self::Image(_) => &[],
        }
    }

    /// Concatenated character data of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Depth-first search for the first element matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&NativeElement) -> bool) -> Option<&NativeElement> {
        if predicate(self) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find(predicate))
    }

    pub fn on_press(&self) -> Option<&PressHandler> {
        match self {
            Self::View(view) => view.on_press.as_ref(),
            Self::Text(text) => text.on_press.as_ref(),
            _ => None,
        }
    }
}

fn collect_text(element: &NativeElement, out: &mut String) {
    if let NativeElement::RawText(text) = element {
        out.push_str(text);
    }
    for child in element.children() {
        collect_text(child, out);
    }
}

/// Background treatment of a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Surface {
    #[default]
    Plain,
    /// Reserved box of a resource still loading.
    Loading,
    /// Reserved box of a resource that failed to load.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewStyle {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub margin: Edges,
    pub padding: Edges,
    pub border_width: Edges,
    pub align_self: Option<AlignSelf>,
    /// Centers children on both axes.
    pub center_content: bool,
    pub surface: Surface,
}

impl ViewStyle {
    /// Box-model part of a style record. Percent sizes resolve against
    /// `content_width` and are dropped without one.
    pub fn from_record(record: &StyleRecord, content_width: Option<f32>) -> Self {
        let px = |length: Option<Length>| match length? {
            Length::Px(value) => Some(value),
            Length::Percent(percent) => content_width.map(|width| (width * percent / 100.0).round()),
        };

        Self {
            width: px(record.width),
            height: px(record.height),
            margin: record.margin,
            padding: record.padding,
            border_width: record.border_width,
            align_self: record.align_self,
            ..Self::default()
        }
    }

    pub fn sized(mut self, size: Option<Size>) -> Self {
        self.width = size.map(|size| size.width);
        self.height = size.map(|size| size.height);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewElement {
    pub tag: Option<String>,
    pub style: ViewStyle,
    pub props: ViewProps,
    pub on_press: Option<PressHandler>,
    pub children: Vec<NativeElement>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextElement {
    pub tag: Option<String>,
    pub props: TextProps,
    pub on_press: Option<PressHandler>,
    pub align: TextAlign,
    pub children: Vec<NativeElement>,
}

/// Native equivalent of CSS `object-fit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentFit {
    Cover,
    Contain,
    Fill,
    ScaleDown,
}

impl ContentFit {
    /// Maps an `object-fit` keyword. `none` has no native counterpart.
    pub fn from_object_fit(fit: ObjectFit) -> Option<Self> {
        match fit {
            ObjectFit::Cover => Some(Self::Cover),
            ObjectFit::Contain => Some(Self::Contain),
            ObjectFit::Fill => Some(Self::Fill),
            ObjectFit::ScaleDown => Some(Self::ScaleDown),
            ObjectFit::None => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::ScaleDown => "scale-down",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageElement {
    pub uri: String,
    pub size: Size,
    pub content_fit: Option<ContentFit>,
    pub accessibility_label: String,
    pub style: ViewStyle,
}

#[cfg(test)]
mod tests {
    use super::ContentFit;
    use super::NativeElement;
    use super::TextElement;
    use super::ViewStyle;
    use nh_css::ObjectFit;
    use nh_css::parse_inline_style;

    #[test]
    fn object_fit_maps_to_content_fit() {
        assert_eq!(
            ContentFit::from_object_fit(ObjectFit::Contain),
            Some(ContentFit::Contain)
        );
        assert_eq!(
            ContentFit::from_object_fit(ObjectFit::ScaleDown),
            Some(ContentFit::ScaleDown)
        );
        assert_eq!(ContentFit::from_object_fit(ObjectFit::None), None);
    }

    #[test]
    fn text_content_walks_nested_children() {
        let element = NativeElement::Fragment(vec![
            NativeElement::RawText("Hello ".to_owned()),
            NativeElement::Text(TextElement {
                children: vec![NativeElement::RawText("world".to_owned())],
                ..TextElement::default()
            }),
        ]);
        assert_eq!(element.text_content(), "Hello world");
    }

    #[test]
    fn view_style_resolves_percent_width() {
        let style = ViewStyle::from_record(&parse_inline_style("width: 50%; padding: 4px"), Some(320.0));
        assert_eq!(style.width, Some(160.0));
        assert_eq!(style.padding.horizontal(), 8.0);

        let unresolved = ViewStyle::from_record(&parse_inline_style("width: 50%"), None);
        assert_eq!(unresolved.width, None);
    }
}
