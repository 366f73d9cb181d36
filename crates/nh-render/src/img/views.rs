//! Building blocks of the image element.
//!
//! Each block only reads an [`ImgSnapshot`], so a custom renderer can mix
//! them freely, e.g. keep the loading view up on success.

use crate::element::ContentFit;
use crate::element::ImageElement;
use crate::element::NativeElement;
use crate::element::Surface;
use crate::element::TextAlign;
use crate::element::TextElement;
use crate::element::ViewElement;
use crate::element::ViewStyle;
use crate::img::state::ImageLoadState;
use crate::props::AccessibilityProps;
use crate::props::AccessibilityRole;
use crate::props::ViewProps;
use nh_css::StyleRecord;
use nh_layout::ImageLayoutSpec;
use nh_layout::Size;

/// State and layout of one image instance at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct ImgSnapshot {
    pub state: ImageLoadState,
    /// Finalized with the measured size once the state is `Success`.
    pub layout: ImageLayoutSpec,
    pub uri: Option<String>,
    pub alt: String,
    pub initial_dimensions: Size,
}

impl ImgSnapshot {
    /// Box the placeholders occupy: the resolved box, or the configured
    /// initial dimensions for unresolved axes.
    pub fn placeholder_size(&self) -> Size {
        self.layout.placeholder_size(self.initial_dimensions)
    }

    pub fn content_fit(&self) -> Option<ContentFit> {
        self.layout.object_fit.and_then(ContentFit::from_object_fit)
    }
}

/// Container bound to the current layout box, whatever the state.
pub fn img_container(
    snapshot: &ImgSnapshot,
    style: &StyleRecord,
    content: NativeElement,
) -> NativeElement {
    let mut view_style = ViewStyle::from_record(style, None).sized(snapshot.layout.size());
    view_style.align_self = style.align_self;

    NativeElement::View(ViewElement {
        tag: Some("img".to_owned()),
        style: view_style,
        props: ViewProps {
            accessibility: image_accessibility(&snapshot.alt),
        },
        on_press: None,
        children: vec![content],
    })
}

/// Layout-reserving box shown while the resource loads. Intrinsic layouts
/// without hints reserve nothing.
pub fn img_loading(snapshot: &ImgSnapshot) -> NativeElement {
    NativeElement::View(ViewElement {
        style: ViewStyle {
            surface: Surface::Loading,
            ..ViewStyle::default()
        }
        .sized(snapshot.layout.size()),
        ..ViewElement::default()
    })
}

/// Box sized to the last known layout showing the alt text centered.
pub fn img_error(snapshot: &ImgSnapshot) -> NativeElement {
    NativeElement::View(ViewElement {
        style: ViewStyle {
            center_content: true,
            surface: Surface::Failed,
            ..ViewStyle::default()
        }
        .sized(Some(snapshot.placeholder_size())),
        children: vec![NativeElement::Text(TextElement {
            align: TextAlign::Center,
            children: vec![NativeElement::RawText(snapshot.alt.clone())],
            ..TextElement::default()
        })],
        ..ViewElement::default()
    })
}

pub fn img_success(snapshot: &ImgSnapshot) -> NativeElement {
    let size = match (&snapshot.state, snapshot.layout.size()) {
        (_, Some(size)) => size,
        (ImageLoadState::Success { natural }, None) => *natural,
        (_, None) => snapshot.initial_dimensions,
    };

    NativeElement::Image(ImageElement {
        uri: snapshot.uri.clone().unwrap_or_default(),
        size,
        content_fit: snapshot.content_fit(),
        accessibility_label: snapshot.alt.clone(),
        style: ViewStyle::default().sized(Some(size)),
    })
}

fn image_accessibility(alt: &str) -> AccessibilityProps {
    AccessibilityProps {
        accessible: !alt.is_empty(),
        role: Some(AccessibilityRole::Image),
        label: (!alt.is_empty()).then(|| alt.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::ImgSnapshot;
    use super::img_error;
    use super::img_loading;
    use super::img_success;
    use crate::element::ContentFit;
    use crate::element::NativeElement;
    use crate::element::Surface;
    use crate::element::TextAlign;
    use crate::img::state::ImageLoadState;
    use nh_css::ObjectFit;
    use nh_layout::Dimensions;
    use nh_layout::ImageLayoutSpec;
    use nh_layout::Provenance;
    use nh_layout::Size;

    fn snapshot(state: ImageLoadState, layout: ImageLayoutSpec) -> ImgSnapshot {
        ImgSnapshot {
            state,
            layout,
            uri: Some("https://example.com/cat.png".to_owned()),
            alt: "A cat".to_owned(),
            initial_dimensions: Size::new(100.0, 100.0),
        }
    }

    fn resolved(width: f32, height: f32) -> ImageLayoutSpec {
        ImageLayoutSpec {
            dimensions: Dimensions::Resolved(Size::new(width, height)),
            provenance: Provenance::Attributes,
            object_fit: Some(ObjectFit::Contain),
        }
    }

    #[test]
    fn error_view_keeps_box_and_centers_alt() {
        let failed = ImageLoadState::Error {
            reason: "404".to_owned(),
        };
        let NativeElement::View(view) = img_error(&snapshot(failed, resolved(300.0, 200.0))) else {
            panic!("error block must be a view");
        };
        assert_eq!((view.style.width, view.style.height), (Some(300.0), Some(200.0)));
        assert!(view.style.center_content);
        assert_eq!(view.style.surface, Surface::Failed);
        let Some(NativeElement::Text(text)) = view.children.first() else {
            panic!("alt text missing");
        };
        assert_eq!(text.align, TextAlign::Center);
        assert_eq!(view.children[0].text_content(), "A cat");
    }

    #[test]
    fn error_view_uses_initial_dimensions_when_unresolved() {
        let failed = ImageLoadState::Error {
            reason: "offline".to_owned(),
        };
        let NativeElement::View(view) =
            img_error(&snapshot(failed, ImageLayoutSpec::intrinsic()))
        else {
            panic!("error block must be a view");
        };
        assert_eq!((view.style.width, view.style.height), (Some(100.0), Some(100.0)));
    }

    #[test]
    fn loading_view_reserves_resolved_box_only() {
        let NativeElement::View(reserved) =
            img_loading(&snapshot(ImageLoadState::Loading, resolved(50.0, 25.0)))
        else {
            panic!("loading block must be a view");
        };
        assert_eq!(reserved.style.width, Some(50.0));

        let NativeElement::View(pending) = img_loading(&snapshot(
            ImageLoadState::Loading,
            ImageLayoutSpec::intrinsic(),
        )) else {
            panic!("loading block must be a view");
        };
        assert_eq!(pending.style.width, None);
    }

    #[test]
    fn success_view_maps_object_fit_and_alt() {
        let loaded = ImageLoadState::Success {
            natural: Size::new(600.0, 400.0),
        };
        let NativeElement::Image(image) = img_success(&snapshot(loaded, resolved(300.0, 200.0)))
        else {
            panic!("success block must be an image");
        };
        assert_eq!(image.size, Size::new(300.0, 200.0));
        assert_eq!(image.content_fit, Some(ContentFit::Contain));
        assert_eq!(image.accessibility_label, "A cat");
    }
}
