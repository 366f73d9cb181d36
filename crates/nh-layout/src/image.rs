//! Image box resolution.
//!
//! Boxes are resolved from inline style and `width`/`height` attributes
//! before the resource is fetched so that layout space can be reserved.
//! When the two sources together do not yield a full pair, the box stays
//! intrinsic until the resource reports its natural size.

use crate::units::LayoutConstraints;
use crate::units::Size;
use crate::units::parse_attribute_dimension;
use crate::units::resolve_length;
use crate::units::round_px;
use crate::units::scale_down;
use nh_css::ObjectFit;
use nh_css::StyleRecord;
use nh_dom::Attributes;

/// Where a resolved box came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Style,
    Attributes,
    /// One axis from style, the other from attributes.
    Mixed,
    /// Natural size reported by the loaded resource.
    Measured,
    Unresolved,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Attributes => "attributes",
            Self::Mixed => "mixed",
            Self::Measured => "measured",
            Self::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimensions {
    Resolved(Size),
    /// Proportionally scaled down from `requested` to fit the max width.
    Scaled { size: Size, requested: Size },
    /// Waiting for the natural size. Known single axes are kept as hints.
    Intrinsic {
        width: Option<f32>,
        height: Option<f32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageLayoutSpec {
    pub dimensions: Dimensions,
    pub provenance: Provenance,
    pub object_fit: Option<ObjectFit>,
}

impl ImageLayoutSpec {
    pub fn intrinsic() -> Self {
        Self {
            dimensions: Dimensions::Intrinsic {
                width: None,
                height: None,
            },
            provenance: Provenance::Unresolved,
            object_fit: None,
        }
    }

    /// The reserved box, if any.
    pub fn size(&self) -> Option<Size> {
        match self.dimensions {
            Dimensions::Resolved(size) | Dimensions::Scaled { size, .. } => Some(size),
            Dimensions::Intrinsic { .. } => None,
        }
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self.dimensions, Dimensions::Intrinsic { .. })
    }

    pub fn is_scaled(&self) -> bool {
        matches!(self.dimensions, Dimensions::Scaled { .. })
    }

    /// Box used by placeholders: the resolved box, else any hinted axis
    /// completed from `fallback`.
    pub fn placeholder_size(&self, fallback: Size) -> Size {
        match self.dimensions {
            Dimensions::Resolved(size) | Dimensions::Scaled { size, .. } => size,
            Dimensions::Intrinsic { width, height } => Size::new(
                width.unwrap_or(fallback.width),
                height.unwrap_or(fallback.height),
            ),
        }
    }

    /// Completes an intrinsic spec with the measured natural size, then
    /// applies the same scaling rule as attribute boxes. Specs that already
    /// have a box are returned unchanged.
    pub fn finalize(&self, natural: Size, constraints: &LayoutConstraints) -> Self {
        let Dimensions::Intrinsic { width, height } = self.dimensions else {
            return *self;
        };

        let requested = match (width, height, natural.aspect_ratio()) {
            (Some(w), Some(h), _) => Size::new(w, h),
            (Some(w), None, Some(ratio)) => Size::new(w, round_px(w * ratio)),
            (None, Some(h), Some(ratio)) => Size::new(round_px(h / ratio), h),
            (Some(w), None, None) => Size::new(w, natural.height),
            (None, Some(h), None) => Size::new(natural.width, h),
            (None, None, _) => natural,
        };

        Self {
            dimensions: fit(requested, constraints),
            provenance: Provenance::Measured,
            object_fit: self.object_fit,
        }
    }
}

/// Resolves the image box from inline style, attributes and host constraints.
///
/// Each axis takes the style value when there is one, else the attribute.
/// Anything short of a full pair stays intrinsic.
pub fn resolve(
    attributes: &Attributes,
    style: &StyleRecord,
    constraints: &LayoutConstraints,
) -> ImageLayoutSpec {
    let reference = constraints.content_width;
    let style_width = style.width.and_then(|len| resolve_length(len, reference));
    let style_height = style.height.and_then(|len| resolve_length(len, reference));
    let attr_width = attributes.get("width").and_then(parse_attribute_dimension);
    let attr_height = attributes.get("height").and_then(parse_attribute_dimension);

    let resolved = match (style_width.or(attr_width), style_height.or(attr_height)) {
        (Some(w), Some(h)) => {
            let provenance = match (style_width.is_some(), style_height.is_some()) {
                (true, true) => Provenance::Style,
                (false, false) => Provenance::Attributes,
                _ => Provenance::Mixed,
            };
            Some((Size::new(w, h), provenance))
        }
        _ => None,
    };

    let (dimensions, provenance) = match resolved {
        Some((requested, provenance)) => (fit(requested, constraints), provenance),
        None => (
            Dimensions::Intrinsic {
                width: style_width.or(attr_width),
                height: style_height.or(attr_height),
            },
            Provenance::Unresolved,
        ),
    };

    ImageLayoutSpec {
        dimensions,
        provenance,
        object_fit: style.object_fit,
    }
}

fn fit(requested: Size, constraints: &LayoutConstraints) -> Dimensions {
    match scale_down(requested, constraints.bound()) {
        Some(size) => Dimensions::Scaled { size, requested },
        None => Dimensions::Resolved(requested),
    }
}

#[cfg(test)]
mod tests {
    use super::Dimensions;
    use super::ImageLayoutSpec;
    use super::Provenance;
    use super::resolve;
    use crate::units::FitContentWidth;
    use crate::units::LayoutConstraints;
    use crate::units::MaxWidth;
    use crate::units::NoScaling;
    use crate::units::Size;
    use nh_css::ObjectFit;
    use nh_css::parse_inline_style;
    use nh_dom::Attributes;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs.iter().copied().collect()
    }

    fn fit_to(width: f32) -> LayoutConstraints {
        LayoutConstraints::for_tag("img", Some(width), &FitContentWidth)
    }

    #[test]
    fn attribute_box_scales_down_to_container() {
        let spec = resolve(
            &attrs(&[("width", "1200"), ("height", "800")]),
            &parse_inline_style(""),
            &fit_to(300.0),
        );
        assert_eq!(spec.size(), Some(Size::new(300.0, 200.0)));
        assert_eq!(spec.provenance, Provenance::Attributes);
        assert!(spec.is_scaled());
    }

    #[test]
    fn unbounded_policy_keeps_attribute_box() {
        let constraints = LayoutConstraints::for_tag("img", Some(300.0), &NoScaling);
        let spec = resolve(
            &attrs(&[("width", "1200"), ("height", "800")]),
            &parse_inline_style(""),
            &constraints,
        );
        assert_eq!(spec.dimensions, Dimensions::Resolved(Size::new(1200.0, 800.0)));
    }

    #[test]
    fn style_pair_wins_over_attributes() {
        let spec = resolve(
            &attrs(&[("width", "1200"), ("height", "800")]),
            &parse_inline_style("width: 50%; height: 90px"),
            &fit_to(300.0),
        );
        assert_eq!(spec.size(), Some(Size::new(150.0, 90.0)));
        assert_eq!(spec.provenance, Provenance::Style);
    }

    #[test]
    fn style_axis_wins_over_attribute_pair() {
        let spec = resolve(
            &attrs(&[("width", "200"), ("height", "100")]),
            &parse_inline_style("width: 80px"),
            &fit_to(300.0),
        );
        assert_eq!(spec.size(), Some(Size::new(80.0, 100.0)));
        assert_eq!(spec.provenance, Provenance::Mixed);
    }

    #[test]
    fn style_height_completes_from_attribute_width() {
        let spec = resolve(
            &attrs(&[("width", "200"), ("height", "100")]),
            &parse_inline_style("height: 50px"),
            &fit_to(300.0),
        );
        assert_eq!(spec.size(), Some(Size::new(200.0, 50.0)));
        assert_eq!(spec.provenance, Provenance::Mixed);
    }

    #[test]
    fn partial_sources_merge_per_axis() {
        let spec = resolve(
            &attrs(&[("height", "60")]),
            &parse_inline_style("width: 120px"),
            &fit_to(300.0),
        );
        assert_eq!(spec.size(), Some(Size::new(120.0, 60.0)));
        assert_eq!(spec.provenance, Provenance::Mixed);
    }

    #[test]
    fn style_box_is_scaled_too() {
        let spec = resolve(
            &Attributes::new(),
            &parse_inline_style("width: 600px; height: 300px"),
            &fit_to(300.0),
        );
        assert_eq!(
            spec.dimensions,
            Dimensions::Scaled {
                size: Size::new(300.0, 150.0),
                requested: Size::new(600.0, 300.0),
            }
        );
    }

    #[test]
    fn percentage_without_container_stays_intrinsic() {
        let constraints = LayoutConstraints::new(None, MaxWidth::Unbounded);
        let spec = resolve(
            &Attributes::new(),
            &parse_inline_style("width: 50%; height: 40px"),
            &constraints,
        );
        assert_eq!(
            spec.dimensions,
            Dimensions::Intrinsic {
                width: None,
                height: Some(40.0),
            }
        );
    }

    #[test]
    fn object_fit_is_carried_through() {
        let spec = resolve(
            &Attributes::new(),
            &parse_inline_style("object-fit: contain"),
            &fit_to(300.0),
        );
        assert_eq!(spec.object_fit, Some(ObjectFit::Contain));
        assert!(spec.is_intrinsic());
    }

    #[test]
    fn finalize_measures_and_scales_intrinsic_spec() {
        let spec = ImageLayoutSpec::intrinsic().finalize(Size::new(1200.0, 800.0), &fit_to(300.0));
        assert_eq!(spec.size(), Some(Size::new(300.0, 200.0)));
        assert_eq!(spec.provenance, Provenance::Measured);
    }

    #[test]
    fn finalize_honours_width_hint() {
        let spec = resolve(
            &attrs(&[("width", "100")]),
            &parse_inline_style(""),
            &fit_to(300.0),
        );
        let done = spec.finalize(Size::new(400.0, 200.0), &fit_to(300.0));
        assert_eq!(done.size(), Some(Size::new(100.0, 50.0)));
    }

    #[test]
    fn finalize_leaves_resolved_spec_alone() {
        let spec = resolve(
            &attrs(&[("width", "20"), ("height", "10")]),
            &parse_inline_style(""),
            &fit_to(300.0),
        );
        assert_eq!(spec.finalize(Size::new(999.0, 999.0), &fit_to(300.0)), spec);
    }

    #[test]
    fn placeholder_falls_back_per_axis() {
        let spec = resolve(
            &attrs(&[("height", "30")]),
            &parse_inline_style(""),
            &fit_to(300.0),
        );
        assert_eq!(
            spec.placeholder_size(Size::new(100.0, 100.0)),
            Size::new(100.0, 30.0)
        );
    }
}
