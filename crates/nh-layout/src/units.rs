//! Pixel units, length resolution and max-width policies.

use nh_css::Length;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Height over width, `None` for degenerate boxes.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.height / self.width)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Upper bound on the width of embedded content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxWidth {
    Bounded(f32),
    /// Disables scaling entirely.
    Unbounded,
}

impl MaxWidth {
    /// `f32::INFINITY` (or NaN) maps to [`MaxWidth::Unbounded`].
    pub fn from_px(value: f32) -> Self {
        if value.is_finite() {
            Self::Bounded(value.max(0.0))
        } else {
            Self::Unbounded
        }
    }
}

/// Computes the maximum width of embedded content (images, iframes, ...)
/// keyed by tag name.
pub trait MaxWidthPolicy: Send + Sync {
    fn max_width(&self, tag: &str, content_width: Option<f32>) -> MaxWidth;
}

impl<F> MaxWidthPolicy for F
where
    F: Fn(&str, Option<f32>) -> MaxWidth + Send + Sync,
{
    fn max_width(&self, tag: &str, content_width: Option<f32>) -> MaxWidth {
        self(tag, content_width)
    }
}

/// Embedded content never exceeds the content width.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitContentWidth;

impl MaxWidthPolicy for FitContentWidth {
    fn max_width(&self, _tag: &str, content_width: Option<f32>) -> MaxWidth {
        content_width.map_or(MaxWidth::Unbounded, MaxWidth::from_px)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoScaling;

impl MaxWidthPolicy for NoScaling {
    fn max_width(&self, _tag: &str, _content_width: Option<f32>) -> MaxWidth {
        MaxWidth::Unbounded
    }
}

/// Host-provided constraints for one embedded element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraints {
    pub content_width: Option<f32>,
    pub max_width: MaxWidth,
}

impl LayoutConstraints {
    pub fn new(content_width: Option<f32>, max_width: MaxWidth) -> Self {
        Self {
            content_width: content_width.filter(|w| w.is_finite() && *w > 0.0),
            max_width,
        }
    }

    pub fn for_tag(tag: &str, content_width: Option<f32>, policy: &dyn MaxWidthPolicy) -> Self {
        Self::new(content_width, policy.max_width(tag, content_width))
    }

    /// Effective scaling bound: `min(content width, policy bound)`, or `None`
    /// when the policy is unbounded.
    pub fn bound(&self) -> Option<f32> {
        match self.max_width {
            MaxWidth::Unbounded => None,
            MaxWidth::Bounded(limit) => Some(match self.content_width {
                Some(width) => width.min(limit),
                None => limit,
            }),
        }
    }
}

/// Resolves a style length to pixels. Percentages need a reference width;
/// without one the length is unresolved.
pub fn resolve_length(length: Length, reference: Option<f32>) -> Option<f32> {
    match length {
        Length::Px(px) => Some(px),
        Length::Percent(percent) => reference.map(|width| round_px(width * percent / 100.0)),
    }
}

/// Parses a `width`/`height` attribute: a non-negative number, optionally
/// suffixed with `px`.
pub fn parse_attribute_dimension(value: &str) -> Option<f32> {
    let raw = value.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw).trim_end();
    let parsed = raw.parse::<f32>().ok()?;
    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}

/// Scales `size` down to `bound` preserving its aspect ratio. Returns `None`
/// when no scaling is needed.
pub fn scale_down(size: Size, bound: Option<f32>) -> Option<Size> {
    let bound = bound?;
    if size.width <= bound || size.width <= 0.0 {
        return None;
    }

    let ratio = bound / size.width;
    Some(Size::new(bound, round_px(size.height * ratio)))
}

pub fn round_px(value: f32) -> f32 {
    value.round()
}

#[cfg(test)]
mod tests {
    use super::FitContentWidth;
    use super::LayoutConstraints;
    use super::MaxWidth;
    use super::MaxWidthPolicy;
    use super::NoScaling;
    use super::Size;
    use super::parse_attribute_dimension;
    use super::resolve_length;
    use super::scale_down;
    use nh_css::Length;

    #[test]
    fn percentage_resolves_against_reference() {
        assert_eq!(resolve_length(Length::Percent(50.0), Some(300.0)), Some(150.0));
        assert_eq!(resolve_length(Length::Percent(50.0), Some(333.0)), Some(167.0));
        assert_eq!(resolve_length(Length::Percent(50.0), None), None);
        assert_eq!(resolve_length(Length::Px(42.5), None), Some(42.5));
    }

    #[test]
    fn percentage_resolution_is_repeatable() {
        for width in [120.0, 333.0, 1024.0] {
            let first = resolve_length(Length::Percent(33.0), Some(width));
            let second = resolve_length(Length::Percent(33.0), Some(width));
            assert_eq!(first, second);
        }
    }

    #[test]
    fn attribute_dimension_accepts_numbers_only() {
        assert_eq!(parse_attribute_dimension("1200"), Some(1200.0));
        assert_eq!(parse_attribute_dimension(" 64px "), Some(64.0));
        assert_eq!(parse_attribute_dimension("50%"), None);
        assert_eq!(parse_attribute_dimension("-3"), None);
        assert_eq!(parse_attribute_dimension("wide"), None);
    }

    #[test]
    fn scale_down_preserves_aspect_ratio() {
        let scaled = scale_down(Size::new(1200.0, 800.0), Some(300.0));
        assert_eq!(scaled, Some(Size::new(300.0, 200.0)));
        assert_eq!(scale_down(Size::new(200.0, 100.0), Some(300.0)), None);
        assert_eq!(scale_down(Size::new(1200.0, 800.0), None), None);
    }

    #[test]
    fn bound_combines_content_width_and_policy() {
        let fit = LayoutConstraints::for_tag("img", Some(300.0), &FitContentWidth);
        assert_eq!(fit.bound(), Some(300.0));

        let narrower = LayoutConstraints::new(Some(300.0), MaxWidth::Bounded(120.0));
        assert_eq!(narrower.bound(), Some(120.0));

        let unbounded = LayoutConstraints::for_tag("img", Some(300.0), &NoScaling);
        assert_eq!(unbounded.bound(), None);
    }

    #[test]
    fn infinite_policy_value_disables_scaling() {
        let policy = |_: &str, _: Option<f32>| MaxWidth::from_px(f32::INFINITY);
        assert_eq!(policy.max_width("img", Some(300.0)), MaxWidth::Unbounded);
    }

    #[test]
    fn aspect_ratio_of_degenerate_box_is_none() {
        assert_eq!(Size::new(0.0, 10.0).aspect_ratio(), None);
        assert_eq!(Size::new(200.0, 100.0).aspect_ratio(), Some(0.5));
    }
}
