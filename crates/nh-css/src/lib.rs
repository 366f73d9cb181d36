//! Inline style declarations and the resolved style record handed to renderers.

const ROOT_FONT_SIZE_PX: f32 = 16.0;
const PX_PER_PT: f32 = 96.0 / 72.0;
const MAX_PERCENTAGE: f32 = 1000.0;

/// A CSS length as seen after the cascade: either absolute or relative to the
/// containing block width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    /// Percentage in the `0..=1000` range (`50.0` means 50%).
    Percent(f32),
}

impl Length {
    pub fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// CSS `object-fit` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectFit {
    Fill,
    Contain,
    Cover,
    None,
    ScaleDown,
}

impl ObjectFit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fill" => Some(Self::Fill),
            "contain" => Some(Self::Contain),
            "cover" => Some(Self::Cover),
            "none" => Some(Self::None),
            "scale-down" => Some(Self::ScaleDown),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::None => "none",
            Self::ScaleDown => "scale-down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlignSelf {
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
}

impl AlignSelf {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "flex-start" | "start" | "self-start" => Some(Self::FlexStart),
            "center" => Some(Self::Center),
            "flex-end" | "end" | "self-end" => Some(Self::FlexEnd),
            "stretch" => Some(Self::Stretch),
            _ => None,
        }
    }
}

/// Box-model edge values in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
}

impl Edges {
    pub fn all(value: f32) -> Self {
        Self {
            top: Some(value),
            right: Some(value),
            bottom: Some(value),
            left: Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }

    /// Sum of the left and right edges, treating unset edges as zero.
    pub fn horizontal(&self) -> f32 {
        self.left.unwrap_or(0.0) + self.right.unwrap_or(0.0)
    }

    pub fn vertical(&self) -> f32 {
        self.top.unwrap_or(0.0) + self.bottom.unwrap_or(0.0)
    }

    fn apply(&mut self, other: &Edges) {
        if other.top.is_some() {
            self.top = other.top;
        }
        if other.right.is_some() {
            self.right = other.right;
        }
        if other.bottom.is_some() {
            self.bottom = other.bottom;
        }
        if other.left.is_some() {
            self.left = other.left;
        }
    }
}

/// Resolved style record of one node. Only numeric and enumerated values
/// survive; anything the renderers cannot use is dropped while parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRecord {
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub object_fit: Option<ObjectFit>,
    pub align_self: Option<AlignSelf>,
    pub margin: Edges,
    pub padding: Edges,
    pub border_width: Edges,
}

impl StyleRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays `other` on top of `self`; set values in `other` win.
    pub fn apply(&mut self, other: &StyleRecord) {
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
        if other.object_fit.is_some() {
            self.object_fit = other.object_fit;
        }
        if other.align_self.is_some() {
            self.align_self = other.align_self;
        }
        self.margin.apply(&other.margin);
        self.padding.apply(&other.padding);
        self.border_width.apply(&other.border_width);
    }
}

/// Parses the content of a `style="..."` attribute.
///
/// Unknown properties and unparsable values are ignored, never reported.
pub fn parse_inline_style(input: &str) -> StyleRecord {
    let mut out = StyleRecord::default();

    for chunk in strip_comments(input).split(';') {
        let Some((name_raw, value_raw)) = chunk.split_once(':') else {
            continue;
        };

        let name = name_raw.trim().to_ascii_lowercase();
        let value = strip_important(value_raw);

        match name.as_str() {
            "width" => {
                if let Some(v) = parse_dimension(value) {
                    out.width = Some(v);
                }
            }
            "height" => {
                if let Some(v) = parse_dimension(value) {
                    out.height = Some(v);
                }
            }
            "object-fit" => {
                if let Some(v) = ObjectFit::parse(value) {
                    out.object_fit = Some(v);
                }
            }
            "align-self" => {
                if let Some(v) = AlignSelf::parse(value) {
                    out.align_self = Some(v);
                }
            }
            "margin" => {
                if let Some(edges) = parse_edges(value) {
                    out.margin = edges;
                }
            }
            "padding" => {
                if let Some(edges) = parse_edges(value) {
                    out.padding = edges;
                }
            }
            "border-width" => {
                if let Some(edges) = parse_edges(value) {
                    out.border_width = edges;
                }
            }
            "margin-top" => set_edge_value(&mut out.margin.top, value),
            "margin-right" => set_edge_value(&mut out.margin.right, value),
            "margin-bottom" => set_edge_value(&mut out.margin.bottom, value),
            "margin-left" => set_edge_value(&mut out.margin.left, value),
            "padding-top" => set_edge_value(&mut out.padding.top, value),
            "padding-right" => set_edge_value(&mut out.padding.right, value),
            "padding-bottom" => set_edge_value(&mut out.padding.bottom, value),
            "padding-left" => set_edge_value(&mut out.padding.left, value),
            _ => {}
        }
    }

    out
}

/// Parses an absolute length (`px`, `pt`, `em`, `rem`, or unitless pixels).
pub fn parse_length(value: &str) -> Option<f32> {
    let raw = value.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") || raw.ends_with('%') {
        return None;
    }

    let parsed = if let Some(px) = raw.strip_suffix("px") {
        px.trim().parse::<f32>().ok()
    } else if let Some(rem) = raw.strip_suffix("rem") {
        rem.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE_PX)
    } else if let Some(em) = raw.strip_suffix("em") {
        em.trim().parse::<f32>().ok().map(|v| v * ROOT_FONT_SIZE_PX)
    } else if let Some(pt) = raw.strip_suffix("pt") {
        pt.trim().parse::<f32>().ok().map(|v| v * PX_PER_PT)
    } else {
        raw.parse::<f32>().ok()
    }?;

    parsed.is_finite().then_some(parsed)
}

pub fn parse_percentage(value: &str) -> Option<f32> {
    let percent = value.trim().strip_suffix('%')?.trim();
    let parsed = percent.parse::<f32>().ok()?;
    parsed
        .is_finite()
        .then(|| parsed.clamp(0.0, MAX_PERCENTAGE))
}

/// Width/height value: a non-negative length or a percentage.
pub fn parse_dimension(value: &str) -> Option<Length> {
    if let Some(percent) = parse_percentage(value) {
        return Some(Length::Percent(percent));
    }

    let px = parse_length(value)?;
    (px >= 0.0).then_some(Length::Px(px))
}

fn set_edge_value(target: &mut Option<f32>, value: &str) {
    if let Some(parsed) = parse_length(value) {
        *target = Some(parsed.max(0.0));
    }
}

fn parse_edges(value: &str) -> Option<Edges> {
    let values = value
        .split_ascii_whitespace()
        .map(|token| parse_length(token).map(|v| v.max(0.0)))
        .collect::<Option<Vec<_>>>()?;

    match values.as_slice() {
        [all] => Some(Edges::all(*all)),
        [vertical, horizontal] => Some(Edges {
            top: Some(*vertical),
            right: Some(*horizontal),
            bottom: Some(*vertical),
            left: Some(*horizontal),
        }),
        [top, horizontal, bottom] => Some(Edges {
            top: Some(*top),
            right: Some(*horizontal),
            bottom: Some(*bottom),
            left: Some(*horizontal),
        }),
        [top, right, bottom, left] => Some(Edges {
            top: Some(*top),
            right: Some(*right),
            bottom: Some(*bottom),
            left: Some(*left),
        }),
        _ => None,
    }
}

fn strip_important(value: &str) -> &str {
    let trimmed = value.trim();
    let marker = "!important";
    let cutoff = trimmed.len().saturating_sub(marker.len());
    match (trimmed.get(..cutoff), trimmed.get(cutoff..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(marker) => head.trim_end(),
        _ => trimmed,
    }
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }

    out.push_str(rest);
    out
}
