//! Caller configuration consumed during render passes.

use crate::props::PressEvent;
use nh_core::RenderError;
use nh_core::RenderResult;
use nh_dom::Attributes;
use nh_layout::FitContentWidth;
use nh_layout::LayoutConstraints;
use nh_layout::MaxWidthPolicy;
use nh_layout::Size;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_BASE_TARGET: &str = "_self";
pub const DEFAULT_INITIAL_DIMENSIONS: Size = Size::new(100.0, 100.0);

/// Anchor press callback: `(event, normalized href, raw attributes, target)`.
pub type OnLinkPress = dyn Fn(&PressEvent, &str, &Attributes, &str) + Send + Sync;

#[derive(Clone, Default)]
pub struct AnchorProps {
    pub on_press: Option<Arc<OnLinkPress>>,
}

impl fmt::Debug for AnchorProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnchorProps")
            .field("on_press", &self.on_press.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImgProps {
    /// Box of an image whose size cannot be resolved, used by placeholders.
    pub initial_dimensions: Size,
}

impl Default for ImgProps {
    fn default() -> Self {
        Self {
            initial_dimensions: DEFAULT_INITIAL_DIMENSIONS,
        }
    }
}

/// Per-tag configuration, as looked up by tag name.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredProps<'a> {
    Anchor(&'a AnchorProps),
    Img(&'a ImgProps),
}

#[derive(Debug, Clone, Default)]
pub struct RenderersProps {
    pub a: AnchorProps,
    pub img: ImgProps,
}

impl RenderersProps {
    pub fn for_tag(&self, tag: &str) -> Option<ConfiguredProps<'_>> {
        match tag {
            "a" => Some(ConfiguredProps::Anchor(&self.a)),
            "img" => Some(ConfiguredProps::Img(&self.img)),
            _ => None,
        }
    }
}

/// Read-only configuration shared by every node of a render pass.
#[derive(Clone)]
pub struct RenderConfig {
    pub content_width: Option<f32>,
    pub renderers_props: RenderersProps,
    pub embedded_max_width: Arc<dyn MaxWidthPolicy>,
    pub default_base_target: String,
    /// Base URL used when the document has no `<base href>`.
    pub base_url: Option<String>,
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    pub fn validate(&self) -> RenderResult<()> {
        if let Some(width) = self.content_width {
            if !width.is_finite() || width <= 0.0 {
                return Err(RenderError::invalid_config(
                    "render.config.content_width",
                    format!("content width must be a positive number, got {width}"),
                ));
            }
        }

        let initial = self.renderers_props.img.initial_dimensions;
        if !initial.width.is_finite()
            || !initial.height.is_finite()
            || initial.width < 0.0
            || initial.height < 0.0
        {
            return Err(RenderError::invalid_config(
                "render.config.initial_dimensions",
                "initial image dimensions must be finite and non-negative",
            ));
        }

        if self.default_base_target.trim().is_empty() {
            return Err(RenderError::invalid_config(
                "render.config.base_target",
                "default base target must not be empty",
            ));
        }

        Ok(())
    }

    /// Layout constraints for embedded content of `tag`.
    pub fn constraints_for(&self, tag: &str) -> LayoutConstraints {
        LayoutConstraints::for_tag(tag, self.content_width, self.embedded_max_width.as_ref())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            content_width: None,
            renderers_props: RenderersProps::default(),
            embedded_max_width: Arc::new(FitContentWidth),
            default_base_target: DEFAULT_BASE_TARGET.to_owned(),
            base_url: None,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("content_width", &self.content_width)
            .field("renderers_props", &self.renderers_props)
            .field("default_base_target", &self.default_base_target)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn content_width(mut self, width: f32) -> Self {
        self.config.content_width = Some(width);
        self
    }

    pub fn on_link_press(
        mut self,
        on_press: impl Fn(&PressEvent, &str, &Attributes, &str) + Send + Sync + 'static,
    ) -> Self {
        self.config.renderers_props.a.on_press = Some(Arc::new(on_press));
        self
    }

    pub fn initial_dimensions(mut self, size: Size) -> Self {
        self.config.renderers_props.img.initial_dimensions = size;
        self
    }

    pub fn embedded_max_width(mut self, policy: impl MaxWidthPolicy + 'static) -> Self {
        self.config.embedded_max_width = Arc::new(policy);
        self
    }

    pub fn default_base_target(mut self, target: impl Into<String>) -> Self {
        self.config.default_base_target = target.into();
        self
    }

    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.config.base_url = Some(base.into());
        self
    }

    pub fn build(self) -> RenderResult<RenderConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::ConfiguredProps;
    use super::DEFAULT_INITIAL_DIMENSIONS;
    use super::RenderConfig;
    use nh_layout::MaxWidth;
    use nh_layout::NoScaling;

    #[test]
    fn defaults_are_valid() {
        let config = match RenderConfig::builder().build() {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(config.default_base_target, "_self");
        assert_eq!(
            config.renderers_props.img.initial_dimensions,
            DEFAULT_INITIAL_DIMENSIONS
        );
    }

    #[test]
    fn rejects_non_positive_content_width() {
        let error = match RenderConfig::builder().content_width(0.0).build() {
            Ok(_) => panic!("zero width must be rejected"),
            Err(e) => e,
        };
        assert_eq!(error.code(), "render.config.content_width");
    }

    #[test]
    fn rejects_blank_base_target() {
        let result = RenderConfig::builder().default_base_target("  ").build();
        assert!(matches!(result, Err(e) if e.code() == "render.config.base_target"));
    }

    #[test]
    fn looks_up_configured_props_by_tag() {
        let config = RenderConfig::default();
        assert!(matches!(
            config.renderers_props.for_tag("img"),
            Some(ConfiguredProps::Img(_))
        ));
        assert!(config.renderers_props.for_tag("div").is_none());
    }

    #[test]
    fn constraints_follow_policy() {
        let config = match RenderConfig::builder()
            .content_width(300.0)
            .embedded_max_width(NoScaling)
            .build()
        {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(config.constraints_for("img").max_width, MaxWidth::Unbounded);
        assert_eq!(RenderConfig::default().constraints_for("img").bound(), None);
    }
}
