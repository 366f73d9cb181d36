//! URL normalization for hrefs and image sources.

use nh_core::RenderError;
use nh_core::RenderResult;
use url::Url;

/// Schemes that must never become a navigation or fetch target.
const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript"];

/// Resolves author-supplied URLs against an optional document base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlNormalizer {
    base: Option<Url>,
}

impl UrlNormalizer {
    pub fn new(base: Option<&str>) -> RenderResult<Self> {
        let base = base
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                Url::parse(value).map_err(|error| {
                    RenderError::invalid_config(
                        "net.url.base_invalid",
                        format!("failed to parse base URL `{value}`: {error}"),
                    )
                })
            })
            .transpose()?;

        if let Some(base) = &base {
            if base.cannot_be_a_base() {
                return Err(RenderError::invalid_config(
                    "net.url.base_opaque",
                    format!("`{base}` cannot be used as a base URL"),
                ));
            }
        }

        Ok(Self { base })
    }

    /// Like [`UrlNormalizer::new`] but an unusable base degrades to no base.
    pub fn lenient(base: Option<&str>) -> Self {
        Self::new(base).unwrap_or_default()
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Returns the normalized form of `href`, or `None` when it cannot be
    /// used as a link or resource target.
    pub fn normalize(&self, href: &str) -> Option<String> {
        let trimmed = href.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Ok(absolute) = Url::parse(trimmed) {
            if BLOCKED_SCHEMES.contains(&absolute.scheme()) {
                return None;
            }
            return Some(absolute.to_string());
        }

        match &self.base {
            Some(base) => base.join(trimmed).ok().map(|joined| joined.to_string()),
            None if trimmed.starts_with("//") => Url::parse(&format!("https:{trimmed}"))
                .ok()
                .map(|url| url.to_string()),
            None => Some(trimmed.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UrlNormalizer;

    fn with_base(base: &str) -> UrlNormalizer {
        match UrlNormalizer::new(Some(base)) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn rejects_empty_and_whitespace_hrefs() {
        let normalizer = UrlNormalizer::default();
        assert_eq!(normalizer.normalize(""), None);
        assert_eq!(normalizer.normalize("   "), None);
    }

    #[test]
    fn keeps_absolute_urls() {
        let normalizer = with_base("https://example.com/docs/");
        assert_eq!(
            normalizer.normalize(" https://other.org/a?b=1 ").as_deref(),
            Some("https://other.org/a?b=1")
        );
        assert_eq!(
            normalizer.normalize("mailto:team@example.com").as_deref(),
            Some("mailto:team@example.com")
        );
    }

    #[test]
    fn joins_relative_urls_with_base() {
        let normalizer = with_base("https://example.com/docs/intro.html");
        assert_eq!(
            normalizer.normalize("images/cat.png").as_deref(),
            Some("https://example.com/docs/images/cat.png")
        );
        assert_eq!(
            normalizer.normalize("/root").as_deref(),
            Some("https://example.com/root")
        );
        assert_eq!(
            normalizer.normalize("#top").as_deref(),
            Some("https://example.com/docs/intro.html#top")
        );
    }

    #[test]
    fn relative_without_base_passes_through() {
        let normalizer = UrlNormalizer::default();
        assert_eq!(normalizer.normalize("/about").as_deref(), Some("/about"));
        assert_eq!(
            normalizer.normalize("//cdn.example.com/x.png").as_deref(),
            Some("https://cdn.example.com/x.png")
        );
    }

    #[test]
    fn blocks_script_urls() {
        let normalizer = UrlNormalizer::default();
        assert_eq!(normalizer.normalize("javascript:alert(1)"), None);
    }

    #[test]
    fn invalid_base_is_rejected_or_ignored() {
        assert!(UrlNormalizer::new(Some("not a url")).is_err());
        assert!(UrlNormalizer::lenient(Some("not a url")).base().is_none());
    }
}
