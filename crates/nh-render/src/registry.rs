//! Tag → renderer registry.
//!
//! A registry is assembled once with [`RendererRegistryBuilder`] and then
//! shared read-only (it is `Send + Sync`) by every render pass that uses it.

use crate::builtin;
use crate::element::NativeElement;
use crate::hooks;
use crate::hooks::HookContext;
use crate::model::Capability;
use crate::model::RendererModel;
use crate::props::PropsPatch;
use crate::props::TagProps;
use crate::session::RenderContext;
use nh_core::RenderError;
use nh_core::RenderResult;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub type RenderFn =
    dyn Fn(TagProps<'_>, &mut RenderContext<'_>) -> RenderResult<NativeElement> + Send + Sync;

pub type PropHookFn = dyn Fn(&TagProps<'_>, &HookContext<'_>) -> PropsPatch + Send + Sync;

/// The active renderer of one tag.
#[derive(Clone)]
pub struct RendererRegistration {
    pub tag: String,
    pub model: RendererModel,
    render: Arc<RenderFn>,
}

impl RendererRegistration {
    pub fn render(
        &self,
        props: TagProps<'_>,
        cx: &mut RenderContext<'_>,
    ) -> RenderResult<NativeElement> {
        (self.render)(props, cx)
    }
}

impl fmt::Debug for RendererRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistration")
            .field("tag", &self.tag)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// A capability-scoped prop transform.
#[derive(Clone)]
pub struct PropHook {
    pub name: &'static str,
    /// Capability the tag's renderer must declare for the hook's output to
    /// have any effect.
    pub requires: Capability,
    apply: Arc<PropHookFn>,
}

impl PropHook {
    pub fn apply(&self, props: &TagProps<'_>, cx: &HookContext<'_>) -> PropsPatch {
        (self.apply)(props, cx)
    }
}

impl fmt::Debug for PropHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropHook")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

pub struct RendererRegistry {
    renderers: HashMap<String, RendererRegistration>,
    internal: HashMap<String, RendererRegistration>,
    hooks: HashMap<String, Vec<PropHook>>,
}

impl RendererRegistry {
    pub fn builder() -> RendererRegistryBuilder {
        RendererRegistryBuilder::new()
    }

    /// Registry holding only the built-in renderers and hooks.
    pub fn builtin() -> RenderResult<Self> {
        Self::builder().build()
    }

    pub fn lookup(&self, tag: &str) -> Option<&RendererRegistration> {
        self.renderers.get(tag)
    }

    /// Built-in renderer of `tag`, even when a caller renderer replaced it.
    pub fn internal(&self, tag: &str) -> Option<&RendererRegistration> {
        self.internal.get(tag)
    }

    /// Hooks of `tag` in registration order.
    pub fn hooks(&self, tag: &str) -> &[PropHook] {
        self.hooks.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn model(&self, tag: &str) -> Option<&RendererModel> {
        self.lookup(tag).map(|registration| &registration.model)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags = self.tags().collect::<Vec<_>>();
        tags.sort_unstable();
        f.debug_struct("RendererRegistry")
            .field("tags", &tags)
            .field("hooked_tags", &self.hooks.len())
            .finish()
    }
}

pub struct RendererRegistryBuilder {
    renderers: HashMap<String, RendererRegistration>,
    internal: HashMap<String, RendererRegistration>,
    hooks: HashMap<String, Vec<PropHook>>,
}

impl Default for RendererRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererRegistryBuilder {
    /// Starts from the built-in renderers and hooks.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        for (tag, model, render) in builtin::renderers() {
            builder = builder.register(tag, model, render);
        }
        builder.internal = builder.renderers.clone();
        builder.prop_hook("a", "anchor", Capability::Interaction, hooks::anchor_hook)
    }

    /// Starts with nothing registered: every tag falls back to children-only
    /// rendering.
    pub fn empty() -> Self {
        Self {
            renderers: HashMap::new(),
            internal: HashMap::new(),
            hooks: HashMap::new(),
        }
    }

    /// Makes `render` the active renderer of `tag`, replacing any previous
    /// registration.
    pub fn register(
        mut self,
        tag: &str,
        model: RendererModel,
        render: impl Fn(TagProps<'_>, &mut RenderContext<'_>) -> RenderResult<NativeElement>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        let tag = normalize_tag(tag);
        let registration = RendererRegistration {
            tag: tag.clone(),
            model,
            render: Arc::new(render),
        };
        if let Some(previous) = self.renderers.insert(tag.clone(), registration) {
            debug!(tag = %tag, replaced = previous.model.name, "renderer replaced");
        }
        self
    }

    /// Appends a prop hook for `tag`. Hooks run in registration order.
    pub fn prop_hook(
        mut self,
        tag: &str,
        name: &'static str,
        requires: Capability,
        hook: impl Fn(&TagProps<'_>, &HookContext<'_>) -> PropsPatch + Send + Sync + 'static,
    ) -> Self {
        self.hooks.entry(normalize_tag(tag)).or_default().push(PropHook {
            name,
            requires,
            apply: Arc::new(hook),
        });
        self
    }

    pub fn build(self) -> RenderResult<RendererRegistry> {
        for tag in self.renderers.keys().chain(self.hooks.keys()) {
            validate_tag(tag)?;
        }

        for (tag, hooks) in &self.hooks {
            let Some(registration) = self.renderers.get(tag) else {
                return Err(RenderError::invalid_config(
                    "render.registry.hook_without_renderer",
                    format!("prop hook registered for <{tag}> which has no renderer"),
                ));
            };
            if let Some(hook) = hooks
                .iter()
                .find(|hook| !registration.model.reads(hook.requires))
            {
                return Err(RenderError::invalid_config(
                    "render.registry.capability_missing",
                    format!(
                        "renderer `{}` for <{tag}> does not declare {:?} required by hook `{}`",
                        registration.model.name, hook.requires, hook.name
                    ),
                ));
            }
        }

        debug!(
            renderers = self.renderers.len(),
            hooked_tags = self.hooks.len(),
            "renderer registry built"
        );

        Ok(RendererRegistry {
            renderers: self.renderers,
            internal: self.internal,
            hooks: self.hooks,
        })
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_ascii_lowercase()
}

fn validate_tag(tag: &str) -> RenderResult<()> {
    if tag.is_empty() {
        return Err(RenderError::invalid_config(
            "render.registry.tag_empty",
            "renderer tag must not be empty",
        ));
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':')
    {
        return Err(RenderError::invalid_config(
            "render.registry.tag_invalid",
            format!("`{tag}` is not a valid tag name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::RendererRegistry;
    use super::RendererRegistryBuilder;
    use crate::element::NativeElement;
    use crate::model::Capability;
    use crate::model::ContentModel;
    use crate::model::RendererModel;
    use crate::props::PropsPatch;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn registry_is_shareable_across_threads() {
        assert_send_sync::<RendererRegistry>();
    }

    #[test]
    fn builtin_registry_covers_common_tags() {
        let registry = match RendererRegistry::builtin() {
            Ok(registry) => registry,
            Err(e) => panic!("{e}"),
        };
        for tag in ["a", "img", "div", "p", "span", "br"] {
            assert!(registry.lookup(tag).is_some(), "missing <{tag}>");
        }
        assert_eq!(registry.hooks("a").len(), 1);
        assert!(registry.hooks("img").is_empty());
        assert!(registry.lookup("blink").is_none());
    }

    #[test]
    fn later_registration_replaces_and_keeps_internal() {
        let registry = match RendererRegistryBuilder::new()
            .register(
                "IMG",
                RendererModel::new("custom-img", ContentModel::None),
                |_, _| Ok(NativeElement::Fragment(Vec::new())),
            )
            .build()
        {
            Ok(registry) => registry,
            Err(e) => panic!("{e}"),
        };
        assert_eq!(registry.model("img").map(|m| m.name), Some("custom-img"));
        assert_eq!(registry.internal("img").map(|r| r.model.name), Some("img"));
    }

    #[test]
    fn rejects_empty_tag() {
        let result = RendererRegistryBuilder::empty()
            .register(" ", RendererModel::new("x", ContentModel::Block), |_, _| {
                Ok(NativeElement::Fragment(Vec::new()))
            })
            .build();
        assert!(matches!(result, Err(e) if e.code() == "render.registry.tag_empty"));
    }

    #[test]
    fn rejects_hook_without_renderer() {
        let result = RendererRegistryBuilder::empty()
            .prop_hook("a", "noop", Capability::Interaction, |_, _| {
                PropsPatch::default()
            })
            .build();
        assert!(matches!(
            result,
            Err(e) if e.code() == "render.registry.hook_without_renderer"
        ));
    }

    #[test]
    fn rejects_renderer_missing_hook_capability() {
        let result = RendererRegistryBuilder::new()
            .register(
                "a",
                RendererModel::new("plain-anchor", ContentModel::Textual),
                |_, _| Ok(NativeElement::Fragment(Vec::new())),
            )
            .build();
        assert!(matches!(
            result,
            Err(e) if e.code() == "render.registry.capability_missing"
        ));
    }
}
