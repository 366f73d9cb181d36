//! Node dispatch and render sessions.

use crate::builtin;
use crate::config::RenderConfig;
use crate::element::NativeElement;
use crate::hooks::HookContext;
use crate::img::ImageLoadState;
use crate::img::ImageSource;
use crate::img::ImageStore;
use crate::img::ImgSnapshot;
use crate::path::NodePath;
use crate::props::TagProps;
use crate::registry::RendererRegistry;
use nh_core::RenderResult;
use nh_dom::Document;
use nh_dom::DocumentMetadata;
use nh_dom::DocumentNode;
use nh_net::UrlNormalizer;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;
use tracing::trace;
use tracing::warn;

/// Ambient context of one render pass, handed to every renderer.
pub struct RenderContext<'a> {
    pub config: &'a RenderConfig,
    pub metadata: &'a DocumentMetadata,
    registry: &'a RendererRegistry,
    normalizer: &'a UrlNormalizer,
    images: &'a mut ImageStore,
    path: NodePath,
}

impl RenderContext<'_> {
    /// Renders `node` with its registered renderer.
    ///
    /// Unregistered tags render their children only. A renderer error is
    /// logged and the node degrades to its children, so siblings are never
    /// affected.
    pub fn render_node(&mut self, node: &DocumentNode) -> NativeElement {
        if node.is_text() {
            return NativeElement::RawText(node.data.clone());
        }
        let registry = self.registry;
        let Some(registration) = node.tag_name().and_then(|tag| registry.lookup(tag)) else {
            trace!(tag = node.tag_name(), path = %self.path, "no renderer, rendering children");
            return NativeElement::Fragment(self.render_children(node));
        };

        let props = self.compose_props(node);
        match registration.render(props, self) {
            Ok(element) => element,
            Err(error) => {
                warn!(
                    tag = %registration.tag,
                    path = %self.path,
                    code = error.code(),
                    %error,
                    "renderer failed, rendering children"
                );
                NativeElement::Fragment(self.render_children(node))
            }
        }
    }

    pub fn render_children(&mut self, node: &DocumentNode) -> Vec<NativeElement> {
        let mut out = Vec::with_capacity(node.children.len());
        for (index, child) in node.children.iter().enumerate() {
            self.path.push(index);
            out.push(self.render_node(child));
            self.path.pop();
        }
        out
    }

    /// Renders with the built-in renderer of the props' tag, bypassing any
    /// caller registration.
    pub fn render_internal(&mut self, props: TagProps<'_>) -> RenderResult<NativeElement> {
        let registry = self.registry;
        match registry.internal(props.tag()) {
            Some(registration) => registration.render(props, self),
            None => Ok(self.render_default(props)),
        }
    }

    /// Generic container: a view for blocks, text for phrasing content.
    pub fn render_default(&mut self, props: TagProps<'_>) -> NativeElement {
        builtin::default_container(props, self)
    }

    /// Mounts the image instance of `props` and returns its current state
    /// and layout.
    pub fn use_img_state(&mut self, props: &TagProps<'_>) -> ImgSnapshot {
        let node = props.node;
        let uri = node
            .attribute("src")
            .and_then(|src| self.normalizer.normalize(src));
        let constraints = self.config.constraints_for(props.tag());
        let spec = nh_layout::resolve(&node.attributes, &props.style, &constraints);

        let state = self.images.mount(&props.path, uri.clone()).clone();
        let layout = match &state {
            ImageLoadState::Success { natural } => spec.finalize(*natural, &constraints),
            _ => spec,
        };

        ImgSnapshot {
            state,
            layout,
            uri,
            alt: node.attribute("alt").unwrap_or_default().to_owned(),
            initial_dimensions: self.config.renderers_props.img.initial_dimensions,
        }
    }

    pub fn hook_context(&self) -> HookContext<'_> {
        HookContext {
            config: self.config,
            metadata: self.metadata,
            normalizer: self.normalizer,
        }
    }

    pub fn normalize_url(&self, raw: &str) -> Option<String> {
        self.normalizer.normalize(raw)
    }

    pub fn content_width(&self) -> Option<f32> {
        self.config.content_width
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    fn compose_props<'n>(&self, node: &'n DocumentNode) -> TagProps<'n> {
        let mut props = TagProps::from_node(node, self.path.clone());
        let hooks = self.registry.hooks(props.tag());
        if hooks.is_empty() {
            return props;
        }

        let cx = self.hook_context();
        for hook in hooks {
            let patch = hook.apply(&props, &cx);
            if !patch.is_empty() {
                trace!(tag = props.tag(), hook = hook.name, "prop hook applied");
            }
            props.merge(patch);
        }
        props
    }
}

/// Owns the per-instance state of a document across render passes.
///
/// Call [`RenderSession::render`] for a pass and [`RenderSession::pump`]
/// whenever the image source may have reported back; render again when
/// `pump` reports changes.
pub struct RenderSession {
    registry: Arc<RendererRegistry>,
    config: Arc<RenderConfig>,
    images: ImageStore,
}

impl RenderSession {
    pub fn new(
        registry: Arc<RendererRegistry>,
        config: Arc<RenderConfig>,
        source: Rc<dyn ImageSource>,
    ) -> Self {
        Self {
            registry,
            config,
            images: ImageStore::new(source),
        }
    }

    pub fn render(&mut self, document: &Document) -> NativeElement {
        let normalizer = base_normalizer(
            document.metadata.base_url.as_deref(),
            self.config.base_url.as_deref(),
        );

        self.images.begin_pass();
        let element = {
            let mut cx = RenderContext {
                config: &self.config,
                metadata: &document.metadata,
                registry: &self.registry,
                normalizer: &normalizer,
                images: &mut self.images,
                path: NodePath::root(),
            };
            cx.render_node(&document.root)
        };
        self.images.end_pass();

        debug!(images = self.images.len(), "render pass complete");
        element
    }

    /// Applies pending fetch results. Returns the number of state changes.
    pub fn pump(&mut self) -> usize {
        self.images.pump()
    }

    pub fn image_state(&self, path: &NodePath) -> Option<&ImageLoadState> {
        self.images.state(path)
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }
}

/// Normalizer for a pass: the document `<base href>`, resolved against the
/// configured base when relative, else the configured base.
fn base_normalizer(document_base: Option<&str>, configured_base: Option<&str>) -> UrlNormalizer {
    let fallback = UrlNormalizer::lenient(configured_base);
    let Some(document_base) = document_base else {
        return fallback;
    };

    match UrlNormalizer::new(Some(document_base)) {
        Ok(normalizer) => normalizer,
        Err(error) => match fallback.normalize(document_base) {
            Some(joined) if fallback.base().is_some() => UrlNormalizer::lenient(Some(&joined)),
            _ => {
                debug!(code = error.code(), %error, "ignoring document base URL");
                fallback
            }
        },
    }
}
