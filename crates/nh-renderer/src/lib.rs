//! Pipeline from markup to a native element tree.

use nh_core::RenderResult;
use nh_dom::Document;
use nh_html::HtmlParser;
use nh_render::ImageLoadState;
use nh_render::ImageSource;
use nh_render::NativeElement;
use nh_render::NodePath;
use nh_render::RenderConfig;
use nh_render::RenderSession;
use nh_render::RendererRegistry;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Shared, immutable rendering setup: registry and configuration.
///
/// Cheap to clone; every loaded document gets its own session.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    html: HtmlParser,
    registry: Arc<RendererRegistry>,
    config: Arc<RenderConfig>,
}

impl HtmlRenderer {
    pub fn new(registry: RendererRegistry, config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;
        Ok(Self {
            html: HtmlParser,
            registry: Arc::new(registry),
            config: Arc::new(config),
        })
    }

    /// Built-in renderers with the given configuration.
    pub fn with_config(config: RenderConfig) -> RenderResult<Self> {
        Self::new(RendererRegistry::builtin()?, config)
    }

    /// Same registry, configuration rebased on `base`.
    pub fn with_base_url(&self, base: impl Into<String>) -> Self {
        let mut config = RenderConfig::clone(&self.config);
        config.base_url = Some(base.into());
        Self {
            html: self.html,
            registry: Arc::clone(&self.registry),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &RendererRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Parses `html` and runs a first render pass.
    pub fn load(&self, html: &str, source: Rc<dyn ImageSource>) -> RenderedDocument {
        let document = self.html.parse(html);
        let mut session = RenderSession::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.config),
            source,
        );
        let tree = session.render(&document);
        RenderedDocument {
            html: self.html,
            document,
            session,
            tree,
        }
    }
}

/// A document together with its render session and latest tree.
pub struct RenderedDocument {
    html: HtmlParser,
    document: Document,
    session: RenderSession,
    tree: NativeElement,
}

impl RenderedDocument {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &NativeElement {
        &self.tree
    }

    pub fn session(&self) -> &RenderSession {
        &self.session
    }

    /// Applies pending resource results and re-renders if anything changed.
    /// Returns whether the tree changed.
    pub fn pump(&mut self) -> bool {
        let changes = self.session.pump();
        if changes == 0 {
            return false;
        }
        debug!(changes, "re-rendering after image updates");
        self.rerender();
        true
    }

    pub fn rerender(&mut self) {
        self.tree = self.session.render(&self.document);
    }

    /// Replaces the markup while keeping per-instance state, so images whose
    /// source is unchanged keep their state and changed sources restart.
    pub fn update(&mut self, html: &str) {
        self.document = self.html.parse(html);
        self.rerender();
    }

    /// Mounted image instances in document order.
    pub fn image_paths(&self) -> Vec<NodePath> {
        self.session.images().paths()
    }

    pub fn image_state(&self, path: &NodePath) -> Option<&ImageLoadState> {
        self.session.image_state(path)
    }
}
