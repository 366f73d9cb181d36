//! Static description of what a renderer reads from its node.

/// A node capability a renderer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Reads the named attribute.
    Attribute(&'static str),
    /// Reads margin/padding/border and explicit sizes.
    BoxModel,
    Children,
    /// Honours an `on_press` handler.
    Interaction,
    /// Honours accessibility props.
    Accessibility,
    /// Loads an external resource through the image source.
    ImageResource,
}

/// How the rendered element lays out its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    Block,
    Textual,
    /// Kind of the node decides (e.g. anchors).
    Mixed,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererModel {
    pub name: &'static str,
    pub content: ContentModel,
    pub capabilities: Vec<Capability>,
}

impl RendererModel {
    pub fn new(name: &'static str, content: ContentModel) -> Self {
        Self {
            name,
            content,
            capabilities: Vec::new(),
        }
    }

    pub fn with(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    pub fn reads(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub(crate) fn block() -> Self {
        Self::new("block", ContentModel::Block)
            .with(Capability::Children)
            .with(Capability::BoxModel)
            .with(Capability::Accessibility)
    }

    pub(crate) fn textual() -> Self {
        Self::new("text", ContentModel::Textual)
            .with(Capability::Children)
            .with(Capability::Accessibility)
    }

    pub(crate) fn anchor() -> Self {
        Self::new("anchor", ContentModel::Mixed)
            .with(Capability::Children)
            .with(Capability::BoxModel)
            .with(Capability::Attribute("href"))
            .with(Capability::Attribute("target"))
            .with(Capability::Interaction)
            .with(Capability::Accessibility)
    }

    pub(crate) fn image() -> Self {
        Self::new("img", ContentModel::None)
            .with(Capability::Attribute("src"))
            .with(Capability::Attribute("alt"))
            .with(Capability::Attribute("width"))
            .with(Capability::Attribute("height"))
            .with(Capability::BoxModel)
            .with(Capability::ImageResource)
            .with(Capability::Accessibility)
    }

    pub(crate) fn line_break() -> Self {
        Self::new("br", ContentModel::Textual)
    }
}

#[cfg(test)]
mod tests {
    use super::Capability;
    use super::RendererModel;

    #[test]
    fn anchor_model_reads_href_and_interaction() {
        let model = RendererModel::anchor();
        assert!(model.reads(Capability::Attribute("href")));
        assert!(model.reads(Capability::Interaction));
        assert!(!model.reads(Capability::ImageResource));
    }

    #[test]
    fn with_does_not_duplicate() {
        let model = RendererModel::textual().with(Capability::Children);
        assert_eq!(
            model
                .capabilities
                .iter()
                .filter(|c| **c == Capability::Children)
                .count(),
            1
        );
    }
}
