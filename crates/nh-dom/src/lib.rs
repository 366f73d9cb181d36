//! Typed document tree handed from the parsing stage to the renderers.
//!
//! Nodes are built once and then only borrowed: a render pass never mutates
//! the tree it renders.

use nh_css::StyleRecord;

/// Coarse content category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Element establishing a block box (`div`, `p`, `img`, ...).
    Block,
    /// Inline element whose children flow as text (`a`, `span`, `em`, ...).
    Phrasing,
    /// A run of character data.
    Text,
}

impl NodeKind {
    /// Default kind for an element with the given (lowercase) tag name.
    pub fn for_tag(tag: &str) -> Self {
        if is_block_tag(tag) {
            Self::Block
        } else {
            Self::Phrasing
        }
    }
}

/// Attribute mapping that keeps source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or replaces `name`, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

/// One element or text run of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    pub kind: NodeKind,
    /// `None` for anonymous text runs.
    pub tag_name: Option<String>,
    pub attributes: Attributes,
    /// Post-cascade style; inline `style` declarations already applied.
    pub style: StyleRecord,
    /// Character data for [`NodeKind::Text`] nodes, empty otherwise.
    pub data: String,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn element(tag: impl Into<String>) -> Self {
        let tag = tag.into().to_ascii_lowercase();
        Self {
            kind: NodeKind::for_tag(&tag),
            tag_name: Some(tag),
            attributes: Attributes::new(),
            style: StyleRecord::default(),
            data: String::new(),
            children: Vec::new(),
        }
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text,
            tag_name: None,
            attributes: Attributes::new(),
            style: StyleRecord::default(),
            data: data.into(),
            children: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn with_style(mut self, style: StyleRecord) -> Self {
        self.style = style;
        self
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    /// Concatenated character data of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn find_first(&self, tag: &str) -> Option<&DocumentNode> {
        if self.tag_name() == Some(tag) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_first(tag))
    }
}

fn collect_text(node: &DocumentNode, out: &mut String) {
    if node.is_text() {
        out.push_str(&node.data);
        return;
    }
    for child in &node.children {
        collect_text(child, out);
    }
}

/// Document-wide facts readable by every node during a render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    /// `<base href>` of the document.
    pub base_url: Option<String>,
    /// `<base target>` of the document.
    pub base_target: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: DocumentNode,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn new(root: DocumentNode) -> Self {
        Self {
            root,
            metadata: DocumentMetadata::default(),
        }
    }

    pub fn empty() -> Self {
        Self::new(DocumentNode::element("document"))
    }

    pub fn has_content(&self) -> bool {
        !self.root.children.is_empty()
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "document"
            | "html"
            | "body"
            | "main"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "nav"
            | "aside"
            | "address"
            | "div"
            | "p"
            | "pre"
            | "hr"
            | "form"
            | "fieldset"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dt"
            | "dd"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "figure"
            | "figcaption"
            | "table"
            | "tr"
            | "td"
            | "th"
            | "blockquote"
            | "img"
            | "video"
            | "iframe"
    )
}
