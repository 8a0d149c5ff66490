use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

pub const TEXT_KIND: &str = "#text";
const DOCUMENT_KIND: &str = "#document";

/// Read-only view of one parsed HTML node.
///
/// `text` is the concatenated text of every descendant text node, computed
/// once when the node is built.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub kind: String,
    pub classes: Option<Vec<String>>,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Node {
    pub fn element(kind: &str, classes: Option<&str>, children: Vec<Node>) -> Self {
        let text = children.iter().map(|c| c.text.as_str()).collect();
        let classes: Option<Vec<String>> =
            classes.map(|c| c.split_whitespace().map(str::to_string).collect());
        let attrs = classes
            .as_ref()
            .map(|c| vec![("class".to_string(), c.join(" "))])
            .unwrap_or_default();
        Node {
            kind: kind.to_ascii_lowercase(),
            classes,
            attrs,
            text,
            children,
        }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Node {
            kind: TEXT_KIND.to_string(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.classes
            .as_ref()
            .is_some_and(|c| c.iter().any(|t| t == token))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whitespace-only text between block elements.
    pub fn is_blank_text(&self) -> bool {
        self.is(TEXT_KIND) && self.text.trim().is_empty()
    }

    /// This node and its descendants of the given kind, in document order.
    pub fn find_all<'a>(&'a self, kind: &str) -> Vec<&'a Node> {
        let mut out = Vec::new();
        collect_kind(self, kind, &mut out);
        out
    }

    /// True when a strict descendant has the given kind.
    pub fn contains(&self, kind: &str) -> bool {
        self.children
            .iter()
            .any(|c| c.is(kind) || c.contains(kind))
    }
}

fn collect_kind<'a>(node: &'a Node, kind: &str, out: &mut Vec<&'a Node>) {
    if node.is(kind) {
        out.push(node);
    }
    for child in &node.children {
        collect_kind(child, kind, out);
    }
}

/// A parsed catalogue document.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: Node,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let root = convert(&dom.document)
            .unwrap_or_else(|| Node::element(DOCUMENT_KIND, None, Vec::new()));
        Document { root }
    }

    #[cfg(test)]
    pub fn from_root(root: Node) -> Self {
        Document { root }
    }

    /// Siblings after the first node (depth first, document order) matching
    /// `pred`. `None` when nothing matches.
    pub fn following_siblings<F>(&self, pred: F) -> Option<&[Node]>
    where
        F: Fn(&Node) -> bool,
    {
        find_following(&self.root, &pred)
    }
}

fn find_following<'a, F>(node: &'a Node, pred: &F) -> Option<&'a [Node]>
where
    F: Fn(&Node) -> bool,
{
    for (i, child) in node.children.iter().enumerate() {
        if pred(child) {
            return Some(&node.children[i + 1..]);
        }
        if let Some(found) = find_following(child, pred) {
            return Some(found);
        }
    }
    None
}

fn convert(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Document => Some(Node::element(DOCUMENT_KIND, None, convert_children(handle))),
        NodeData::Text { contents } => Some(Node::text_node(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attrs: Vec<(String, String)> = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let children = convert_children(handle);
            let text = children.iter().map(|c| c.text.as_str()).collect();
            let classes = attrs
                .iter()
                .find(|(k, _)| k == "class")
                .map(|(_, v)| v.split_whitespace().map(str::to_string).collect());
            Some(Node {
                kind: name.local.to_string().to_ascii_lowercase(),
                classes,
                attrs,
                text,
                children,
            })
        }
        // comments, doctypes, processing instructions
        _ => None,
    }
}

fn convert_children(handle: &Handle) -> Vec<Node> {
    handle.children.borrow().iter().filter_map(convert).collect()
}
