//! The tuple-tree interchange form.
//!
//! A tuple-tree is the parser-boundary shape of a document: a node is
//! either a string of character data or a `(tag, attributes, children)`
//! element. Non-element node kinds travel under sentinel tags, chosen to
//! never collide with real markup names.

use crate::dom::{
    Data, DataKind, Doctype, Document, Element, LocalName, MarkupKind, Node, NodeData, NodeId,
    NodeRef, ProcessingInstruction, QualName,
};
use crate::error::Error;

/// Sentinel tag for document type declarations.
pub const DOCTYPE_TAG: &str = "-doctype";
/// Sentinel tag for comments.
pub const COMMENT_TAG: &str = "-comment";
/// Sentinel tag for processing instructions.
pub const PI_TAG: &str = "-pi";
/// Sentinel tag for CDATA sections.
pub const CDATA_TAG: &str = "-cdata";

/// One node of a tuple-tree.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode {
    /// Character data.
    Text(String),
    /// An element, or a sentinel-tagged non-element node.
    Node {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    /// Construct a text node.
    pub fn text(content: impl Into<String>) -> TreeNode {
        TreeNode::Text(content.into())
    }

    /// Construct an element node.
    pub fn node(
        tag: impl Into<String>,
        attrs: Vec<(String, String)>,
        children: Vec<TreeNode>,
    ) -> TreeNode {
        TreeNode::Node {
            tag: tag.into(),
            attrs,
            children,
        }
    }
}

/// Build a `Document` from tuple-tree roots, in source order.
///
/// Ids are assigned in a single depth-first pre-order pass. In HTML mode,
/// tags and attribute names are lowercased and the text children of
/// `script` and `style` elements become raw data nodes.
pub fn build(roots: Vec<TreeNode>, kind: MarkupKind) -> Result<Document, Error> {
    let mut doc = Document::new(kind);
    for root in roots {
        append_tree(&mut doc, Document::DOCUMENT_NODE_ID, root, kind)?;
    }
    Ok(doc)
}

fn append_tree(
    doc: &mut Document,
    parent: NodeId,
    node: TreeNode,
    kind: MarkupKind,
) -> Result<(), Error> {
    match node {
        TreeNode::Text(s) => {
            let data = match text_data_kind(doc, parent, kind) {
                Some(k) => NodeData::Data(Data {
                    content: s.into(),
                    kind: k,
                }),
                None => NodeData::Text(s.into()),
            };
            doc.append_child(parent, Node::new(data));
        }
        TreeNode::Node {
            tag,
            attrs,
            children,
        } => match tag.as_str() {
            COMMENT_TAG => {
                let content = sentinel_content(COMMENT_TAG, &attrs, children)?;
                doc.append_child(parent, Node::new(NodeData::Comment(content.into())));
            }
            CDATA_TAG => {
                let content = sentinel_content(CDATA_TAG, &attrs, children)?;
                doc.append_child(
                    parent,
                    Node::new(NodeData::Data(Data {
                        content: content.into(),
                        kind: DataKind::Cdata,
                    })),
                );
            }
            PI_TAG => {
                if !children.is_empty() {
                    return Err(Error::MalformedTree(format!(
                        "{} node with children",
                        PI_TAG
                    )));
                }
                let target = named_attr(&attrs, "target").ok_or_else(|| {
                    Error::MalformedTree(format!("{} node without target", PI_TAG))
                })?;
                let data = named_attr(&attrs, "data").unwrap_or_default();
                doc.append_child(
                    parent,
                    Node::new(NodeData::Pi(ProcessingInstruction {
                        target: target.into(),
                        data: data.into(),
                    })),
                );
            }
            DOCTYPE_TAG => {
                if !children.is_empty() {
                    return Err(Error::MalformedTree(format!(
                        "{} node with children",
                        DOCTYPE_TAG
                    )));
                }
                let name = named_attr(&attrs, "name").ok_or_else(|| {
                    Error::MalformedTree(format!("{} node without name", DOCTYPE_TAG))
                })?;
                doc.append_child(
                    parent,
                    Node::new(NodeData::Doctype(Doctype {
                        name: name.into(),
                        public_id: named_attr(&attrs, "public").unwrap_or_default().into(),
                        system_id: named_attr(&attrs, "system").unwrap_or_default().into(),
                    })),
                );
            }
            _ => {
                let element = Element {
                    name: tag_name(&tag, kind),
                    attrs: attrs
                        .into_iter()
                        .map(|(name, value)| html5ever::Attribute {
                            name: tag_name(&name, kind),
                            value: value.into(),
                        })
                        .collect(),
                };
                let id = doc.append_child(parent, Node::new_elem(element));
                for child in children {
                    append_tree(doc, id, child, kind)?;
                }
            }
        },
    }
    Ok(())
}

fn text_data_kind(doc: &Document, parent: NodeId, kind: MarkupKind) -> Option<DataKind> {
    if !kind.is_html() {
        return None;
    }
    let elm = doc[parent].as_element()?;
    if elm.is_elem(local_name!("script")) {
        Some(DataKind::Script)
    } else if elm.is_elem(local_name!("style")) {
        Some(DataKind::Style)
    } else {
        None
    }
}

fn sentinel_content(
    tag: &str,
    attrs: &[(String, String)],
    children: Vec<TreeNode>,
) -> Result<String, Error> {
    if !attrs.is_empty() {
        return Err(Error::MalformedTree(format!("{} node with attributes", tag)));
    }
    let mut content = String::new();
    for child in children {
        match child {
            TreeNode::Text(s) => content.push_str(&s),
            TreeNode::Node { .. } => {
                return Err(Error::MalformedTree(format!(
                    "{} node with element children",
                    tag
                )));
            }
        }
    }
    Ok(content)
}

fn named_attr(attrs: &[(String, String)], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.clone())
}

fn tag_name(raw: &str, kind: MarkupKind) -> QualName {
    match kind {
        MarkupKind::Html => QualName::new(
            None,
            ns!(),
            LocalName::from(raw.to_ascii_lowercase().as_str()),
        ),
        MarkupKind::Xml => match raw.find(':') {
            Some(i) if i > 0 && i + 1 < raw.len() => QualName {
                prefix: Some(raw[..i].into()),
                ns: ns!(),
                local: raw[i + 1..].into(),
            },
            _ => QualName::new(None, ns!(), LocalName::from(raw)),
        },
    }
}

/// Tuple-tree export.
impl Document {
    /// Export the top level nodes as tuple-trees, in source order.
    pub fn tree(&self) -> Vec<TreeNode> {
        self.roots().map(|id| export(self.node(id))).collect()
    }
}

impl<'a> NodeRef<'a> {
    /// Export this node and its descendants as a tuple-tree.
    pub fn tree(&self) -> TreeNode {
        export(*self)
    }
}

fn export(node: NodeRef<'_>) -> TreeNode {
    match &node.document()[node.id()].data {
        NodeData::Document => {
            debug_assert!(false, "export of the synthetic document node");
            TreeNode::Text(String::new())
        }
        NodeData::Elem(elm) => TreeNode::Node {
            tag: qualified(&elm.name),
            attrs: elm
                .attrs
                .iter()
                .map(|a| (qualified(&a.name), a.value.to_string()))
                .collect(),
            children: node.children().map(export).collect(),
        },
        NodeData::Text(t) => TreeNode::Text(t.to_string()),
        NodeData::Data(d) => match d.kind {
            DataKind::Cdata => TreeNode::Node {
                tag: CDATA_TAG.into(),
                attrs: vec![],
                children: vec![TreeNode::Text(d.content.to_string())],
            },
            DataKind::Script | DataKind::Style => TreeNode::Text(d.content.to_string()),
        },
        NodeData::Comment(t) => TreeNode::Node {
            tag: COMMENT_TAG.into(),
            attrs: vec![],
            children: vec![TreeNode::Text(t.to_string())],
        },
        NodeData::Doctype(dt) => {
            let mut attrs = vec![("name".to_string(), dt.name.to_string())];
            if !dt.public_id.is_empty() {
                attrs.push(("public".to_string(), dt.public_id.to_string()));
            }
            if !dt.system_id.is_empty() {
                attrs.push(("system".to_string(), dt.system_id.to_string()));
            }
            TreeNode::Node {
                tag: DOCTYPE_TAG.into(),
                attrs,
                children: vec![],
            }
        }
        NodeData::Pi(pi) => TreeNode::Node {
            tag: PI_TAG.into(),
            attrs: vec![
                ("target".to_string(), pi.target.to_string()),
                ("data".to_string(), pi.data.to_string()),
            ],
            children: vec![],
        },
    }
}

fn qualified(name: &QualName) -> String {
    match &name.prefix {
        Some(p) => format!("{}:{}", p, name.local),
        None => name.local.to_string(),
    }
}
