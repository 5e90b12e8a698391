//! An id-indexed, read-only document tree for HTML and XML markup.

use std::convert::TryInto;
use std::fmt;
use std::iter;
use std::num::NonZeroU32;
use std::ops::Deref;

#[doc(no_inline)]
pub use html5ever::{Attribute, LocalName, Namespace, QualName};

#[doc(no_inline)]
pub use tendril::StrTendril;

mod extract;
mod node_ref;
mod serializer;
pub mod html;
pub mod xml;


pub use node_ref::{Ancestors, Descend, NodeRef};

/// Container for a tree of markup nodes.
///
/// Nodes live in a single vector and reference parents, siblings and
/// children by [`NodeId`] slot. A synthetic document node at the fixed
/// [`Document::DOCUMENT_NODE_ID`] owns the top level (root) nodes. A
/// document is immutable once built; the `u32` slot width caps it at
/// just under 2^32 nodes.
pub struct Document {
    kind: MarkupKind,
    nodes: Vec<Node>,
}

/// The markup flavor a document was built from.
///
/// HTML documents compare tag and attribute names ASCII
/// case-insensitively; XML documents compare exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkupKind {
    Html,
    Xml,
}

impl MarkupKind {
    #[inline]
    pub fn is_html(self) -> bool {
        self == MarkupKind::Html
    }
}

/// Identifies one node of one `Document`.
///
/// Internally a `u32` slot index; it is only meaningful to the document
/// that handed it out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NonZeroU32);

/// One slot of the node table: the payload plus the parent, sibling and
/// child links.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
}

/// The node kind and payload data associated with that kind.
#[derive(Clone, Debug)]
pub enum NodeData {
    /// The synthetic document node which contains all other nodes.
    Document,

    /// The document type declaration.
    Doctype(Doctype),

    /// Character data content.
    Text(StrTendril),

    /// Raw character data: script or style content, or a CDATA section.
    Data(Data),

    /// A comment.
    Comment(StrTendril),

    /// An element.
    Elem(Element),

    /// A processing instruction node.
    Pi(ProcessingInstruction),
}

/// Document type declaration details.
#[derive(Clone, Debug)]
pub struct Doctype {
    pub name: StrTendril,
    pub public_id: StrTendril,
    pub system_id: StrTendril,
}

/// Raw character data and its flavor.
#[derive(Clone, Debug)]
pub struct Data {
    pub content: StrTendril,
    pub kind: DataKind,
}

/// The flavor of a [`Data`] node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataKind {
    Script,
    Style,
    Cdata,
}

/// Processing instruction details.
#[derive(Clone, Debug)]
pub struct ProcessingInstruction {
    pub target: StrTendril,
    pub data: StrTendril,
}

/// An element: a qualified name plus its attributes, in source order.
#[derive(Clone, Debug)]
pub struct Element {
    pub name: QualName,
    pub attrs: Vec<Attribute>,
}

/// Core read access.
impl Document {
    /// The constant `NodeId` for the document node of all `Document`s.
    pub const DOCUMENT_NODE_ID: NodeId = NodeId(unsafe { NonZeroU32::new_unchecked(1) });

    pub(crate) fn new(kind: MarkupKind) -> Self {
        let mut nodes = Vec::with_capacity(8);
        nodes.push(Node::new(NodeData::Document)); // slot 0: reserved
        nodes.push(Node::new(NodeData::Document)); // slot 1: DOCUMENT_NODE_ID
        Document { kind, nodes }
    }

    /// Return the markup flavor this document was built from.
    #[inline]
    pub fn markup_kind(&self) -> MarkupKind {
        self.kind
    }

    /// Return the total number of nodes, excluding the synthetic document
    /// node.
    #[inline]
    pub fn len(&self) -> u32 {
        let nodes: u32 = self
            .nodes
            .len()
            .try_into()
            .expect("node count exceeds u32");
        debug_assert!(nodes >= 2);
        nodes - 2
    }

    /// Return true if this document contains no nodes beyond the synthetic
    /// document node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return an iterator over the top level nodes, in source order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children(Document::DOCUMENT_NODE_ID)
    }

    /// Return the root element `NodeId` for this Document, or None if there
    /// is no unambiguous root element.
    ///
    /// An element qualifies when it is the only element at the top level
    /// and shares it with no text or raw data.
    pub fn root_element(&self) -> Option<NodeId> {
        let mut found = None;
        for id in self.roots() {
            match &self[id].data {
                NodeData::Elem(_) => {
                    if found.is_some() {
                        return None;
                    }
                    found = Some(id);
                }
                NodeData::Text(_) | NodeData::Data(_) => return None,
                NodeData::Document => {
                    debug_assert!(false, "document node nested under itself");
                    return None;
                }
                _ => {}
            }
        }
        found
    }

    /// Return the parent of the given node, or `None` for top level nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        match self[id].parent {
            Some(p) if p != Document::DOCUMENT_NODE_ID => Some(p),
            _ => None,
        }
    }

    /// Return an iterator over the given node's direct children.
    ///
    /// Non-container nodes yield nothing.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self[id].first_child;
        iter::from_fn(move || {
            let id = next?;
            next = self[id].next_sibling;
            Some(id)
        })
    }

    /// Return an iterator over all strict descendants of the given node, in
    /// document order.
    pub fn descendants(&self, id: NodeId) -> Descend<'_> {
        Descend::new(self, id)
    }

    /// Return an iterator over the strict ancestors of the given node, from
    /// its parent up to a top level node.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, self.parent(id))
    }

    /// Return an iterator over the child list containing the given node,
    /// including the node itself. Empty for top level nodes.
    pub fn siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.parent(id).and_then(|p| self[p].first_child);
        iter::successors(first, move |&s| self[s].next_sibling)
    }

    /// Return an iterator over the siblings after the given node, in
    /// document order. Empty for top level nodes.
    pub fn following_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = if self.parent(id).is_some() {
            self[id].next_sibling
        } else {
            None
        };
        iter::successors(first, move |&s| self[s].next_sibling)
    }

    /// Return an iterator over the siblings before the given node, in
    /// reverse document order. Empty for top level nodes.
    pub fn preceding_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = if self.parent(id).is_some() {
            self[id].prev_sibling
        } else {
            None
        };
        iter::successors(first, move |&s| self[s].prev_sibling)
    }

    /// Return an iterator over every node of the document, in document
    /// order.
    pub fn walk(&self) -> Descend<'_> {
        self.descendants(Document::DOCUMENT_NODE_ID)
    }

    /// Return the unprocessed character data under the given node.
    ///
    /// Text and `Data` nodes yield their own content; elements and the
    /// document node yield every text descendant concatenated in tree
    /// order; other kinds yield `None`.
    pub fn text(&self, id: NodeId) -> Option<StrTendril> {
        match &self[id].data {
            NodeData::Text(t) => return Some(t.clone()),
            NodeData::Data(d) => return Some(d.content.clone()),
            NodeData::Elem(_) | NodeData::Document => {}
            _ => return None,
        }
        let mut out = StrTendril::new();
        for id in self.descendants(id) {
            if let NodeData::Text(t) = &self[id].data {
                out.push_tendril(t);
            }
        }
        Some(out)
    }
}

/// Tree construction internals, only for use while building from a parse
/// or a tuple-tree.
impl Document {
    /// Allocate a slot for the node and return its id. The node starts
    /// loose, with no place in the tree.
    pub(crate) fn push_node(&mut self, node: Node) -> NodeId {
        debug_assert!(
            !matches!(node.data, NodeData::Document),
            "refusing a second document node"
        );
        let slot = self.nodes.len();
        assert!(slot <= u32::MAX as usize, "node count exceeds u32");
        self.nodes.push(node);
        NodeId(NonZeroU32::new(slot as u32).expect("slot 0 is reserved"))
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0.get() as usize]
    }

    /// Allocate the node and wire it in as the last child of `parent`.
    pub(crate) fn append_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = self.push_node(node);
        self.append(parent, id);
        id
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        let prev = self[parent].last_child;
        self.splice_in(child, parent, prev, None);
    }

    pub(crate) fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        let parent = self[sibling]
            .parent
            .expect("cannot insert before a loose node");
        let prev = self[sibling].prev_sibling;
        self.splice_in(child, parent, prev, Some(sibling));
    }

    /// Wire `id` between `prev` and `next` under `parent`. A `None` on
    /// either side means that end of the child list, so the parent's
    /// `first_child`/`last_child` gets patched instead of a neighbor.
    fn splice_in(
        &mut self,
        id: NodeId,
        parent: NodeId,
        prev: Option<NodeId>,
        next: Option<NodeId>,
    ) {
        self.unlink(id);
        debug_assert!(
            matches!(self[parent].data, NodeData::Document | NodeData::Elem(_)),
            "node {:?} cannot hold children",
            parent
        );

        let node = self.node_mut(id);
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = next;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = Some(id),
            None => self.node_mut(parent).first_child = Some(id),
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = Some(id),
            None => self.node_mut(parent).last_child = Some(id),
        }
    }

    /// Take the node out of its child list, leaving it (and its subtree)
    /// loose. A no-op for nodes that are already loose.
    pub(crate) fn unlink(&mut self, id: NodeId) {
        assert!(
            id != Document::DOCUMENT_NODE_ID,
            "the document node stays put"
        );
        let node = self.node_mut(id);
        let prev = node.prev_sibling.take();
        let next = node.next_sibling.take();
        let parent = match node.parent.take() {
            Some(p) => p,
            None => {
                debug_assert!(
                    prev.is_none() && next.is_none(),
                    "loose node {:?} kept sibling links",
                    id
                );
                return;
            }
        };
        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
    }

    /// Replace the node with its children. Fragment parse fixup only; the
    /// unlinked node keeps its data but is no longer reachable.
    pub(crate) fn fold(&mut self, id: NodeId) {
        while let Some(child) = self[id].first_child {
            self.unlink(child);
            self.insert_before(id, child);
        }
        self.unlink(id);
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.nodes[1..]).finish()
    }
}

impl std::ops::Index<NodeId> for Document {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0.get() as usize]
    }
}

impl Element {
    pub(crate) fn new<LN>(lname: LN) -> Element
    where
        LN: Into<LocalName>,
    {
        Element {
            name: QualName::new(None, ns!(), lname.into()),
            attrs: Vec::new(),
        }
    }

    /// Return true if this element has the given local name.
    pub fn is_elem<LN>(&self, lname: LN) -> bool
    where
        LN: Into<LocalName>,
    {
        self.name.local == lname.into()
    }

    /// Return the first attribute value by local name, if present.
    pub fn attr<LN>(&self, lname: LN) -> Option<&StrTendril>
    where
        LN: Into<LocalName>,
    {
        let lname = lname.into();
        self.attrs.iter().find_map(|a| {
            if a.name.local == lname {
                Some(&a.value)
            } else {
                None
            }
        })
    }
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Node {
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            data,
        }
    }

    pub(crate) fn new_elem(element: Element) -> Node {
        Node::new(NodeData::Elem(element))
    }

    pub(crate) fn new_text<T>(text: T) -> Node
    where
        T: Into<StrTendril>,
    {
        Node::new(NodeData::Text(text.into()))
    }
}

impl Deref for Node {
    type Target = NodeData;

    #[inline]
    fn deref(&self) -> &NodeData {
        &self.data
    }
}

impl NodeData {
    /// Return `Element` if this is an element.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeData::Elem(data) => Some(data),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            NodeData::Elem(data) => Some(data),
            _ => None,
        }
    }

    /// Return text (char data) if this is a text node.
    pub fn as_text(&self) -> Option<&StrTendril> {
        match self {
            NodeData::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Return raw data content if this is a `Data` node.
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            NodeData::Data(d) => Some(d),
            _ => None,
        }
    }

    /// Return comment content if this is a comment node.
    pub fn as_comment(&self) -> Option<&StrTendril> {
        match self {
            NodeData::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Return true if this is an element node.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Elem(_))
    }

    /// Return attribute value by given local attribute name, if this is an
    /// element with that attribute present.
    pub fn attr<LN>(&self, lname: LN) -> Option<&StrTendril>
    where
        LN: Into<LocalName>,
    {
        self.as_element().and_then(|e| e.attr(lname))
    }

    /// Return true if this Node is an element with the given local name.
    pub fn is_elem<LN>(&self, lname: LN) -> bool
    where
        LN: Into<LocalName>,
    {
        match self.as_element() {
            Some(e) => e.is_elem(lname),
            None => false,
        }
    }
}
