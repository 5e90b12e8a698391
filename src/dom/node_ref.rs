use std::fmt;
use std::iter;
use std::ops::Deref;

use crate::dom::{Document, Node, NodeId, StrTendril};

/// A `Node` within `Document` lifetime reference.
///
/// This is both the traversal handle and the result type of selection:
/// equality holds if and only if two references point at the _same_
/// `Document` (by identity) with equal `NodeId`s.
#[derive(Copy, Clone)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    #[inline]
    pub fn new(doc: &'a Document, id: NodeId) -> Self {
        NodeRef { doc, id }
    }

    /// The node's id.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The document holding the node.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Return an iterator over this node's direct children.
    ///
    /// Non-container nodes yield nothing.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        iter::successors(self.first_child.map(|id| NodeRef::new(doc, id)), move |n| {
            n.next_sibling.map(|id| NodeRef::new(doc, id))
        })
    }

    /// Return an iterator over all strict descendants of this node, in
    /// document order.
    pub fn descendants(&self) -> Descend<'a> {
        self.doc.descendants(self.id)
    }

    /// Return an iterator over the strict ancestors of this node, from its
    /// parent up to a top level node.
    pub fn ancestors(&self) -> Ancestors<'a> {
        self.doc.ancestors(self.id)
    }

    /// Return any parent node or None.
    ///
    /// Top level nodes have no parent.
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        Some(NodeRef::new(self.doc, self.doc.parent(self.id)?))
    }

    /// Return any previous (left) sibling node or None.
    ///
    /// Top level nodes have no siblings.
    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.doc.parent(self.id)?;
        Some(NodeRef::new(self.doc, self.prev_sibling?))
    }

    /// Return any subsequent (right) sibling node or None.
    ///
    /// Top level nodes have no siblings.
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.doc.parent(self.id)?;
        Some(NodeRef::new(self.doc, self.next_sibling?))
    }

    /// Return the unprocessed character data under this node. See
    /// [`Document::text`].
    pub(crate) fn raw_text(&self) -> Option<StrTendril> {
        self.doc.text(self.id)
    }
}

impl<'a> Deref for NodeRef<'a> {
    type Target = Node;

    #[inline]
    fn deref(&self) -> &Node {
        &self.doc[self.id]
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef#{:?}@{:p}", self.id, self.doc)
    }
}

/// A depth-first iterator over the strict descendants of a node, returned
/// by [`Document::descendants`].
pub struct Descend<'a> {
    doc: &'a Document,
    pending: Vec<NodeId>,
}

impl<'a> Descend<'a> {
    pub(crate) fn new(doc: &'a Document, origin: NodeId) -> Self {
        Descend {
            doc,
            pending: doc[origin].first_child.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for Descend<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.pending.pop()?;
        let node = &self.doc[id];
        // Sibling pushed below the child keeps the walk depth-first.
        if let Some(s) = node.next_sibling {
            self.pending.push(s);
        }
        if let Some(c) = node.first_child {
            self.pending.push(c);
        }
        Some(id)
    }
}

/// An iterator over strict ancestors, returned by [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(doc: &'a Document, next: Option<NodeId>) -> Self {
        Ancestors { doc, next }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next.take()?;
        self.next = self.doc.parent(id);
        Some(id)
    }
}

/// `NodeRef` convenience accessors.
impl Document {
    /// Return a `NodeRef` for the given node id.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef::new(self, id)
    }

    /// Return the root element `NodeRef` for this `Document`, or `None` if
    /// there is no unambiguous root element.
    pub fn root_element_ref(&self) -> Option<NodeRef<'_>> {
        self.root_element().map(|r| NodeRef::new(self, r))
    }
}
