//! Generic node matchers, independent of any selector grammar.

use crate::dom::{NodeData, NodeRef};
use crate::select::{Context, Selector};

/// The node kinds a [`NodeKindMatcher`] can target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    Data,
    Doctype,
    Pi,
    /// Any node that is not an element.
    NonElement,
}

/// Matches nodes of a single kind.
#[derive(Copy, Clone, Debug)]
pub struct NodeKindMatcher(pub NodeKind);

impl Selector for NodeKindMatcher {
    fn is_match(&self, node: NodeRef<'_>, _ctx: &Context) -> bool {
        let data = &node.document()[node.id()].data;
        match self.0 {
            NodeKind::Element => matches!(data, NodeData::Elem(_)),
            NodeKind::Text => matches!(data, NodeData::Text(_)),
            NodeKind::Comment => matches!(data, NodeData::Comment(_)),
            NodeKind::Data => matches!(data, NodeData::Data(_)),
            NodeKind::Doctype => matches!(data, NodeData::Doctype(_)),
            NodeKind::Pi => matches!(data, NodeData::Pi(_)),
            NodeKind::NonElement => {
                !matches!(data, NodeData::Elem(_) | NodeData::Document)
            }
        }
    }
}

/// Matches only top level nodes.
#[derive(Copy, Clone, Debug)]
pub struct RootMatcher;

impl Selector for RootMatcher {
    fn is_match(&self, node: NodeRef<'_>, _ctx: &Context) -> bool {
        node.parent().is_none()
    }
}
