//! Support for html5 parsing to `Document`.

use std::borrow::Cow;
use std::default::Default;

use html5ever::interface::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, parse_fragment, ExpandedName, QualName};
use log::debug;

use crate::dom::{
    Attribute, Data, DataKind, Doctype, Document, Element, MarkupKind, Node, NodeData, NodeId,
    ProcessingInstruction, StrTendril,
};

pub mod meta;

/// Parse an HTML document from UTF-8 bytes in RAM.
pub fn parse_utf8(bytes: &[u8]) -> Document {
    let sink = Sink::default();
    parse_document(sink, Default::default())
        .from_utf8()
        .one(bytes)
}

/// Parse an HTML fragment from UTF-8 bytes in RAM.
///
/// A single root element is guaranteed. If the provided fragment does not
/// contain a single non-phrasing element, a root `<div>` element is
/// included as parent.
pub fn parse_utf8_fragment(bytes: &[u8]) -> Document {
    let mut doc = parse_fragment(
        Sink::default(),
        Default::default(),
        QualName::new(None, ns!(html), local_name!("div")),
        vec![],
    )
    .from_utf8()
    .one(bytes);

    // html5ever drives fragment parsing through a synthetic "html" root;
    // the div context element passed above never gets linked into the
    // tree, so the parse always comes back rooted at "html".
    let root_id = doc.root_element().expect("fragment parse yields a root");
    debug_assert!(doc[root_id].is_elem(local_name!("html")));

    // A lone block-level child can stand on its own as the fragment root.
    let lone = {
        let mut kids = doc.children(root_id);
        match (kids.next(), kids.next()) {
            (Some(k), None) => Some(k),
            _ => None,
        }
    };
    if let Some(child) = lone {
        let block = doc[child]
            .as_element()
            .map_or(false, |e| !meta::INLINE_TAGS.contains(&e.name.local));
        if block {
            doc.fold(root_id);
            debug_assert!(doc.root_element().is_some());
            return doc;
        }
    }

    // Everything else keeps the wrapper, renamed from "html" to the div
    // that was requested as fragment context in the first place.
    let root = doc
        .node_mut(root_id)
        .data
        .as_element_mut()
        .expect("fragment root is an element");
    *root = Element::new(local_name!("div"));
    debug_assert!(doc.root_element().is_some());
    doc
}

/// A `TreeSink` implementation for parsing html to a
/// [`Document`](crate::Document) tree.
pub struct Sink {
    document: Document,
    #[allow(unused)]
    quirks_mode: QuirksMode,
}

/// Where the tree builder wants a new child wired in.
#[derive(Copy, Clone)]
enum Place {
    LastUnder(NodeId),
    Before(NodeId),
}

impl Sink {
    fn new_node(&mut self, data: NodeData) -> NodeId {
        self.document.push_node(Node::new(data))
    }

    /// The `DataKind` for raw text appended under the given parent, if any.
    fn data_kind(&self, parent: Option<NodeId>) -> Option<DataKind> {
        let elm = parent.and_then(|p| self.document[p].as_element())?;
        if elm.is_elem(local_name!("script")) {
            Some(DataKind::Script)
        } else if elm.is_elem(local_name!("style")) {
            Some(DataKind::Style)
        } else {
            None
        }
    }

    fn insert(&mut self, place: Place, child: NodeOrText<NodeId>) {
        let (parent, prev) = match place {
            Place::LastUnder(p) => (Some(p), self.document[p].last_child),
            Place::Before(s) => (self.document[s].parent, self.document[s].prev_sibling),
        };
        let id = match child {
            NodeOrText::AppendNode(id) => id,
            NodeOrText::AppendText(text) => {
                let kind = self.data_kind(parent);
                // Consecutive character data of the same flavor merges
                // into the neighboring node.
                if let Some(prev) = prev {
                    match (&mut self.document.node_mut(prev).data, kind) {
                        (NodeData::Text(t), None) => {
                            t.push_tendril(&text);
                            return;
                        }
                        (NodeData::Data(d), Some(k)) if d.kind == k => {
                            d.content.push_tendril(&text);
                            return;
                        }
                        _ => {}
                    }
                }
                match kind {
                    Some(kind) => self.new_node(NodeData::Data(Data {
                        content: text,
                        kind,
                    })),
                    None => self.new_node(NodeData::Text(text)),
                }
            }
        };
        match place {
            Place::LastUnder(p) => self.document.append(p, id),
            Place::Before(s) => self.document.insert_before(s, id),
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Sink {
            document: Document::new(MarkupKind::Html),
            quirks_mode: QuirksMode::NoQuirks,
        }
    }
}

impl TreeSink for Sink {
    type Handle = NodeId;
    type Output = Document;

    fn finish(self) -> Document {
        self.document
    }

    fn parse_error(&mut self, err: Cow<'static, str>) {
        debug!("parser error: {}", err);
    }

    fn get_document(&mut self) -> NodeId {
        Document::DOCUMENT_NODE_ID
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn elem_name<'a>(&'a self, &target: &'a NodeId) -> ExpandedName<'a> {
        self.document[target]
            .as_element()
            .expect("elem_name on a non-element")
            .name
            .expanded()
    }

    fn get_template_contents(&mut self, &target: &NodeId) -> NodeId {
        target
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>, _flags: ElementFlags) -> NodeId {
        self.new_node(NodeData::Elem(Element { name, attrs }))
    }

    fn create_comment(&mut self, text: StrTendril) -> NodeId {
        self.new_node(NodeData::Comment(text))
    }

    fn create_pi(&mut self, target: StrTendril, data: StrTendril) -> NodeId {
        self.new_node(NodeData::Pi(ProcessingInstruction { target, data }))
    }

    fn append(&mut self, &parent: &NodeId, child: NodeOrText<NodeId>) {
        self.insert(Place::LastUnder(parent), child);
    }

    fn append_before_sibling(&mut self, &sibling: &NodeId, child: NodeOrText<NodeId>) {
        self.insert(Place::Before(sibling), child);
    }

    fn append_based_on_parent_node(
        &mut self,
        element: &NodeId,
        prev_element: &NodeId,
        child: NodeOrText<NodeId>,
    ) {
        if self.document[*element].parent.is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &mut self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        let node = self.new_node(NodeData::Doctype(Doctype {
            name,
            public_id,
            system_id,
        }));
        self.document.append(Document::DOCUMENT_NODE_ID, node)
    }

    fn add_attrs_if_missing(&mut self, &target: &NodeId, attrs: Vec<Attribute>) {
        // The tree builder calls this when folding stray <html> or <body>
        // start tags into the elements already present.
        let element = self
            .document
            .node_mut(target)
            .data
            .as_element_mut()
            .expect("add_attrs_if_missing on a non-element");
        for attr in attrs {
            if element.attrs.iter().all(|a| a.name != attr.name) {
                element.attrs.push(attr);
            }
        }
    }

    fn remove_from_parent(&mut self, &target: &NodeId) {
        self.document.unlink(target)
    }

    fn reparent_children(&mut self, &node: &NodeId, &new_parent: &NodeId) {
        // Collect first: append rewires the sibling links being iterated.
        let children: Vec<NodeId> = self.document.children(node).collect();
        for child in children {
            self.document.append(new_parent, child);
        }
    }
}
