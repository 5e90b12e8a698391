//! Extract structured data from HTML and XML markup with CSS and XPath
//! selectors.
//!
//! Parsed markup lands in an id-indexed [`Document`]; compiled selectors
//! and user-defined matchers drive the selection engine in [`select`];
//! matched nodes expose extraction operations such as [`NodeRef::text`],
//! [`NodeRef::attr`] and [`NodeRef::dataset`].

#![warn(rust_2018_idioms)]

#[macro_use]
extern crate html5ever;

mod chars;

mod error;
pub use error::{Error, Grammar};

mod dom;
pub use dom::{
    html, xml, Ancestors, Attribute, Data, DataKind, Descend, Doctype, Document, Element,
    LocalName, MarkupKind, Namespace, Node, NodeData, NodeId, NodeRef, ProcessingInstruction,
    QualName, StrTendril,
};

pub mod tree;
pub use tree::TreeNode;

pub mod select;
pub use select::{
    all, one, Accumulator, All, Combinator, Context, One, Scope, Selector, SelectorList,
};

pub mod css;
pub mod xpath;

#[doc(hidden)]
pub mod logger;
