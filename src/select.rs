//! The selector abstraction and the selection driver.
//!
//! A selector is any value implementing [`Selector`]; compiled CSS
//! selector groups, compiled XPath expressions and user-defined matchers
//! all conform to it and may be mixed freely in one selection. The driver
//! walks a [`Scope`] once in document order and feeds matches to an
//! [`Accumulator`].

use std::fmt;

use log::trace;

use crate::dom::{Document, NodeId, NodeRef};
use crate::error::Error;

mod context;
pub use context::Context;

mod matcher;
pub use matcher::{NodeKind, NodeKindMatcher, RootMatcher};

#[cfg(test)]
mod tests;

/// The capability every selector provides.
pub trait Selector: fmt::Debug {
    /// Does this single node satisfy the selector here and now?
    fn is_match(&self, node: NodeRef<'_>, ctx: &Context) -> bool;

    /// The relation feeding accepted nodes to the next selector in a
    /// chain; `None` means this selector alone decides the match.
    fn combinator(&self) -> Option<&Combinator> {
        None
    }

    /// Extra selectors the candidate must satisfy before acceptance.
    fn filters(&self) -> Option<&[Box<dyn Selector>]> {
        None
    }

    /// Structural validation, run once at compile time.
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// A compiled selector group; results of member trees are unioned.
pub type SelectorList = Vec<Box<dyn Selector>>;

/// The relation between a matched node and the candidate nodes for the
/// next selector in the chain.
#[derive(Debug)]
pub enum Combinator {
    /// All descendants of the match.
    Descendants(Box<dyn Selector>),
    /// Direct children of the match.
    Children(Box<dyn Selector>),
    /// The first element sibling after the match.
    NextSibling(Box<dyn Selector>),
    /// All element siblings after the match.
    NextSiblings(Box<dyn Selector>),
}

impl Combinator {
    /// The next selector in the chain.
    pub fn selector(&self) -> &dyn Selector {
        match self {
            Combinator::Descendants(s)
            | Combinator::Children(s)
            | Combinator::NextSibling(s)
            | Combinator::NextSiblings(s) => s.as_ref(),
        }
    }
}

/// What a selection walks: a whole document, or a node together with its
/// descendants.
///
/// When scoped to a node, combinators treat that node as if it had no
/// parent and no siblings.
#[derive(Copy, Clone, Debug)]
pub struct Scope<'a> {
    doc: &'a Document,
    origin: NodeId,
}

impl<'a> Scope<'a> {
    /// The underlying document.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub(crate) fn origin(&self) -> NodeId {
        self.origin
    }

    fn candidates(&self) -> impl Iterator<Item = NodeId> + 'a {
        let first = if self.origin == Document::DOCUMENT_NODE_ID {
            None
        } else {
            Some(self.origin)
        };
        first.into_iter().chain(self.doc.descendants(self.origin))
    }
}

impl<'a> From<&'a Document> for Scope<'a> {
    fn from(doc: &'a Document) -> Scope<'a> {
        Scope {
            doc,
            origin: Document::DOCUMENT_NODE_ID,
        }
    }
}

impl<'a> From<NodeRef<'a>> for Scope<'a> {
    fn from(node: NodeRef<'a>) -> Scope<'a> {
        Scope {
            doc: node.document(),
            origin: node.id(),
        }
    }
}

/// Gathers results during the driver's walk.
///
/// Matches arrive in document order, each node at most once.
pub trait Accumulator<'a> {
    /// The value [`select`] returns.
    type Output;

    /// Fold a match in.
    fn include(&mut self, node: NodeRef<'a>);

    /// May the walk stop early?
    fn is_complete(&self) -> bool {
        false
    }

    /// Final extraction.
    fn finish(self) -> Self::Output;
}

/// Accumulates every match.
#[derive(Debug, Default)]
pub struct All<'a> {
    nodes: Vec<NodeRef<'a>>,
}

impl<'a> Accumulator<'a> for All<'a> {
    type Output = Vec<NodeRef<'a>>;

    fn include(&mut self, node: NodeRef<'a>) {
        self.nodes.push(node);
    }

    fn finish(self) -> Vec<NodeRef<'a>> {
        self.nodes
    }
}

/// Keeps the first match and completes immediately.
#[derive(Debug, Default)]
pub struct One<'a> {
    node: Option<NodeRef<'a>>,
}

impl<'a> Accumulator<'a> for One<'a> {
    type Output = Option<NodeRef<'a>>;

    fn include(&mut self, node: NodeRef<'a>) {
        self.node.get_or_insert(node);
    }

    fn is_complete(&self) -> bool {
        self.node.is_some()
    }

    fn finish(self) -> Option<NodeRef<'a>> {
        self.node
    }
}

/// Return every node matching any selector of the list, in document
/// order, deduplicated with first occurrence preserved.
pub fn all<'a, S>(scope: S, selectors: &[Box<dyn Selector>], context: &Context) -> Vec<NodeRef<'a>>
where
    S: Into<Scope<'a>>,
{
    select(scope, selectors, context, All::default())
}

/// Return the first matching node in document order, short-circuiting the
/// walk.
pub fn one<'a, S>(scope: S, selectors: &[Box<dyn Selector>], context: &Context) -> Option<NodeRef<'a>>
where
    S: Into<Scope<'a>>,
{
    select(scope, selectors, context, One::default())
}

/// Walk the scope, feed every match to the accumulator, and return its
/// final value.
///
/// The caller's context is never mutated; the selection works on a
/// derived copy.
pub fn select<'a, S, A>(
    scope: S,
    selectors: &[Box<dyn Selector>],
    context: &Context,
    mut acc: A,
) -> A::Output
where
    S: Into<Scope<'a>>,
    A: Accumulator<'a>,
{
    let scope = scope.into();
    let ctx = context.derive(scope.origin());
    for id in scope.candidates() {
        let node = NodeRef::new(scope.document(), id);
        for sel in selectors {
            if matches_tree(sel.as_ref(), node, &ctx, scope.origin(), true) {
                trace!("selector match at {:?}", id);
                acc.include(node);
                if acc.is_complete() {
                    return acc.finish();
                }
                break;
            }
        }
    }
    acc.finish()
}

/// Validate every selector of a compiled list.
pub(crate) fn validate_list(selectors: &[Box<dyn Selector>]) -> Result<(), Error> {
    for sel in selectors {
        sel.validate()?;
    }
    Ok(())
}

/// Test whether the node satisfies a selector together with its filters.
pub(crate) fn accepts(sel: &dyn Selector, node: NodeRef<'_>, ctx: &Context) -> bool {
    if !sel.is_match(node, ctx) {
        return false;
    }
    match sel.filters() {
        Some(fs) => fs.iter().all(|f| f.is_match(node, ctx)),
        None => true,
    }
}

/// Test whether `node` terminates a full match of the selector tree.
///
/// The chain is checked right-to-left: the rightmost stage must hold at
/// `node` itself, each stage to its left at some node reached backwards
/// through the stage's combinator. `bound` limits ancestor and parent
/// walks to the selection scope; when `inclusive`, the bound node itself
/// is still a legal candidate for left stages.
pub(crate) fn matches_tree(
    sel: &dyn Selector,
    node: NodeRef<'_>,
    ctx: &Context,
    bound: NodeId,
    inclusive: bool,
) -> bool {
    let mut chain: Vec<&dyn Selector> = vec![sel];
    let mut cur = sel;
    while let Some(c) = cur.combinator() {
        cur = c.selector();
        chain.push(cur);
    }
    let terminal = chain[chain.len() - 1];
    if !accepts(terminal, node, ctx) {
        return false;
    }
    matches_left(&chain[..chain.len() - 1], node, ctx, bound, inclusive)
}

fn matches_left(
    stages: &[&dyn Selector],
    node: NodeRef<'_>,
    ctx: &Context,
    bound: NodeId,
    inclusive: bool,
) -> bool {
    let (left, rest) = match stages.split_last() {
        Some(t) => t,
        None => return true,
    };
    let comb = left
        .combinator()
        .expect("non-terminal chain stage must carry a combinator");
    match comb {
        Combinator::Descendants(_) => {
            for a in ancestors_within(node, bound, inclusive) {
                if accepts(*left, a, ctx) && matches_left(rest, a, ctx, bound, inclusive) {
                    return true;
                }
            }
            false
        }
        Combinator::Children(_) => match parent_within(node, bound, inclusive) {
            Some(p) => accepts(*left, p, ctx) && matches_left(rest, p, ctx, bound, inclusive),
            None => false,
        },
        Combinator::NextSibling(_) => match prev_element_sibling(node, bound) {
            Some(p) => accepts(*left, p, ctx) && matches_left(rest, p, ctx, bound, inclusive),
            None => false,
        },
        Combinator::NextSiblings(_) => {
            let mut cur = prev_element_sibling(node, bound);
            while let Some(p) = cur {
                if accepts(*left, p, ctx) && matches_left(rest, p, ctx, bound, inclusive) {
                    return true;
                }
                cur = prev_element_sibling(p, bound);
            }
            false
        }
    }
}

fn ancestors_within<'a>(node: NodeRef<'a>, bound: NodeId, inclusive: bool) -> Vec<NodeRef<'a>> {
    let mut out = Vec::new();
    if node.id() == bound {
        return out;
    }
    let doc = node.document();
    for a in node.ancestors() {
        if a == bound {
            if inclusive {
                out.push(doc.node(a));
            }
            break;
        }
        out.push(doc.node(a));
    }
    out
}

fn parent_within<'a>(node: NodeRef<'a>, bound: NodeId, inclusive: bool) -> Option<NodeRef<'a>> {
    if node.id() == bound {
        return None;
    }
    let p = node.parent()?;
    if p.id() == bound && !inclusive {
        return None;
    }
    Some(p)
}

fn prev_element_sibling<'a>(node: NodeRef<'a>, bound: NodeId) -> Option<NodeRef<'a>> {
    if node.id() == bound {
        return None;
    }
    let mut cur = node.prev_sibling();
    while let Some(s) = cur {
        if s.data.is_element() {
            return Some(s);
        }
        cur = s.prev_sibling();
    }
    None
}
