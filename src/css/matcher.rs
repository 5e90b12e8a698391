//! Compiled CSS matchers.

use crate::dom::{Element, NodeRef, QualName};
use crate::error::Error;
use crate::select::{accepts, matches_tree, Combinator, Context, Selector};

/// One compound selector: a primary simple matcher, co-requisite filters,
/// and the combinator to the next compound in the chain, if any.
#[derive(Debug)]
pub(crate) struct Compound {
    pub(crate) head: Simple,
    pub(crate) filters: Vec<Box<dyn Selector>>,
    pub(crate) combinator: Option<Combinator>,
}

impl Selector for Compound {
    fn is_match(&self, node: NodeRef<'_>, ctx: &Context) -> bool {
        self.head.is_match(node, ctx)
    }

    fn combinator(&self) -> Option<&Combinator> {
        self.combinator.as_ref()
    }

    fn filters(&self) -> Option<&[Box<dyn Selector>]> {
        if self.filters.is_empty() {
            None
        } else {
            Some(&self.filters)
        }
    }

    fn validate(&self) -> Result<(), Error> {
        self.head.validate()?;
        for f in &self.filters {
            f.validate()?;
        }
        if let Some(c) = &self.combinator {
            c.selector().validate()?;
        }
        Ok(())
    }
}

/// A simple selector, matching one condition on one element.
#[derive(Debug)]
pub(crate) enum Simple {
    Universal,
    Tag(String),
    Attr(AttrMatcher),
    Pseudo(Pseudo),
}

impl Selector for Simple {
    fn is_match(&self, node: NodeRef<'_>, ctx: &Context) -> bool {
        let elm = match node.data.as_element() {
            Some(e) => e,
            None => return false,
        };
        let html = node.document().markup_kind().is_html();
        match self {
            Simple::Universal => true,
            Simple::Tag(t) => {
                let local: &str = &elm.name.local;
                if html {
                    local.eq_ignore_ascii_case(t)
                } else {
                    local == t
                }
            }
            Simple::Attr(a) => a.matches(elm, html),
            Simple::Pseudo(p) => p.matches(node, elm, ctx),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        match self {
            Simple::Pseudo(Pseudo::Not(inner)) => inner.validate(),
            Simple::Pseudo(Pseudo::Has { inner, .. }) => inner.validate(),
            _ => Ok(()),
        }
    }
}

/// An attribute condition: `(name, op, value, case flag)`.
#[derive(Debug)]
pub(crate) struct AttrMatcher {
    pub(crate) name: String,
    pub(crate) op: AttrOp,
    pub(crate) value: Option<String>,
    /// Compare the value ASCII case-insensitively (`[a=v i]`).
    pub(crate) ci: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Present,
    Eq,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

impl AttrMatcher {
    fn matches(&self, elm: &Element, html: bool) -> bool {
        let found = elm.attrs.iter().find(|a| {
            let local: &str = &a.name.local;
            if html {
                local.eq_ignore_ascii_case(&self.name)
            } else {
                local == self.name
            }
        });
        let actual = match found {
            Some(a) => {
                let v: &str = &a.value;
                v
            }
            None => return false,
        };
        let want = match &self.value {
            Some(w) => w,
            None => return true, // presence only
        };
        let (actual, want) = if self.ci {
            (
                actual.to_ascii_lowercase(),
                want.to_ascii_lowercase(),
            )
        } else {
            (actual.to_string(), want.clone())
        };
        match self.op {
            AttrOp::Present => true,
            AttrOp::Eq => actual == want,
            AttrOp::Includes => {
                // A value with embedded whitespace can never be a list
                // member.
                if want.is_empty() || want.contains(char::is_whitespace) {
                    return false;
                }
                actual.split_ascii_whitespace().any(|w| w == want)
            }
            AttrOp::DashMatch => {
                actual == want
                    || (actual.len() > want.len()
                        && actual.starts_with(&want)
                        && actual.as_bytes()[want.len()] == b'-')
            }
            AttrOp::Prefix => !want.is_empty() && actual.starts_with(&want),
            AttrOp::Suffix => !want.is_empty() && actual.ends_with(&want),
            AttrOp::Substring => !want.is_empty() && actual.contains(&want),
        }
    }
}

/// A structural pseudo-class.
#[derive(Debug)]
pub(crate) enum Pseudo {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(Nth),
    NthLastChild(Nth),
    NthOfType(Nth),
    NthLastOfType(Nth),
    Not(Box<dyn Selector>),
    Has {
        inner: Box<dyn Selector>,
        /// Restrict to direct children (`:has(> S)`).
        direct: bool,
    },
}

/// The `an+b` form of the `:nth-*` family.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Nth {
    pub(crate) a: i64,
    pub(crate) b: i64,
}

impl Nth {
    /// True if `index = a*k + b` for some non-negative integer k.
    fn matches(&self, index: i64) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let d = index - self.b;
        d % self.a == 0 && d / self.a >= 0
    }
}

impl Pseudo {
    fn matches(&self, node: NodeRef<'_>, elm: &Element, ctx: &Context) -> bool {
        match self {
            Pseudo::Root => node.parent().is_none(),
            Pseudo::FirstChild => element_index(node) == 1,
            Pseudo::LastChild => element_index_rev(node) == 1,
            Pseudo::OnlyChild => element_index(node) == 1 && element_index_rev(node) == 1,
            Pseudo::FirstOfType => type_index(node, &elm.name) == 1,
            Pseudo::LastOfType => type_index_rev(node, &elm.name) == 1,
            Pseudo::OnlyOfType => {
                type_index(node, &elm.name) == 1 && type_index_rev(node, &elm.name) == 1
            }
            Pseudo::NthChild(n) => n.matches(element_index(node)),
            Pseudo::NthLastChild(n) => n.matches(element_index_rev(node)),
            Pseudo::NthOfType(n) => n.matches(type_index(node, &elm.name)),
            Pseudo::NthLastOfType(n) => n.matches(type_index_rev(node, &elm.name)),
            Pseudo::Not(inner) => !accepts(inner.as_ref(), node, ctx),
            Pseudo::Has { inner, direct } => has_match(node, inner.as_ref(), *direct, ctx),
        }
    }
}

/// 1-based position among element siblings, counting from the start.
fn element_index(node: NodeRef<'_>) -> i64 {
    let doc = node.document();
    doc.preceding_siblings(node.id())
        .filter(|&id| doc[id].data.is_element())
        .count() as i64
        + 1
}

/// 1-based position among element siblings, counting from the end.
fn element_index_rev(node: NodeRef<'_>) -> i64 {
    let doc = node.document();
    doc.following_siblings(node.id())
        .filter(|&id| doc[id].data.is_element())
        .count() as i64
        + 1
}

/// 1-based position among same-type element siblings, from the start.
fn type_index(node: NodeRef<'_>, name: &QualName) -> i64 {
    let doc = node.document();
    doc.preceding_siblings(node.id())
        .filter(|&id| is_same_type(doc[id].data.as_element(), name))
        .count() as i64
        + 1
}

/// 1-based position among same-type element siblings, from the end.
fn type_index_rev(node: NodeRef<'_>, name: &QualName) -> i64 {
    let doc = node.document();
    doc.following_siblings(node.id())
        .filter(|&id| is_same_type(doc[id].data.as_element(), name))
        .count() as i64
        + 1
}

fn is_same_type(elm: Option<&Element>, name: &QualName) -> bool {
    match elm {
        Some(e) => e.name.ns == name.ns && e.name.local == name.local,
        None => false,
    }
}

fn has_match(node: NodeRef<'_>, inner: &dyn Selector, direct: bool, ctx: &Context) -> bool {
    if direct {
        node.children()
            .any(|c| matches_tree(inner, c, ctx, node.id(), false))
    } else {
        let doc = node.document();
        doc.descendants(node.id())
            .any(|id| matches_tree(inner, doc.node(id), ctx, node.id(), false))
    }
}
