//! The XPath selector front-end.
//!
//! Supports XPath 1.0 location paths over the axes `child`, `descendant`,
//! `descendant-or-self`, `parent`, `ancestor`, `ancestor-or-self`,
//! `following-sibling`, `preceding-sibling`, `self` and `attribute`, with
//! predicates, the core value types, and a small function library.

mod eval;
mod parse;
mod token;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::rc::Rc;

use crate::dom::{Document, NodeId, NodeRef};
use crate::error::Error;
use crate::select::{Context, Selector, SelectorList};

use self::parse::{Axis, Expr, Func, Path};

/// Compile an XPath expression into a selector list for the driver.
///
/// The expression must select nodes: a location path, or a union of
/// location paths.
pub fn compile(input: &str) -> Result<SelectorList, Error> {
    let expr = parse::parse(input)?;
    check_expr(&expr, false)?;
    if !is_node_expr(&expr) {
        return Err(Error::XPathType(
            "expression does not select nodes".to_string(),
        ));
    }
    Ok(vec![Box::new(PathSelector { expr }) as Box<dyn Selector>])
}

/// A compiled XPath expression conforming to the selector capability.
///
/// The expression is evaluated once per selection, anchored at the scope
/// origin, and matching is a membership test against that node-set. The
/// evaluation is memoized through the selection context.
#[derive(Debug)]
struct PathSelector {
    expr: Expr,
}

impl Selector for PathSelector {
    fn is_match(&self, node: NodeRef<'_>, ctx: &Context) -> bool {
        let key = self as *const PathSelector as usize;
        let set = match ctx.nodeset_memo(key) {
            Some(set) => set,
            None => {
                let origin = ctx.origin().unwrap_or(Document::DOCUMENT_NODE_ID);
                let ids = eval::Eval::new(node.document(), origin).select(&self.expr);
                let set: Rc<HashSet<NodeId>> = Rc::new(ids.into_iter().collect());
                ctx.store_nodeset_memo(key, set.clone());
                set
            }
        };
        set.contains(&node.id())
    }
}

/// Is this expression node-set valued?
fn is_node_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Path(p) => p.steps.last().map_or(true, |s| s.axis != Axis::Attribute),
        Expr::Union(l, r) => is_node_expr(l) && is_node_expr(r),
        _ => false,
    }
}

/// Static type checks; `in_predicate` loosens the attribute-axis rules.
fn check_expr(expr: &Expr, in_predicate: bool) -> Result<(), Error> {
    match expr {
        Expr::Number(_) | Expr::Literal(_) => Ok(()),
        Expr::Negate(e) => check_expr(e, in_predicate),
        Expr::Binary(_, l, r) => {
            check_expr(l, true)?;
            check_expr(r, true)
        }
        Expr::Union(l, r) => {
            for side in &[l, r] {
                if !is_node_expr(side) {
                    return Err(Error::XPathType(
                        "operands of '|' must be node-sets".to_string(),
                    ));
                }
                check_expr(side, in_predicate)?;
            }
            Ok(())
        }
        Expr::Function(func, args) => {
            if *func == Func::Count {
                let ok = matches!(args[0], Expr::Path(_) | Expr::Union(..));
                if !ok {
                    return Err(Error::XPathType(
                        "count() expects a node-set argument".to_string(),
                    ));
                }
            }
            for arg in args {
                check_expr(arg, true)?;
            }
            Ok(())
        }
        Expr::Path(p) => check_path(p, in_predicate),
    }
}

fn check_path(path: &Path, allow_attr_final: bool) -> Result<(), Error> {
    let last = path.steps.len().saturating_sub(1);
    for (i, step) in path.steps.iter().enumerate() {
        if step.axis == Axis::Attribute {
            if i != last {
                return Err(Error::XPathType(
                    "the attribute axis must be the final step".to_string(),
                ));
            }
            if !allow_attr_final {
                return Err(Error::XPathType(
                    "cannot select attribute nodes".to_string(),
                ));
            }
            if !step.predicates.is_empty() {
                return Err(Error::XPathType(
                    "predicates are not supported on the attribute axis".to_string(),
                ));
            }
        }
        for pred in &step.predicates {
            check_expr(pred, true)?;
        }
    }
    Ok(())
}
