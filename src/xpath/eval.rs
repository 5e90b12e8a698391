//! Evaluation of XPath expression trees against the document store.

use std::collections::{HashMap, HashSet};

use crate::chars::collapse_ws;
use crate::dom::{Document, NodeData, NodeId};

use super::parse::{Axis, BinOp, Expr, Func, NodeTest, Path};

/// An XPath value.
///
/// Node-sets are kept deduplicated, in document order. Attribute values
/// travel as plain string sets, the predicate-only stand-in for attribute
/// node-sets.
#[derive(Clone, Debug)]
pub(crate) enum Value {
    Number(f64),
    Str(String),
    Boolean(bool),
    Nodes(Vec<NodeId>),
    Attrs(Vec<String>),
}

impl Value {
    fn is_set(&self) -> bool {
        matches!(self, Value::Nodes(_) | Value::Attrs(_))
    }
}

/// One expression evaluation, anchored at a scope origin that acts as the
/// document root: ancestor walks stop there and it has no siblings.
pub(crate) struct Eval<'a> {
    doc: &'a Document,
    origin: NodeId,
    order: HashMap<NodeId, u32>,
}

/// The context node with its 1-based position bookkeeping.
struct Cursor {
    node: NodeId,
    position: usize,
    last: usize,
}

impl<'a> Eval<'a> {
    pub(crate) fn new(doc: &'a Document, origin: NodeId) -> Eval<'a> {
        let mut order = HashMap::new();
        order.insert(origin, 0);
        for (i, id) in doc.descendants(origin).enumerate() {
            order.insert(id, i as u32 + 1);
        }
        Eval { doc, origin, order }
    }

    /// Evaluate a compiled selection expression to its node-set.
    pub(crate) fn select(&self, expr: &Expr) -> Vec<NodeId> {
        let cur = Cursor {
            node: self.origin,
            position: 1,
            last: 1,
        };
        match self.eval(expr, &cur) {
            Value::Nodes(ids) => ids,
            _ => Vec::new(),
        }
    }

    fn eval(&self, expr: &Expr, cur: &Cursor) -> Value {
        match expr {
            Expr::Number(n) => Value::Number(*n),
            Expr::Literal(s) => Value::Str(s.clone()),
            Expr::Negate(e) => {
                let v = self.eval(e, cur);
                Value::Number(-self.number(&v))
            }
            Expr::Binary(op, l, r) => self.eval_binary(*op, l, r, cur),
            Expr::Union(l, r) => {
                let mut ids = match self.eval(l, cur) {
                    Value::Nodes(v) => v,
                    _ => Vec::new(),
                };
                if let Value::Nodes(rids) = self.eval(r, cur) {
                    ids.extend(rids);
                }
                Value::Nodes(self.normalize(ids))
            }
            Expr::Function(f, args) => self.eval_function(*f, args, cur),
            Expr::Path(p) => self.eval_path(p, cur),
        }
    }

    fn eval_binary(&self, op: BinOp, l: &Expr, r: &Expr, cur: &Cursor) -> Value {
        match op {
            BinOp::Or => {
                let lv = self.eval(l, cur);
                if self.boolean(&lv) {
                    return Value::Boolean(true);
                }
                let rv = self.eval(r, cur);
                Value::Boolean(self.boolean(&rv))
            }
            BinOp::And => {
                let lv = self.eval(l, cur);
                if !self.boolean(&lv) {
                    return Value::Boolean(false);
                }
                let rv = self.eval(r, cur);
                Value::Boolean(self.boolean(&rv))
            }
            BinOp::Eq | BinOp::Neq => {
                let lv = self.eval(l, cur);
                let rv = self.eval(r, cur);
                Value::Boolean(self.compare_eq(op, &lv, &rv))
            }
            BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte => {
                let lv = self.eval(l, cur);
                let rv = self.eval(r, cur);
                Value::Boolean(self.compare_rel(op, &lv, &rv))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let a = {
                    let v = self.eval(l, cur);
                    self.number(&v)
                };
                let b = {
                    let v = self.eval(r, cur);
                    self.number(&v)
                };
                Value::Number(match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    _ => a % b,
                })
            }
        }
    }

    fn compare_eq(&self, op: BinOp, l: &Value, r: &Value) -> bool {
        let invert = op == BinOp::Neq;
        if l.is_set() || r.is_set() {
            if l.is_set() && r.is_set() {
                let lv = self.set_values(l);
                let rv = self.set_values(r);
                return lv
                    .iter()
                    .any(|a| rv.iter().any(|b| (a == b) != invert));
            }
            let (set, scalar) = if l.is_set() { (l, r) } else { (r, l) };
            return match scalar {
                Value::Number(n) => self
                    .set_values(set)
                    .iter()
                    .any(|v| (str_number(v) == *n) != invert),
                Value::Str(s) => self.set_values(set).iter().any(|v| (v == s) != invert),
                Value::Boolean(b) => (self.boolean(set) == *b) != invert,
                _ => unreachable!("scalar side"),
            };
        }
        let eq = match (l, r) {
            (Value::Boolean(_), _) | (_, Value::Boolean(_)) => self.boolean(l) == self.boolean(r),
            (Value::Number(_), _) | (_, Value::Number(_)) => self.number(l) == self.number(r),
            _ => self.string(l) == self.string(r),
        };
        eq != invert
    }

    fn compare_rel(&self, op: BinOp, l: &Value, r: &Value) -> bool {
        let rel = |a: f64, b: f64| match op {
            BinOp::Lt => a < b,
            BinOp::Lte => a <= b,
            BinOp::Gt => a > b,
            _ => a >= b,
        };
        match (l.is_set(), r.is_set()) {
            (true, true) => {
                let lv = self.set_values(l);
                let rv = self.set_values(r);
                lv.iter()
                    .any(|a| rv.iter().any(|b| rel(str_number(a), str_number(b))))
            }
            (true, false) => {
                let b = self.number(r);
                self.set_values(l).iter().any(|v| rel(str_number(v), b))
            }
            (false, true) => {
                let a = self.number(l);
                self.set_values(r).iter().any(|v| rel(a, str_number(v)))
            }
            (false, false) => rel(self.number(l), self.number(r)),
        }
    }

    fn eval_function(&self, func: Func, args: &[Expr], cur: &Cursor) -> Value {
        match func {
            Func::Position => Value::Number(cur.position as f64),
            Func::Last => Value::Number(cur.last as f64),
            Func::True => Value::Boolean(true),
            Func::False => Value::Boolean(false),
            Func::Count => {
                let n = match self.eval(&args[0], cur) {
                    Value::Nodes(v) => v.len(),
                    Value::Attrs(v) => v.len(),
                    _ => 0,
                };
                Value::Number(n as f64)
            }
            Func::Not => {
                let v = self.eval(&args[0], cur);
                Value::Boolean(!self.boolean(&v))
            }
            Func::Name => Value::Str(self.name_of(args, cur, false)),
            Func::LocalName => Value::Str(self.name_of(args, cur, true)),
            Func::String => {
                if args.is_empty() {
                    Value::Str(self.string_value(cur.node))
                } else {
                    let v = self.eval(&args[0], cur);
                    Value::Str(self.string(&v))
                }
            }
            Func::Contains => {
                let hay = {
                    let v = self.eval(&args[0], cur);
                    self.string(&v)
                };
                let needle = {
                    let v = self.eval(&args[1], cur);
                    self.string(&v)
                };
                Value::Boolean(hay.contains(&needle))
            }
            Func::StartsWith => {
                let hay = {
                    let v = self.eval(&args[0], cur);
                    self.string(&v)
                };
                let needle = {
                    let v = self.eval(&args[1], cur);
                    self.string(&v)
                };
                Value::Boolean(hay.starts_with(&needle))
            }
            Func::NormalizeSpace => {
                let s = if args.is_empty() {
                    self.string_value(cur.node)
                } else {
                    let v = self.eval(&args[0], cur);
                    self.string(&v)
                };
                Value::Str(collapse_ws(&s, true))
            }
        }
    }

    fn name_of(&self, args: &[Expr], cur: &Cursor, local_only: bool) -> String {
        let id = if args.is_empty() {
            Some(cur.node)
        } else {
            match self.eval(&args[0], cur) {
                Value::Nodes(v) => v.first().copied(),
                _ => None,
            }
        };
        let id = match id {
            Some(id) => id,
            None => return String::new(),
        };
        match &self.doc[id].data {
            NodeData::Elem(e) => {
                if local_only {
                    e.name.local.to_string()
                } else {
                    match &e.name.prefix {
                        Some(p) => format!("{}:{}", p, e.name.local),
                        None => e.name.local.to_string(),
                    }
                }
            }
            NodeData::Pi(pi) => pi.target.to_string(),
            _ => String::new(),
        }
    }

    fn eval_path(&self, path: &Path, cur: &Cursor) -> Value {
        let start = if path.absolute { self.origin } else { cur.node };
        let mut current = vec![start];
        for step in &path.steps {
            if step.axis == Axis::Attribute {
                // Compile-time checks guarantee this is the final step
                // and carries no predicates.
                let mut vals = Vec::new();
                for &node in &current {
                    self.attr_values(node, &step.test, &mut vals);
                }
                return Value::Attrs(vals);
            }
            let mut next: Vec<NodeId> = Vec::new();
            let mut seen: HashSet<NodeId> = HashSet::new();
            for &node in &current {
                let mut cands = self.axis_nodes(step.axis, node);
                cands.retain(|&c| self.node_test(&step.test, c));
                for pred in &step.predicates {
                    cands = self.filter_predicate(pred, cands);
                }
                for c in cands {
                    if seen.insert(c) {
                        next.push(c);
                    }
                }
            }
            current = self.normalize(next);
        }
        Value::Nodes(current)
    }

    /// Apply one predicate over an axis-ordered candidate list. A numeric
    /// value selects by position; anything else coerces to boolean.
    fn filter_predicate(&self, pred: &Expr, cands: Vec<NodeId>) -> Vec<NodeId> {
        let last = cands.len();
        let mut out = Vec::new();
        for (idx, &c) in cands.iter().enumerate() {
            let cur = Cursor {
                node: c,
                position: idx + 1,
                last,
            };
            let keep = match self.eval(pred, &cur) {
                Value::Number(n) => (idx + 1) as f64 == n,
                v => self.boolean(&v),
            };
            if keep {
                out.push(c);
            }
        }
        out
    }

    fn axis_nodes(&self, axis: Axis, node: NodeId) -> Vec<NodeId> {
        match axis {
            Axis::Child => self.doc.children(node).collect(),
            Axis::Descendant => self.doc.descendants(node).collect(),
            Axis::DescendantOrSelf => {
                let mut v = vec![node];
                v.extend(self.doc.descendants(node));
                v
            }
            Axis::Parent => self.bounded_parent(node).into_iter().collect(),
            Axis::Ancestor => {
                let mut v = Vec::new();
                let mut cur = self.bounded_parent(node);
                while let Some(p) = cur {
                    v.push(p);
                    cur = self.bounded_parent(p);
                }
                v
            }
            Axis::AncestorOrSelf => {
                let mut v = vec![node];
                let mut cur = self.bounded_parent(node);
                while let Some(p) = cur {
                    v.push(p);
                    cur = self.bounded_parent(p);
                }
                v
            }
            Axis::FollowingSibling => {
                let mut v = Vec::new();
                if node != self.origin {
                    let mut cur = self.doc[node].next_sibling;
                    while let Some(s) = cur {
                        v.push(s);
                        cur = self.doc[s].next_sibling;
                    }
                }
                v
            }
            Axis::PrecedingSibling => {
                // Nearest first, matching reverse-axis positions.
                let mut v = Vec::new();
                if node != self.origin {
                    let mut cur = self.doc[node].prev_sibling;
                    while let Some(s) = cur {
                        v.push(s);
                        cur = self.doc[s].prev_sibling;
                    }
                }
                v
            }
            Axis::SelfAxis => vec![node],
            Axis::Attribute => unreachable!("attribute axis is handled by eval_path"),
        }
    }

    fn bounded_parent(&self, node: NodeId) -> Option<NodeId> {
        if node == self.origin {
            None
        } else {
            self.doc[node].parent
        }
    }

    fn node_test(&self, test: &NodeTest, id: NodeId) -> bool {
        let data = &self.doc[id].data;
        match test {
            NodeTest::Any => data.is_element(),
            NodeTest::Name { prefix, local } => match data.as_element() {
                Some(e) => {
                    let prefix_ok = match (prefix, &e.name.prefix) {
                        (None, None) => true,
                        (Some(p), Some(ep)) => p.as_str() == &**ep,
                        _ => false,
                    };
                    let elocal: &str = &e.name.local;
                    let local_ok = if self.doc.markup_kind().is_html() {
                        elocal.eq_ignore_ascii_case(local)
                    } else {
                        elocal == local
                    };
                    prefix_ok && local_ok
                }
                None => false,
            },
            NodeTest::Node => true,
            NodeTest::Text => matches!(data, NodeData::Text(_) | NodeData::Data(_)),
            NodeTest::Comment => matches!(data, NodeData::Comment(_)),
            NodeTest::Pi(target) => match data {
                NodeData::Pi(pi) => {
                    let t: &str = &pi.target;
                    target.as_ref().map_or(true, |want| t == want)
                }
                _ => false,
            },
        }
    }

    fn attr_values(&self, node: NodeId, test: &NodeTest, out: &mut Vec<String>) {
        let elm = match self.doc[node].data.as_element() {
            Some(e) => e,
            None => return,
        };
        let html = self.doc.markup_kind().is_html();
        for attr in &elm.attrs {
            let keep = match test {
                NodeTest::Any => true,
                NodeTest::Name { prefix, local } => {
                    let prefix_ok = match (prefix, &attr.name.prefix) {
                        (None, None) => true,
                        (Some(p), Some(ap)) => p.as_str() == &**ap,
                        _ => false,
                    };
                    let alocal: &str = &attr.name.local;
                    let local_ok = if html {
                        alocal.eq_ignore_ascii_case(local)
                    } else {
                        alocal == local
                    };
                    prefix_ok && local_ok
                }
                _ => false,
            };
            if keep {
                out.push(attr.value.to_string());
            }
        }
    }

    fn normalize(&self, mut ids: Vec<NodeId>) -> Vec<NodeId> {
        ids.sort_by_key(|&id| self.rank(id));
        ids.dedup();
        ids
    }

    fn rank(&self, id: NodeId) -> u32 {
        self.order.get(&id).copied().unwrap_or(u32::MAX)
    }

    /// The XPath string-value of a node.
    fn string_value(&self, id: NodeId) -> String {
        match &self.doc[id].data {
            NodeData::Comment(c) => c.to_string(),
            NodeData::Pi(pi) => pi.data.to_string(),
            NodeData::Doctype(_) => String::new(),
            _ => self
                .doc
                .text(id)
                .map(|t| t.to_string())
                .unwrap_or_default(),
        }
    }

    fn set_values(&self, v: &Value) -> Vec<String> {
        match v {
            Value::Nodes(ids) => ids.iter().map(|&id| self.string_value(id)).collect(),
            Value::Attrs(vals) => vals.clone(),
            _ => Vec::new(),
        }
    }

    fn boolean(&self, v: &Value) -> bool {
        match v {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Nodes(ids) => !ids.is_empty(),
            Value::Attrs(vals) => !vals.is_empty(),
        }
    }

    fn number(&self, v: &Value) -> f64 {
        match v {
            Value::Number(n) => *n,
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            Value::Str(s) => str_number(s),
            set => str_number(&self.string(set)),
        }
    }

    fn string(&self, v: &Value) -> String {
        match v {
            Value::Str(s) => s.clone(),
            Value::Number(n) => fmt_number(*n),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
            Value::Nodes(ids) => ids
                .first()
                .map(|&id| self.string_value(id))
                .unwrap_or_default(),
            Value::Attrs(vals) => vals.first().cloned().unwrap_or_default(),
        }
    }
}

fn str_number(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

fn fmt_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
