use crate::css;
use crate::logger::ensure_logger;
use crate::select::{
    all, one, select, Accumulator, All, Context, NodeKind, NodeKindMatcher, One, Selector,
};
use crate::{html, NodeRef};

#[test]
fn one_is_first_of_all() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><p>1</p><span><p>2</p></span><p>3</p></div>");
    let ctx = Context::new();
    for sel_text in &["p", "div p", "span p", "p, span", "nosuch"] {
        let sel = css::compile(sel_text).unwrap();
        let everything = all(&doc, &sel, &ctx);
        assert_eq!(
            everything.first().copied(),
            one(&doc, &sel, &ctx),
            "selector {:?}",
            sel_text
        );
    }
}

#[test]
fn group_union_is_deduped_in_document_order() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><p id=a>1</p><p id=b class=x>2</p></div>");
    let ctx = Context::new();

    // Both group members match #b; it must appear once, in its document
    // position.
    let sel = css::compile("p, .x").unwrap();
    let hits = all(&doc, &sel, &ctx);
    let ids: Vec<_> = hits.iter().map(|h| h.attr("id").unwrap()).collect();
    assert_eq!(vec!["a", "b"], ids);
}

#[test]
fn group_order_beats_member_order() {
    ensure_logger();
    // The second group member matches an earlier node; results are still
    // in document order, not member order.
    let doc = html::parse_utf8_fragment(b"<div><i>a</i><b>b</b></div>");
    let ctx = Context::new();
    let sel = css::compile("b, i").unwrap();
    let hits = all(&doc, &sel, &ctx);
    let tags: Vec<_> = hits.iter().map(|h| h.tag().unwrap()).collect();
    assert_eq!(vec!["i", "b"], tags);
}

#[test]
fn sibling_selector_does_not_break_one() {
    ensure_logger();
    // "i + b" emits b only after visiting i; "em" matches an earlier
    // node. `one` must still agree with `all`.
    let doc = html::parse_utf8_fragment(b"<div><i>a</i><em>x</em><b>b</b></div>");
    let ctx = Context::new();
    let sel = css::compile("i ~ b, em").unwrap();
    let hits = all(&doc, &sel, &ctx);
    let tags: Vec<_> = hits.iter().map(|h| h.tag().unwrap()).collect();
    assert_eq!(vec!["em", "b"], tags);
    assert_eq!(Some("em"), one(&doc, &sel, &ctx).unwrap().tag());
}

#[test]
fn scoped_selection_is_restricted_to_subtree() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><section id=s><p>in</p></section><p>out</p></div>",
    );
    let ctx = Context::new();
    let section = one(&doc, &css::compile("#s").unwrap(), &ctx).unwrap();

    let hits = all(section, &css::compile("p").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!("in", hits[0].text());

    // The scope node itself is a candidate.
    let hits = all(section, &css::compile("section").unwrap(), &ctx);
    assert_eq!(1, hits.len());
}

#[test]
fn scoped_selection_ignores_outside_ancestors() {
    ensure_logger();
    // Anchored at #s, the subtree root acts as if it had no parent, so
    // "div p" cannot reach up to the outer div.
    let doc = html::parse_utf8_fragment(b"<div><section id=s><p>in</p></section></div>");
    let ctx = Context::new();
    let section = one(&doc, &css::compile("#s").unwrap(), &ctx).unwrap();
    assert!(all(section, &css::compile("div p").unwrap(), &ctx).is_empty());
    assert_eq!(1, all(section, &css::compile("section p").unwrap(), &ctx).len());
}

/// A user-defined matcher: comments whose content contains a needle.
#[derive(Debug)]
struct CommentContains(&'static str);

impl Selector for CommentContains {
    fn is_match(&self, node: NodeRef<'_>, _ctx: &Context) -> bool {
        match node.data.as_comment() {
            Some(c) => c.contains(self.0),
            None => false,
        }
    }
}

#[test]
fn user_selector_matches_comments() {
    ensure_logger();
    let doc = html::parse_utf8(b"<div><!-- TODO x --><!-- done --></div>");
    let ctx = Context::new();
    let sel: Vec<Box<dyn Selector>> = vec![Box::new(CommentContains("TODO"))];
    let hits = all(&doc, &sel, &ctx);
    assert_eq!(1, hits.len());
    assert_eq!("<!-- TODO x -->", hits[0].html());
}

#[test]
fn node_kind_matchers() {
    ensure_logger();
    let doc = html::parse_utf8(b"<div>text<!--c--></div>");
    let ctx = Context::new();

    let sel: Vec<Box<dyn Selector>> = vec![Box::new(NodeKindMatcher(NodeKind::Comment))];
    assert_eq!(1, all(&doc, &sel, &ctx).len());

    let sel: Vec<Box<dyn Selector>> = vec![Box::new(NodeKindMatcher(NodeKind::NonElement))];
    let hits = all(&doc, &sel, &ctx);
    assert_eq!(2, hits.len(), "text and comment: {:?}", hits);
}

/// An accumulator that merely counts matches.
#[derive(Default)]
struct Counting(usize);

impl<'a> Accumulator<'a> for Counting {
    type Output = usize;

    fn include(&mut self, _node: NodeRef<'a>) {
        self.0 += 1;
    }

    fn finish(self) -> usize {
        self.0
    }
}

#[test]
fn custom_accumulator() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><p>1</p><p>2</p></div>");
    let ctx = Context::new();
    let sel = css::compile("p").unwrap();
    let count = select(&doc, &sel, &ctx, Counting::default());
    assert_eq!(2, count);
}

#[test]
fn accumulator_short_circuit() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><p>1</p><p>2</p></div>");
    let ctx = Context::new();
    let sel = css::compile("p").unwrap();
    let first = select(&doc, &sel, &ctx, One::default());
    assert_eq!("1", first.unwrap().text());
    let everything = select(&doc, &sel, &ctx, All::default());
    assert_eq!(2, everything.len());
}

#[test]
fn context_user_values_are_untouched() {
    ensure_logger();

    #[derive(Debug)]
    struct NeedsKey;

    impl Selector for NeedsKey {
        fn is_match(&self, node: NodeRef<'_>, ctx: &Context) -> bool {
            node.data.is_element() && ctx.get("want") == Some("yes")
        }
    }

    let doc = html::parse_utf8_fragment(b"<div>x</div>");
    let sel: Vec<Box<dyn Selector>> = vec![Box::new(NeedsKey)];

    let mut ctx = Context::new();
    assert!(all(&doc, &sel, &ctx).is_empty());
    ctx.insert("want", "yes");
    assert!(!all(&doc, &sel, &ctx).is_empty());
    assert_eq!(Some("yes"), ctx.get("want"));
}
