use crate::css::compile;
use crate::logger::ensure_logger;
use crate::select::{all, one, Context};
use crate::{html, xml, Error, NodeRef};

fn texts(hits: &[NodeRef<'_>]) -> Vec<String> {
    hits.iter().map(|h| h.text()).collect()
}

#[test]
fn id_then_descendant() {
    ensure_logger();
    let doc = html::parse_utf8(b"<div id=main><p>1</p><p>2</p><p>3</p></div>");
    let ctx = Context::new();
    let sel = compile("#main p").unwrap();

    let hits = all(&doc, &sel, &ctx);
    assert_eq!(3, hits.len());
    for h in &hits {
        assert_eq!(Some("p"), h.tag());
    }
    assert_eq!(vec!["1", "2", "3"], texts(&hits));

    let first = one(&doc, &sel, &ctx).unwrap();
    assert_eq!("1", first.text());
}

#[test]
fn universal_matches_every_element() {
    ensure_logger();
    let doc = html::parse_utf8(b"<div><p>x</p></div>");
    let ctx = Context::new();
    let hits = all(&doc, &compile("*").unwrap(), &ctx);
    let tags: Vec<_> = hits.iter().map(|h| h.tag().unwrap()).collect();
    assert_eq!(vec!["html", "head", "body", "div", "p"], tags);
}

#[test]
fn descendant_combinator_law() {
    ensure_logger();
    // "A B" equals: descendants of an A match that match B.
    let doc = html::parse_utf8_fragment(
        b"<div><ul><li>a</li></ul><ol><li>b</li></ol><li>c</li></div>",
    );
    let ctx = Context::new();
    let hits = all(&doc, &compile("ul li").unwrap(), &ctx);
    assert_eq!(vec!["a"], texts(&hits));

    let uls = all(&doc, &compile("ul").unwrap(), &ctx);
    let mut expect = Vec::new();
    for ul in uls {
        for id in ul.descendants() {
            let n = ul.document().node(id);
            if n.tag() == Some("li") && !expect.contains(&n) {
                expect.push(n);
            }
        }
    }
    assert_eq!(expect, hits);
}

#[test]
fn child_combinator() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><p>1</p><span><p>2</p></span></div>");
    let ctx = Context::new();
    let hits = all(&doc, &compile("div > p").unwrap(), &ctx);
    assert_eq!(vec!["1"], texts(&hits));
}

#[test]
fn sibling_combinators() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><h1>t</h1>mid<p>1</p><p>2</p><p>3</p></div>",
    );
    let ctx = Context::new();
    // The text node between h1 and p does not interrupt element
    // adjacency.
    assert_eq!(
        vec!["1"],
        texts(&all(&doc, &compile("h1 + p").unwrap(), &ctx))
    );
    assert_eq!(
        vec!["2", "3"],
        texts(&all(&doc, &compile("p + p").unwrap(), &ctx))
    );
    assert_eq!(
        vec!["3"],
        texts(&all(&doc, &compile("p + p + p").unwrap(), &ctx))
    );
    assert_eq!(
        vec!["1", "2", "3"],
        texts(&all(&doc, &compile("h1 ~ p").unwrap(), &ctx))
    );
}

#[test]
fn compound_requires_all_parts() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><p class=\"a b\" data-k=v>yes</p><p class=a>no</p></div>",
    );
    let ctx = Context::new();
    assert_eq!(
        vec!["yes"],
        texts(&all(&doc, &compile("p.a.b[data-k=v]").unwrap(), &ctx))
    );
}

#[test]
fn class_and_id_sugar() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><p id=one class=\"x  y\">1</p><p class=xy>2</p></div>",
    );
    let ctx = Context::new();
    assert_eq!(vec!["1"], texts(&all(&doc, &compile("#one").unwrap(), &ctx)));
    assert_eq!(vec!["1"], texts(&all(&doc, &compile(".x").unwrap(), &ctx)));
    assert_eq!(vec!["1"], texts(&all(&doc, &compile(".y").unwrap(), &ctx)));
    assert_eq!(vec!["2"], texts(&all(&doc, &compile(".xy").unwrap(), &ctx)));
}

#[test]
fn attribute_operators() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><a href=\"http://x/a.png\" hreflang=en-US rel=\"nofollow me\">1</a></div>",
    );
    let ctx = Context::new();
    let hit = |s: &str| !all(&doc, &compile(s).unwrap(), &ctx).is_empty();

    assert!(hit("a[href]"));
    assert!(!hit("a[title]"));
    assert!(hit("a[hreflang=en-US]"));
    assert!(hit("a[rel~=nofollow]"));
    assert!(hit("a[rel~=me]"));
    assert!(!hit("a[rel~=nof]"));
    assert!(hit("a[hreflang|=en]"));
    assert!(!hit("a[hreflang|=e]"));
    assert!(hit("a[href^=\"http://\"]"));
    assert!(hit("a[href$=\".png\"]"));
    assert!(hit("a[href*=\"x/a\"]"));
    assert!(hit("a[hreflang=\"EN-us\" i]"));
    assert!(!hit("a[hreflang=\"EN-us\"]"));
}

#[test]
fn list_operator_with_spaced_value_matches_nothing() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(b"<div><a rel=\"nofollow me\">1</a></div>");
    let ctx = Context::new();
    assert!(all(&doc, &compile("a[rel~=\"nofollow me\"]").unwrap(), &ctx).is_empty());
}

#[test]
fn tag_match_case_rules() {
    ensure_logger();
    let ctx = Context::new();
    let doc = html::parse_utf8_fragment(b"<div>x</div>");
    assert_eq!(1, all(&doc, &compile("DIV").unwrap(), &ctx).len());

    let doc = xml::parse_utf8(b"<Widget>x</Widget>").unwrap();
    assert_eq!(1, all(&doc, &compile("Widget").unwrap(), &ctx).len());
    assert!(all(&doc, &compile("widget").unwrap(), &ctx).is_empty());
}

#[test]
fn structural_pseudo_classes() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>",
    );
    let ctx = Context::new();
    let t = |s: &str| texts(&all(&doc, &compile(s).unwrap(), &ctx));

    assert_eq!(vec!["1"], t("li:first-child"));
    assert_eq!(vec!["5"], t("li:last-child"));
    assert!(t("li:only-child").is_empty());
    assert_eq!(vec!["1", "3", "5"], t("li:nth-child(odd)"));
    assert_eq!(vec!["2", "4"], t("li:nth-child(even)"));
    assert_eq!(vec!["2"], t("li:nth-child(2)"));
    assert_eq!(vec!["3", "5"], t("li:nth-child(2n+3)"));
    assert_eq!(vec!["1", "2", "3"], t("li:nth-child(-n+3)"));
    assert_eq!(vec!["4"], t("li:nth-last-child(2)"));
    assert_eq!(vec!["12345"], t("ul:only-child"));
}

#[test]
fn of_type_pseudo_classes() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><h1>t</h1><p>1</p><p>2</p><span>s</span><p>3</p></div>",
    );
    let ctx = Context::new();
    let t = |s: &str| texts(&all(&doc, &compile(s).unwrap(), &ctx));

    assert_eq!(vec!["1"], t("p:first-of-type"));
    assert_eq!(vec!["3"], t("p:last-of-type"));
    assert_eq!(vec!["t"], t("h1:only-of-type"));
    assert_eq!(vec!["2"], t("p:nth-of-type(2)"));
    assert_eq!(vec!["2"], t("p:nth-last-of-type(2)"));
    assert_eq!(vec!["s"], t("span:first-of-type"));
}

#[test]
fn root_pseudo_class() {
    ensure_logger();
    let doc = html::parse_utf8(b"<p>x</p>");
    let ctx = Context::new();
    let hits = all(&doc, &compile(":root").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!(Some("html"), hits[0].tag());
}

#[test]
fn not_pseudo_class() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><p class=a>1</p><p>2</p><span>3</span></div>",
    );
    let ctx = Context::new();
    let t = |s: &str| texts(&all(&doc, &compile(s).unwrap(), &ctx));

    assert_eq!(vec!["2"], t("p:not(.a)"));
    assert_eq!(vec!["3"], t("div :not(p)"));
}

#[test]
fn has_pseudo_class() {
    ensure_logger();
    let doc = html::parse_utf8_fragment(
        b"<div><section><div><b>deep</b></div></section><article><i>x</i></article></div>",
    );
    let ctx = Context::new();
    let tags = |s: &str| {
        all(&doc, &compile(s).unwrap(), &ctx)
            .iter()
            .map(|h| h.tag().unwrap().to_string())
            .collect::<Vec<_>>()
    };

    assert_eq!(vec!["section"], tags("section:has(b)"));
    assert_eq!(vec!["div", "section", "div"], tags("div:has(b), section:has(b)"));
    // Direct-child form: only the inner div has b as a child.
    assert_eq!(vec!["div"], tags("div:has(> b)"));
    assert_eq!(vec!["article"], tags("article:has(i)"));
    assert!(tags("article:has(b)").is_empty());
}

#[test]
fn group_compile_and_errors() {
    ensure_logger();
    assert!(compile("div, p, #x.y[z]").is_ok());

    let err = compile("div >").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("[foo").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("p ..q").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("ns|div").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("div, ").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);
}

#[test]
fn tokenizer_error_carries_position() {
    ensure_logger();
    match compile("div !p").unwrap_err() {
        Error::SelectorSyntax { pos, .. } => assert_eq!(4, pos),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn validation_errors() {
    ensure_logger();
    let err = compile("p:last-of-type(2)").unwrap_err();
    assert!(matches!(err, Error::SelectorValidation(_)), "{:?}", err);

    let err = compile("p:nth-child(2n+)").unwrap_err();
    assert!(matches!(err, Error::SelectorValidation(_)), "{:?}", err);

    let err = compile("p:nth-child").unwrap_err();
    assert!(matches!(err, Error::SelectorValidation(_)), "{:?}", err);

    let err = compile("p:sparkly").unwrap_err();
    assert!(matches!(err, Error::SelectorValidation(_)), "{:?}", err);

    let err = compile("p:not(div span)").unwrap_err();
    assert!(matches!(err, Error::SelectorValidation(_)), "{:?}", err);
}
