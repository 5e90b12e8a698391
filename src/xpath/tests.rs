use crate::logger::ensure_logger;
use crate::select::{all, one, Context};
use crate::xpath::compile;
use crate::{html, xml, Error, NodeRef};

fn texts(hits: &[NodeRef<'_>]) -> Vec<String> {
    hits.iter().map(|h| h.text()).collect()
}

#[test]
fn descendant_name_step() {
    ensure_logger();
    let doc = html::parse_utf8(b"<ul><li>a<li>b<li>c</ul>");
    let ctx = Context::new();
    let hits = all(&doc, &compile("//li").unwrap(), &ctx);
    assert_eq!(vec!["a", "b", "c"], texts(&hits));
}

#[test]
fn numeric_predicate_selects_by_position() {
    ensure_logger();
    let doc = html::parse_utf8(b"<ul><li>a<li>b<li>c</ul>");
    let ctx = Context::new();
    let hit = one(&doc, &compile("//li[2]").unwrap(), &ctx).unwrap();
    assert_eq!("b", hit.text());

    let hit = one(&doc, &compile("//li[last()]").unwrap(), &ctx).unwrap();
    assert_eq!("c", hit.text());

    let hit = one(&doc, &compile("//li[position() > 1]").unwrap(), &ctx).unwrap();
    assert_eq!("b", hit.text());
}

#[test]
fn attribute_predicate() {
    ensure_logger();
    let doc = html::parse_utf8(b"<a x=1><b x=2/><b x=3/></a>");
    let ctx = Context::new();
    let hit = one(&doc, &compile("//b[@x=\"3\"]").unwrap(), &ctx).unwrap();
    assert_eq!(Some("3"), hit.attr("x"));

    let hits = all(&doc, &compile("//b[@x]").unwrap(), &ctx);
    assert_eq!(2, hits.len());
    assert!(all(&doc, &compile("//b[@y]").unwrap(), &ctx).is_empty());
}

#[test]
fn absolute_and_child_paths() {
    ensure_logger();
    let doc = html::parse_utf8(b"<html><body><p>1</p><div><p>2</p></div></body></html>");
    let ctx = Context::new();
    assert_eq!(
        vec!["1"],
        texts(&all(&doc, &compile("/html/body/p").unwrap(), &ctx))
    );
    assert_eq!(
        vec!["2"],
        texts(&all(&doc, &compile("/html/body/div/p").unwrap(), &ctx))
    );
    assert_eq!(
        vec!["1", "2"],
        texts(&all(&doc, &compile("/html/body//p").unwrap(), &ctx))
    );
}

#[test]
fn explicit_axes() {
    ensure_logger();
    let doc = html::parse_utf8(
        b"<div><span id=s>x</span><p>1</p><p>2</p></div>",
    );
    let ctx = Context::new();

    let hits = all(
        &doc,
        &compile("//span/following-sibling::p").unwrap(),
        &ctx,
    );
    assert_eq!(vec!["1", "2"], texts(&hits));

    let hits = all(
        &doc,
        &compile("//p[2]/preceding-sibling::span").unwrap(),
        &ctx,
    );
    assert_eq!(vec!["x"], texts(&hits));

    let hits = all(&doc, &compile("//span/parent::div").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!(Some("div"), hits[0].tag());

    let hits = all(&doc, &compile("//span/ancestor::*").unwrap(), &ctx);
    let tags: Vec<_> = hits.iter().map(|h| h.tag().unwrap()).collect();
    assert_eq!(vec!["html", "body", "div"], tags);

    let hits = all(&doc, &compile("//span/ancestor-or-self::*").unwrap(), &ctx);
    assert_eq!(4, hits.len());

    let hits = all(&doc, &compile("//p/..").unwrap(), &ctx);
    assert_eq!(1, hits.len(), "parent abbreviation dedupes");

    let hits = all(&doc, &compile("//span/self::span").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert!(all(&doc, &compile("//span/self::p").unwrap(), &ctx).is_empty());
}

#[test]
fn node_kind_tests() {
    ensure_logger();
    let doc = html::parse_utf8(b"<div>text<!--c--><p>x</p></div>");
    let ctx = Context::new();

    let hits = all(&doc, &compile("//div/comment()").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!("<!--c-->", hits[0].html());

    let hits = all(&doc, &compile("//div/text()").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!("text", hits[0].text());

    let hits = all(&doc, &compile("//div/node()").unwrap(), &ctx);
    assert_eq!(3, hits.len());

    let doc = xml::parse_utf8(b"<r><?go now?><x/></r>").unwrap();
    let hits = all(&doc, &compile("//processing-instruction()").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert_eq!("<?go now?>", hits[0].html());
}

#[test]
fn wildcard_and_prefixed_names() {
    ensure_logger();
    let ctx = Context::new();
    let doc = xml::parse_utf8(b"<r xmlns:svg=\"http://www.w3.org/2000/svg\"><svg:rect/><circle/></r>")
        .unwrap();
    let hits = all(&doc, &compile("//svg:rect").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert!(all(&doc, &compile("//rect").unwrap(), &ctx).is_empty());

    let hits = all(&doc, &compile("/r/*").unwrap(), &ctx);
    assert_eq!(2, hits.len());
}

#[test]
fn union_dedupes_to_document_order() {
    ensure_logger();
    let doc = html::parse_utf8(b"<ul><li>a<li>b</ul>");
    let ctx = Context::new();

    // Idempotence: X | X == X.
    let sel_twice = compile("//li | //li").unwrap();
    let sel_once = compile("//li").unwrap();
    let a = all(&doc, &sel_twice, &ctx);
    let b = all(&doc, &sel_once, &ctx);
    assert_eq!(a, b);

    // Order comes from the document, not the union operands.
    let hits = all(&doc, &compile("//li[2] | //li[1]").unwrap(), &ctx);
    assert_eq!(vec!["a", "b"], texts(&hits));
}

#[test]
fn boolean_and_comparison_predicates() {
    ensure_logger();
    let doc = html::parse_utf8(
        b"<ul><li n=1>alpha</li><li n=2>beta</li><li n=3>alpha beta</li></ul>",
    );
    let ctx = Context::new();
    let t = |s: &str| texts(&all(&doc, &compile(s).unwrap(), &ctx));

    assert_eq!(vec!["beta"], t("//li[@n=2]"));
    assert_eq!(vec!["alpha", "alpha beta"], t("//li[@n=1 or @n=3]"));
    assert_eq!(vec!["alpha beta"], t("//li[@n>1 and @n<4][last()]"));
    assert_eq!(vec!["beta", "alpha beta"], t("//li[@n >= 2]"));
    assert_eq!(vec!["alpha", "beta"], t("//li[@n < 3]"));
    assert_eq!(vec!["alpha", "alpha beta"], t("//li[@n != 2]"));
    assert_eq!(vec!["beta"], t("//li[@n = 1 + 1]"));
    assert_eq!(vec!["alpha"], t("//li[@n = 9 mod 4]"));
    assert_eq!(vec!["alpha beta"], t("//li[@n = 2 * 1 + 1]"));
    assert_eq!(vec!["beta"], t("//li[@n = 4 div 2]"));
    assert_eq!(vec!["alpha beta"], t("//li[@n = -(1 - 4)]"));
}

#[test]
fn function_library() {
    ensure_logger();
    let doc = html::parse_utf8(
        b"<div><p>  alpha   beta </p><p>beta</p><span>x</span></div>",
    );
    let ctx = Context::new();
    let t = |s: &str| texts(&all(&doc, &compile(s).unwrap(), &ctx));

    assert_eq!(vec!["alpha beta", "beta"], t("//p[contains(., \"beta\")]"));
    assert_eq!(vec!["beta"], t("//p[starts-with(., \"beta\")]"));
    assert_eq!(
        vec!["alpha beta"],
        t("//p[normalize-space() = \"alpha beta\"]")
    );
    assert_eq!(vec!["x"], t("//span[name() = \"span\"]"));
    assert_eq!(vec!["x"], t("//span[local-name() = \"span\"]"));
    assert_eq!(vec!["beta"], t("//p[not(contains(., \"alpha\"))]"));
    assert_eq!(vec!["x"], t("//span[true()]"));
    assert!(t("//span[false()]").is_empty());
    assert_eq!(vec!["alpha beta", "beta"], t("//p[string(@missing) = \"\"]"));

    let hits = all(&doc, &compile("//div[count(p) = 2]").unwrap(), &ctx);
    assert_eq!(1, hits.len());
    assert!(all(&doc, &compile("//div[count(span) = 2]").unwrap(), &ctx).is_empty());
}

#[test]
fn relative_paths_anchor_at_scope() {
    ensure_logger();
    let doc = html::parse_utf8(
        b"<div id=out><section id=s><p>in</p></section></div>",
    );
    let ctx = Context::new();
    let section = one(&doc, &compile("//section").unwrap(), &ctx).unwrap();

    let hits = all(section, &compile(".//p").unwrap(), &ctx);
    assert_eq!(vec!["in"], texts(&hits));

    // The subtree root acts as the document root: ancestors outside the
    // scope are unreachable.
    assert!(all(section, &compile("//div//p").unwrap(), &ctx).is_empty());
    assert!(all(section, &compile("..").unwrap(), &ctx).is_empty());
}

#[test]
fn compile_errors() {
    ensure_logger();
    let err = compile("//li[").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("//li]").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("//unknown-axis::x").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("//li[frob(2)]").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);

    let err = compile("//li[contains(.)]").unwrap_err();
    assert!(matches!(err, Error::SelectorSyntax { .. }), "{:?}", err);
}

#[test]
fn type_errors() {
    ensure_logger();
    let err = compile("1 + 1").unwrap_err();
    assert!(matches!(err, Error::XPathType(_)), "{:?}", err);

    let err = compile("//a/@href").unwrap_err();
    assert!(matches!(err, Error::XPathType(_)), "{:?}", err);

    let err = compile("//a/@href/..").unwrap_err();
    assert!(matches!(err, Error::XPathType(_)), "{:?}", err);

    let err = compile("//li[count(2)]").unwrap_err();
    assert!(matches!(err, Error::XPathType(_)), "{:?}", err);

    let err = compile("//li | \"x\"").unwrap_err();
    assert!(matches!(err, Error::XPathType(_)), "{:?}", err);
}

#[test]
fn mixed_selector_lists() {
    ensure_logger();
    // CSS and XPath selectors interoperate in one selection.
    let doc = html::parse_utf8(b"<div><p>1</p><span>2</span></div>");
    let ctx = Context::new();
    let mut sel = crate::css::compile("span").unwrap();
    sel.extend(compile("//p").unwrap());
    let hits = all(&doc, &sel, &ctx);
    assert_eq!(vec!["1", "2"], texts(&hits));
}
