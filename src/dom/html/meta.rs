//! Static metadata for HTML tags needed by serialization and fragment
//! parsing.

use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::dom::LocalName;

lazy_static! {
    /// The HTML5 void elements, serialized without a closing tag.
    pub static ref VOID_TAGS: HashSet<LocalName> = [
        local_name!("area"),
        local_name!("base"),
        local_name!("br"),
        local_name!("col"),
        local_name!("embed"),
        local_name!("hr"),
        local_name!("img"),
        local_name!("input"),
        local_name!("link"),
        local_name!("meta"),
        local_name!("param"),
        local_name!("source"),
        local_name!("track"),
        local_name!("wbr"),
    ]
    .iter()
    .cloned()
    .collect();

    /// Phrasing-level elements which do not qualify as a standalone root
    /// for a parsed fragment.
    pub static ref INLINE_TAGS: HashSet<LocalName> = [
        local_name!("a"),
        local_name!("abbr"),
        local_name!("b"),
        local_name!("bdi"),
        local_name!("bdo"),
        local_name!("br"),
        local_name!("button"),
        local_name!("cite"),
        local_name!("code"),
        local_name!("data"),
        local_name!("dfn"),
        local_name!("em"),
        local_name!("i"),
        local_name!("img"),
        local_name!("input"),
        local_name!("kbd"),
        local_name!("label"),
        local_name!("mark"),
        local_name!("meter"),
        local_name!("output"),
        local_name!("progress"),
        local_name!("q"),
        local_name!("ruby"),
        local_name!("s"),
        local_name!("samp"),
        local_name!("select"),
        local_name!("small"),
        local_name!("span"),
        local_name!("strong"),
        local_name!("sub"),
        local_name!("sup"),
        local_name!("textarea"),
        local_name!("time"),
        local_name!("u"),
        local_name!("var"),
        local_name!("wbr"),
    ]
    .iter()
    .cloned()
    .collect();
}
