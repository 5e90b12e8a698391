//! Extraction operations on selected nodes.

use std::collections::HashMap;

use crate::chars::collapse_ws;
use crate::dom::{Attribute, NodeData, NodeRef, StrTendril};

impl<'a> NodeRef<'a> {
    /// Return the element tag (local) name, or `None` for non-elements.
    pub fn tag(&self) -> Option<&'a str> {
        match &self.document()[self.id()].data {
            NodeData::Elem(e) => Some(&e.name.local),
            _ => None,
        }
    }

    /// Return the first value of the named attribute, or `None`.
    ///
    /// Attribute names compare ASCII case-insensitively in HTML documents
    /// and exactly in XML documents.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        let elm = match &self.document()[self.id()].data {
            NodeData::Elem(e) => e,
            _ => return None,
        };
        let html = self.document().markup_kind().is_html();
        elm.attrs
            .iter()
            .find(|a| {
                let local: &str = &a.name.local;
                if html {
                    local.eq_ignore_ascii_case(name)
                } else {
                    local == name
                }
            })
            .map(|a| {
                let v: &str = &a.value;
                v
            })
    }

    /// Return the ordered attribute list, or `None` for non-elements.
    pub fn attrs(&self) -> Option<&'a [Attribute]> {
        match &self.document()[self.id()].data {
            NodeData::Elem(e) => Some(&e.attrs),
            _ => None,
        }
    }

    /// Return the whitespace-collapsed content of this node's text
    /// children only, joined by single spaces and trimmed.
    ///
    /// Text in nested elements does not contribute; see [`NodeRef::text`]
    /// for the deep variant.
    pub fn own_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for child in self.children() {
            if let NodeData::Text(t) = &child.data {
                let collapsed = collapse_ws(t, true);
                if !collapsed.is_empty() {
                    parts.push(collapsed);
                }
            }
        }
        parts.join(" ")
    }

    /// Return the text content of this node and all descendants, with any
    /// run of space, TAB, CR or LF collapsed to a single space and the
    /// final string trimmed.
    pub fn text(&self) -> String {
        let raw = self.raw_text().unwrap_or_else(StrTendril::new);
        collapse_ws(&raw, true)
    }

    /// Serialize this node and its descendants to markup.
    pub fn html(&self) -> String {
        self.to_string()
    }

    /// Return raw data content.
    ///
    /// For a comment holding a CDATA section (as produced by HTML5 parsers,
    /// which lower CDATA into comments) this is the section interior,
    /// detected by a leading `[CDATA[` and trailing `]]`. Otherwise it is
    /// the whitespace-collapsed content of this node (when it is a `Data`
    /// node) and all `Data` descendants, concatenated.
    pub fn data(&self) -> String {
        if let NodeData::Comment(c) = &self.document()[self.id()].data {
            let c: &str = c;
            if let Some(interior) = c.strip_prefix("[CDATA[") {
                if let Some(interior) = interior.strip_suffix("]]") {
                    return interior.to_string();
                }
            }
            return String::new();
        }
        let mut raw = String::new();
        if let NodeData::Data(d) = &self.document()[self.id()].data {
            raw.push_str(&d.content);
        }
        let doc = self.document();
        for id in doc.descendants(self.id()) {
            if let NodeData::Data(d) = &doc[id].data {
                raw.push_str(&d.content);
            }
        }
        collapse_ws(&raw, true)
    }

    /// Return the `data-*` attribute map, or `None` for non-elements.
    ///
    /// Only attributes whose `data-` suffix is a non-empty identifier over
    /// lowercase letters, digits and hyphens contribute; the suffix is
    /// converted to lowerCamelCase (`data-x-val` becomes `xVal`). On
    /// duplicates the first value wins.
    pub fn dataset(&self) -> Option<HashMap<String, String>> {
        let elm = match &self.document()[self.id()].data {
            NodeData::Elem(e) => e,
            _ => return None,
        };
        let mut map = HashMap::new();
        for attr in &elm.attrs {
            let local: &str = &attr.name.local;
            let suffix = match local.strip_prefix("data-") {
                Some(s) => s,
                None => continue,
            };
            if suffix.is_empty() || !suffix.bytes().all(is_dataset_suffix_byte) {
                continue;
            }
            map.entry(camel_case(suffix))
                .or_insert_with(|| attr.value.to_string());
        }
        Some(map)
    }
}

fn is_dataset_suffix_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'-')
}

/// Convert a hyphen-separated suffix to lowerCamelCase.
fn camel_case(suffix: &str) -> String {
    let mut out = String::with_capacity(suffix.len());
    let mut segments = suffix.split('-');
    if let Some(first) = segments.next() {
        out.push_str(first);
    }
    for seg in segments {
        let mut chars = seg.chars();
        if let Some(c) = chars.next() {
            out.extend(c.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
