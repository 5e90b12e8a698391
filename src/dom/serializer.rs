use std::io;
use std::io::Write;
use std::string::ToString;

use crate::dom::html::meta;
use crate::dom::{DataKind, Document, MarkupKind, NodeData, NodeRef, QualName};

/// Serialize convenience methods.
impl Document {
    /// Serialize the contents of the document node and descendants in
    /// markup syntax to the given stream.
    pub fn serialize<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        for id in self.roots() {
            write_node(writer, NodeRef::new(self, id))?;
        }
        Ok(())
    }
}

impl<'a> NodeRef<'a> {
    /// Serialize the referenced node and its descendants in markup syntax
    /// to the given stream.
    pub fn serialize<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        write_node(writer, *self)
    }
}

/// Implemented via [`Document::serialize`].
impl ToString for Document {
    fn to_string(&self) -> String {
        let mut out = Vec::new();
        self.serialize(&mut out).expect("in-memory serialize");
        String::from_utf8(out).expect("serializer emits UTF-8")
    }
}

/// Implemented via [`NodeRef::serialize`].
impl<'a> ToString for NodeRef<'a> {
    fn to_string(&self) -> String {
        let mut out = Vec::new();
        self.serialize(&mut out).expect("in-memory serialize");
        String::from_utf8(out).expect("serializer emits UTF-8")
    }
}

fn write_node<W: Write>(w: &mut W, node: NodeRef<'_>) -> io::Result<()> {
    let html = node.document().markup_kind() == MarkupKind::Html;
    match &node.document()[node.id()].data {
        NodeData::Document => {
            for child in node.children() {
                write_node(w, child)?;
            }
            Ok(())
        }
        NodeData::Elem(elm) => {
            w.write_all(b"<")?;
            write_name(w, &elm.name)?;
            for attr in &elm.attrs {
                w.write_all(b" ")?;
                write_name(w, &attr.name)?;
                w.write_all(b"=\"")?;
                write_escaped(w, &attr.value, true)?;
                w.write_all(b"\"")?;
            }
            if html && meta::VOID_TAGS.contains(&elm.name.local) {
                return w.write_all(b">");
            }
            if !html && node.children().next().is_none() {
                return w.write_all(b"/>");
            }
            w.write_all(b">")?;
            for child in node.children() {
                write_node(w, child)?;
            }
            w.write_all(b"</")?;
            write_name(w, &elm.name)?;
            w.write_all(b">")
        }
        NodeData::Text(t) => write_escaped(w, t, false),
        NodeData::Data(d) => match d.kind {
            DataKind::Cdata => {
                w.write_all(b"<![CDATA[")?;
                w.write_all(d.content.as_bytes())?;
                w.write_all(b"]]>")
            }
            DataKind::Script | DataKind::Style => w.write_all(d.content.as_bytes()),
        },
        NodeData::Comment(t) => {
            w.write_all(b"<!--")?;
            w.write_all(t.as_bytes())?;
            w.write_all(b"-->")
        }
        NodeData::Doctype(dt) => {
            w.write_all(b"<!DOCTYPE ")?;
            w.write_all(dt.name.as_bytes())?;
            if !dt.public_id.is_empty() {
                write!(w, " PUBLIC \"{}\" \"{}\"", dt.public_id, dt.system_id)?;
            } else if !dt.system_id.is_empty() {
                write!(w, " SYSTEM \"{}\"", dt.system_id)?;
            }
            w.write_all(b">")
        }
        NodeData::Pi(pi) => {
            w.write_all(b"<?")?;
            w.write_all(pi.target.as_bytes())?;
            if !pi.data.is_empty() {
                w.write_all(b" ")?;
                w.write_all(pi.data.as_bytes())?;
            }
            w.write_all(b"?>")
        }
    }
}

fn write_name<W: Write>(w: &mut W, name: &QualName) -> io::Result<()> {
    if let Some(prefix) = &name.prefix {
        w.write_all(prefix.as_bytes())?;
        w.write_all(b":")?;
    }
    w.write_all(name.local.as_bytes())
}

/// Entity-escape text or attribute-value content.
fn write_escaped<W: Write>(w: &mut W, text: &str, attr_mode: bool) -> io::Result<()> {
    let bytes = text.as_bytes();
    let mut last = 0;
    for (i, b) in bytes.iter().enumerate() {
        let rep: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' if !attr_mode => b"&lt;",
            b'>' if !attr_mode => b"&gt;",
            b'"' if attr_mode => b"&quot;",
            _ => continue,
        };
        w.write_all(&bytes[last..i])?;
        w.write_all(rep)?;
        last = i + 1;
    }
    w.write_all(&bytes[last..])
}
