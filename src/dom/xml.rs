//! Support for XML parsing to `Document`.

use xml_rs::reader::XmlEvent;

use crate::dom::{
    Attribute, Data, DataKind, Document, Element, MarkupKind, Namespace, Node, NodeData, NodeId,
    ProcessingInstruction, QualName, StrTendril,
};
use crate::error::Error;

/// Parse an XML document from UTF-8 bytes in RAM.
pub fn parse_utf8(utf8_bytes: &[u8]) -> Result<Document, Error> {
    let mut document = Document::new(MarkupKind::Xml);
    let mut current = Document::DOCUMENT_NODE_ID;
    let mut open: Vec<NodeId> = Vec::new();
    let reader = xml_rs::ParserConfig::new()
        .ignore_comments(false)
        .create_reader(utf8_bytes);
    for event in reader {
        match event.map_err(|e| Error::ParseMarkup(e.to_string()))? {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let attrs = attributes
                    .into_iter()
                    .map(|a| Attribute {
                        name: convert_name(a.name),
                        value: a.value.into(),
                    })
                    .collect();
                let id = document.append_child(
                    current,
                    Node::new_elem(Element {
                        name: convert_name(name),
                        attrs,
                    }),
                );
                open.push(current);
                current = id;
            }
            XmlEvent::EndElement { .. } => {
                current = open.pop().expect("balanced elements");
            }
            XmlEvent::Characters(s) => {
                // Runs of character data coalesce into one text node.
                let tail = document[current].last_child;
                let mut merged = false;
                if let Some(tail) = tail {
                    if let NodeData::Text(t) = &mut document.node_mut(tail).data {
                        t.push_slice(&s);
                        merged = true;
                    }
                }
                if !merged {
                    document.append_child(current, Node::new_text(s));
                }
            }
            XmlEvent::CData(s) => {
                document.append_child(
                    current,
                    Node::new(NodeData::Data(Data {
                        content: s.into(),
                        kind: DataKind::Cdata,
                    })),
                );
            }
            XmlEvent::Comment(s) => {
                document.append_child(current, Node::new(NodeData::Comment(s.into())));
            }
            XmlEvent::ProcessingInstruction { name, data } => {
                document.append_child(
                    current,
                    Node::new(NodeData::Pi(ProcessingInstruction {
                        target: name.into(),
                        data: data.map_or_else(StrTendril::new, StrTendril::from),
                    })),
                );
            }
            XmlEvent::Whitespace(_) => {
                // Ignorable whitespace between elements is dropped.
            }
            XmlEvent::StartDocument { .. } | XmlEvent::EndDocument => {}
            // Other reader events (e.g. doctype syntax) carry nothing the
            // store keeps.
            _ => {}
        }
    }
    Ok(document)
}

fn convert_name(name: xml_rs::name::OwnedName) -> QualName {
    let ns = name.namespace.map_or_else(|| ns!(), Namespace::from);
    QualName {
        prefix: name.prefix.map(Into::into),
        ns,
        local: name.local_name.into(),
    }
}
