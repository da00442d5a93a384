//! XML to [`Node`] tree conversion.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use quick_xml::encoding::EncodingError;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};
use thiserror::Error;

use super::{Node, ATTRIBUTE_PREFIX, TEXT_KEY};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised for input that is not well-formed XML.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Error reported by the XML reader.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute.
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),

    /// Bytes that do not decode in the document's declared encoding.
    #[error("invalid text for the declared encoding: {0}")]
    Encoding(#[from] EncodingError),

    /// Structural problem the reader does not catch on its own.
    #[error("{0}")]
    Malformed(String),
}

/// Element being built while its end tag has not been seen yet.
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: BTreeMap<String, Node>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>, decoder: Decoder) -> Result<Self, ParseError> {
        let name = decoder.decode(start.name().as_ref())?.into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = decoder.decode(attr.key.as_ref())?;
            let value = attr.decode_and_unescape_value(decoder)?;
            attributes.push((format!("{ATTRIBUTE_PREFIX}{key}"), value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: BTreeMap::new(),
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, node: Node) {
        match self.children.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Node::List(items) => items.push(node),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Node::List(vec![first, node]);
                }
            },
        }
    }

    fn close(self) -> (String, Node) {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            let node = if text.is_empty() {
                Node::Null
            } else {
                Node::Text(text.to_string())
            };
            return (self.name, node);
        }

        let mut map = self.children;
        for (key, value) in self.attributes {
            map.insert(key, Node::Text(value));
        }
        if !text.is_empty() {
            map.insert(TEXT_KEY.to_string(), Node::Text(text.to_string()));
        }
        (self.name, Node::Map(map))
    }
}

/// Parse XML bytes into a tree rooted at a single-entry mapping.
///
/// Text is decoded with the encoding named in the XML declaration, UTF-8 when
/// there is none.
pub fn parse(bytes: &[u8]) -> Result<Node, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = Reader::from_reader(bytes);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                stack.push(Frame::open(&start, reader.decoder())?);
            }
            Event::Empty(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(ParseError::Malformed(
                        "more than one root element".to_string(),
                    ));
                }
                let (name, node) = Frame::open(&start, reader.decoder())?.close();
                attach(&mut stack, &mut root, name, node);
            }
            Event::End(_) => {
                let frame = stack.pop().ok_or_else(|| {
                    ParseError::Malformed("closing tag without an opening tag".to_string())
                })?;
                let (name, node) = frame.close();
                attach(&mut stack, &mut root, name, node);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let data = data.into_inner();
                push_text(&mut stack, &reader.decoder().decode(&data)?)?;
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    let (name, node) =
        root.ok_or_else(|| ParseError::Malformed("no root element".to_string()))?;
    Ok(Node::Map(BTreeMap::from([(name, node)])))
}

fn attach(stack: &mut [Frame], root: &mut Option<(String, Node)>, name: String, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, node),
        None => *root = Some((name, node)),
    }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(frame) => {
            frame.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::Malformed(
            "text outside of the root element".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(value: &str) -> Node {
        Node::Text(value.to_string())
    }

    #[test]
    fn test_attributes_and_text_children() {
        let tree = parse(br#"<NFe><infNFe Id="NFe123" versao="4.00"><ide>x</ide></infNFe></NFe>"#)
            .unwrap();

        let inf = tree.get("NFe").and_then(|n| n.get("infNFe")).unwrap();
        assert_eq!(inf.get("@Id"), Some(&text("NFe123")));
        assert_eq!(inf.get("@versao"), Some(&text("4.00")));
        assert_eq!(inf.get("ide"), Some(&text("x")));
    }

    #[test]
    fn test_repeated_children_become_list() {
        let tree = parse(b"<a><det>1</det><det>2</det><det>3</det></a>").unwrap();
        assert_eq!(
            tree.get("a").and_then(|n| n.get("det")),
            Some(&Node::List(vec![text("1"), text("2"), text("3")]))
        );
    }

    #[test]
    fn test_empty_and_mixed_elements() {
        let tree = parse(b"<a><empty/><blank>   </blank><mixed unit=\"kg\"> 12 </mixed></a>").unwrap();
        let a = tree.get("a").unwrap();

        assert_eq!(a.get("empty"), Some(&Node::Null));
        assert_eq!(a.get("blank"), Some(&Node::Null));
        assert_eq!(a.get("mixed").map(Node::text), Some("12"));
        assert_eq!(
            a.get("mixed").and_then(|n| n.get("@unit")),
            Some(&text("kg"))
        );
    }

    #[test]
    fn test_entities_cdata_and_bom() {
        let tree = parse(b"\xEF\xBB\xBF<?xml version=\"1.0\"?><a><b>A &amp; B</b><c><![CDATA[<raw>]]></c></a>")
            .unwrap();
        let a = tree.get("a").unwrap();

        assert_eq!(a.get("b").map(Node::text), Some("A & B"));
        assert_eq!(a.get("c").map(Node::text), Some("<raw>"));
    }

    #[test]
    fn test_latin1_declared_encoding() {
        let xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\
            <emit nome=\"Jos\xE9\"><xNome>Padaria S\xE3o Jos\xE9</xNome><xMun><![CDATA[Maca\xE9]]></xMun></emit>";
        let tree = parse(xml).unwrap();
        let emit = tree.get("emit").unwrap();

        assert_eq!(emit.get("xNome").map(Node::text), Some("Padaria São José"));
        assert_eq!(emit.get("@nome").map(Node::text), Some("José"));
        assert_eq!(emit.get("xMun").map(Node::text), Some("Macaé"));
    }

    #[test]
    fn test_undeclared_encoding_must_be_utf8() {
        assert!(parse(b"<a>S\xE3o</a>").is_err());
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(parse(b"this is not xml at all").is_err());
        assert!(parse(b"").is_err());
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"<a><b>").is_err());
        assert!(parse(b"<a/><b/>").is_err());
        assert!(parse(b"<a></a> trailing").is_err());
    }
}
