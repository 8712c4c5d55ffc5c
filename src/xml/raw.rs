//! Raw XML node types for lossless round-trip of package parts

use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::BufRead;

use crate::error::{Error, Result};

/// Raw XML node
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawXmlNode {
    /// Element node
    Element(RawXmlElement),
    /// Text node (unescaped)
    Text(String),
    /// Comment node
    Comment(String),
    /// CDATA section
    CData(String),
    /// Processing instruction (target and content)
    ProcessingInstruction(String),
}

/// Raw XML element with attributes and children
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawXmlElement {
    /// Full element name (with prefix, e.g., "w:customXml")
    pub name: String,
    /// Attributes as (name, unescaped value) pairs, in document order
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<RawXmlNode>,
    /// Whether this was a self-closing element
    pub self_closing: bool,
}

impl RawXmlElement {
    /// Create a new empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Read a complete element from XML reader (starting after the start tag was read)
    pub fn from_reader<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<Self> {
        let mut element = Self::from_start(start)?;
        element.self_closing = false;

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e)?;
                    element.children.push(RawXmlNode::Element(child));
                }
                Event::Empty(e) => {
                    element
                        .children
                        .push(RawXmlNode::Element(Self::from_empty(&e)?));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.into_owned();
                    if !text.is_empty() {
                        element.children.push(RawXmlNode::Text(text));
                    }
                }
                Event::CData(c) => {
                    element
                        .children
                        .push(RawXmlNode::CData(String::from_utf8_lossy(&c).into_owned()));
                }
                Event::Comment(c) => {
                    element
                        .children
                        .push(RawXmlNode::Comment(String::from_utf8_lossy(&c).into_owned()));
                }
                Event::PI(p) => {
                    element.children.push(RawXmlNode::ProcessingInstruction(
                        String::from_utf8_lossy(&p).into_owned(),
                    ));
                }
                Event::End(e) => {
                    if e.name().as_ref() == element.name.as_bytes() {
                        break;
                    }
                }
                Event::Eof => return Err(Error::InvalidDocument("Unexpected EOF".into())),
                _ => {}
            }
            buf.clear();
        }

        Ok(element)
    }

    /// Create from empty element tag
    pub fn from_empty(e: &BytesStart) -> Result<Self> {
        let mut element = Self::from_start(e)?;
        element.self_closing = true;
        Ok(element)
    }

    fn from_start(e: &BytesStart) -> Result<Self> {
        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }

        Ok(Self {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            attributes,
            children: Vec::new(),
            self_closing: true,
        })
    }

    /// Write element to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }

        Ok(())
    }

    /// Serialize this element alone to a string
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::InvalidDocument(e.to_string()))
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: RawXmlElement) -> Self {
        self.children.push(RawXmlNode::Element(child));
        self
    }

    /// Add several child elements
    pub fn with_children(mut self, children: impl IntoIterator<Item = RawXmlElement>) -> Self {
        self.children
            .extend(children.into_iter().map(RawXmlNode::Element));
        self
    }

    /// Add a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(RawXmlNode::Text(text.into()));
        self
    }

    /// Mark as self-closing when it has no children
    pub fn empty(mut self) -> Self {
        self.self_closing = true;
        self
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Get an attribute value by full name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, returning whether the element changed
    pub fn set_attr(&mut self, name: &str, value: &str) -> bool {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) if v == value => false,
            Some((_, v)) => {
                *v = value.to_string();
                true
            }
            None => {
                self.attributes.push((name.to_string(), value.to_string()));
                true
            }
        }
    }

    /// Iterate over child elements
    pub fn elements(&self) -> impl Iterator<Item = &RawXmlElement> {
        self.children.iter().filter_map(|c| match c {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Iterate mutably over child elements
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut RawXmlElement> {
        self.children.iter_mut().filter_map(|c| match c {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given full name
    pub fn child(&self, name: &str) -> Option<&RawXmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All descendant elements (at any depth) with the given full name
    pub fn find_all(&self, name: &str) -> Vec<&RawXmlElement> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a RawXmlElement>) {
        for child in self.elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Visit this element and every descendant element, depth first
    pub fn visit_mut<F: FnMut(&mut RawXmlElement)>(&mut self, f: &mut F) {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                RawXmlNode::Text(t) | RawXmlNode::CData(t) => out.push_str(t),
                RawXmlNode::Element(e) => e.push_text(out),
                _ => {}
            }
        }
    }
}

impl RawXmlNode {
    /// Write node to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            RawXmlNode::Element(e) => e.write_to(writer),
            RawXmlNode::Text(t) => {
                writer.write_event(Event::Text(BytesText::new(t)))?;
                Ok(())
            }
            RawXmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?;
                Ok(())
            }
            RawXmlNode::CData(c) => {
                writer.write_event(Event::CData(BytesCData::new(c.as_str())))?;
                Ok(())
            }
            RawXmlNode::ProcessingInstruction(p) => {
                writer.write_event(Event::PI(BytesPI::new(p.as_str())))?;
                Ok(())
            }
        }
    }

    /// Borrow as element if this node is one
    pub fn as_element(&self) -> Option<&RawXmlElement> {
        match self {
            RawXmlNode::Element(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> RawXmlElement {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf).unwrap() {
                Event::Start(e) => return RawXmlElement::from_reader(&mut reader, &e).unwrap(),
                Event::Empty(e) => return RawXmlElement::from_empty(&e).unwrap(),
                Event::Eof => panic!("no element"),
                _ => {}
            }
            buf.clear();
        }
    }

    #[test]
    fn test_attribute_values_are_unescaped_once() {
        let elem = parse(r#"<w:hyperlink w:tooltip="a &amp; b"/>"#);
        assert_eq!(elem.attr("w:tooltip"), Some("a & b"));

        let xml = elem.to_xml_string().unwrap();
        assert_eq!(xml, r#"<w:hyperlink w:tooltip="a &amp; b"/>"#);
    }

    #[test]
    fn test_whitespace_text_is_preserved() {
        let elem = parse(r#"<w:r><w:t xml:space="preserve"> </w:t></w:r>"#);
        let t = elem.child("w:t").unwrap();
        assert_eq!(t.text(), " ");
    }

    #[test]
    fn test_find_all_and_local_name() {
        let elem = parse(
            r#"<w:body><w:p><w:r><w:t>a</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl></w:body>"#,
        );
        let paras = elem.find_all("w:p");
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].local_name(), "p");
        assert_eq!(elem.text(), "a");
    }

    #[test]
    fn test_set_attr_reports_change() {
        let mut elem = RawXmlElement::new("w:numId").with_attr("w:val", "1");
        assert!(!elem.set_attr("w:val", "1"));
        assert!(elem.set_attr("w:val", "2"));
        assert!(elem.set_attr("w:other", "x"));
        assert_eq!(elem.attr("w:val"), Some("2"));
    }
}
