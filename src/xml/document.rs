//! Whole-part XML documents (declaration, prolog, root element)

use quick_xml::events::{BytesDecl, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};
use crate::xml::{RawXmlElement, RawXmlNode};

/// XML declaration (`<?xml ...?>`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".into(),
            encoding: Some("UTF-8".into()),
            standalone: Some("yes".into()),
        }
    }
}

/// A parsed XML part
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    /// Declaration, if the source had one
    pub declaration: Option<XmlDeclaration>,
    /// Nodes between the declaration and the root element
    pub prolog: Vec<RawXmlNode>,
    /// Root element
    pub root: RawXmlElement,
    /// Nodes after the root element
    pub epilog: Vec<RawXmlNode>,
}

impl XmlDocument {
    /// Create a document around a root element with the standard declaration
    pub fn new(root: RawXmlElement) -> Self {
        Self {
            declaration: Some(XmlDeclaration::default()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a complete XML part
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(bytes);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut root = None;
        let mut epilog = Vec::new();
        let mut buf = Vec::new();

        loop {
            let event = reader.read_event_into(&mut buf)?;
            let nodes = if root.is_some() {
                &mut epilog
            } else {
                &mut prolog
            };

            match event {
                Event::Decl(d) => {
                    declaration = Some(read_declaration(&d)?);
                }
                Event::Start(e) => {
                    if root.is_some() {
                        return Err(Error::InvalidDocument("multiple root elements".into()));
                    }
                    root = Some(RawXmlElement::from_reader(&mut reader, &e)?);
                }
                Event::Empty(e) => {
                    if root.is_some() {
                        return Err(Error::InvalidDocument("multiple root elements".into()));
                    }
                    root = Some(RawXmlElement::from_empty(&e)?);
                }
                Event::Text(t) => {
                    let text = t.unescape()?.into_owned();
                    if !text.is_empty() {
                        nodes.push(RawXmlNode::Text(text));
                    }
                }
                Event::Comment(c) => {
                    nodes.push(RawXmlNode::Comment(String::from_utf8_lossy(&c).into_owned()));
                }
                Event::PI(p) => {
                    nodes.push(RawXmlNode::ProcessingInstruction(
                        String::from_utf8_lossy(&p).into_owned(),
                    ));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let root = root.ok_or_else(|| Error::InvalidDocument("missing root element".into()))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
        }
        for node in &self.prolog {
            node.write_to(&mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            node.write_to(&mut writer)?;
        }

        Ok(writer.into_inner())
    }

    /// Serialize to a string
    pub fn to_xml(&self) -> Result<String> {
        String::from_utf8(self.to_bytes()?).map_err(|e| Error::InvalidDocument(e.to_string()))
    }
}

fn read_declaration(d: &BytesDecl) -> Result<XmlDeclaration> {
    let version = String::from_utf8_lossy(&d.version()?).into_owned();
    let encoding = d
        .encoding()
        .transpose()?
        .map(|v| String::from_utf8_lossy(&v).into_owned());
    let standalone = d
        .standalone()
        .transpose()?
        .map(|v| String::from_utf8_lossy(&v).into_owned());

    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}
