//! OPC Package implementation
//!
//! Handles reading and writing DOCX files as ZIP packages

use crate::error::{Error, Result};
use crate::opc::{well_known, ContentTypes, Part, PartUri, Relationships};
use crate::xml::XmlDocument;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

/// An OPC package: every archive entry as a [`Part`], in archive order
#[derive(Debug, Default)]
pub struct Package {
    /// All parts in the package
    parts: HashMap<PartUri, Part>,
    /// Archive order, new parts appended
    order: Vec<PartUri>,
}

impl Package {
    /// Create a new empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        Self::from_reader(cursor)
    }

    /// Open a package from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut package = Self::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }

            let uri = PartUri::new(file.name())?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;

            package.insert(Part::from_raw(uri, data));
        }

        log::debug!("Loaded package with {} parts", package.order.len());
        Ok(package)
    }

    /// Save the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let cursor = Cursor::new(&mut buf);
        self.write_to(cursor)?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in self.parts() {
            zip.start_file(part.uri().zip_name(), options)?;
            zip.write_all(&part.to_bytes()?)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by URI
    pub fn part(&self, uri: &PartUri) -> Option<&Part> {
        self.parts.get(uri)
    }

    /// Get a mutable part by URI
    pub fn part_mut(&mut self, uri: &PartUri) -> Option<&mut Part> {
        self.parts.get_mut(uri)
    }

    /// Whether the package has a part at `uri`
    pub fn contains(&self, uri: &PartUri) -> bool {
        self.parts.contains_key(uri)
    }

    /// Add a part, replacing any existing part with the same URI in place
    pub fn insert(&mut self, part: Part) {
        let uri = part.uri().clone();
        if self.parts.insert(uri.clone(), part).is_none() {
            self.order.push(uri);
        }
    }

    /// Get all part URIs in archive order
    pub fn part_uris(&self) -> impl Iterator<Item = &PartUri> {
        self.order.iter()
    }

    /// Get all parts in archive order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.order.iter().filter_map(|uri| self.parts.get(uri))
    }

    /// Parse `[Content_Types].xml`
    pub fn content_types(&self) -> Result<ContentTypes> {
        let uri = well_known::content_types();
        let doc = self
            .part(&uri)
            .and_then(Part::xml)
            .ok_or_else(|| Error::MissingPart(uri.zip_name().to_string()))?;
        ContentTypes::from_element(&doc.root)
    }

    /// Store the registry; the part is only rewritten when it changed
    pub fn set_content_types(&mut self, content_types: &ContentTypes) -> Result<()> {
        if self.content_types()? == *content_types {
            return Ok(());
        }
        self.store_xml(well_known::content_types(), content_types.to_document());
        Ok(())
    }

    /// Relationships of `source` (empty when the part has no `.rels` part yet)
    pub fn relationships(&self, source: &PartUri) -> Result<Relationships> {
        let rels_uri = source.relationships_uri();
        match self.part(&rels_uri) {
            None => Ok(Relationships::new()),
            Some(part) => {
                let doc = part.xml().ok_or_else(|| {
                    Error::InvalidDocument(format!("{} is not readable XML", rels_uri))
                })?;
                Relationships::from_element(&doc.root)
            }
        }
    }

    /// Store the relationships of `source`, creating the `.rels` part if needed.
    ///
    /// An existing part is only rewritten when the registry changed.
    pub fn set_relationships(&mut self, source: &PartUri, rels: &Relationships) -> Result<()> {
        let rels_uri = source.relationships_uri();
        if self.contains(&rels_uri) && self.relationships(source)? == *rels {
            return Ok(());
        }
        self.store_xml(rels_uri, rels.to_document());
        Ok(())
    }

    /// Replace (or create) an XML part, keeping the original declaration and
    /// any prolog of an existing part
    pub fn store_xml(&mut self, uri: PartUri, mut doc: XmlDocument) {
        match self.parts.get_mut(&uri) {
            Some(part) => {
                if let Some(existing) = part.xml() {
                    doc.declaration = existing.declaration.clone();
                    doc.prolog = existing.prolog.clone();
                }
                part.set_xml(doc);
            }
            None => self.insert(Part::new_xml(uri, doc)),
        }
    }
}
