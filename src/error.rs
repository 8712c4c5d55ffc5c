//! Error types for linch-docx-patch

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part URI: {0}")]
    InvalidPartUri(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Both start and end delimiters must be non-empty strings")]
    EmptyDelimiter,

    #[error("Invalid output type: {0}")]
    InvalidOutputType(String),

    #[error("Numbering has not been generated yet")]
    NumberingNotGenerated,

    #[error("Numbering must be generated before creating concrete instances")]
    NumberingUnconfigured,

    #[error("No numbering definition was generated for reference '{0}'")]
    UnknownNumberingReference(String),

    #[error("Patch '{patch}' references numbering '{reference}' which has no concrete instance")]
    UnresolvedNumberingReference { patch: String, reference: String },

    #[error("Failed to apply patch '{patch}' to {part}: {source}")]
    Patch {
        part: String,
        patch: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the part and patch it was raised for
    pub(crate) fn in_patch(self, part: &str, patch: &str) -> Self {
        match self {
            // Already carries context
            Error::Patch { .. } => self,
            other => Error::Patch {
                part: part.to_string(),
                patch: patch.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
