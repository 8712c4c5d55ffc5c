//! Patch run configuration

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::numbering::{FreshAllocation, NumberingStrategy};

/// Representation of the patched package
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputType {
    /// Raw archive bytes
    #[default]
    Bytes,
    /// Archive bytes encoded as standard base64
    Base64,
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bytes" | "nodebuffer" | "uint8array" => Ok(OutputType::Bytes),
            "base64" => Ok(OutputType::Base64),
            _ => Err(Error::InvalidOutputType(s.to_string())),
        }
    }
}

/// Strings surrounding a placeholder name in the template
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderDelimiters {
    pub start: String,
    pub end: String,
}

impl Default for PlaceholderDelimiters {
    fn default() -> Self {
        Self {
            start: "{{".into(),
            end: "}}".into(),
        }
    }
}

impl PlaceholderDelimiters {
    /// Delimiter pair
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Both delimiters must contain something other than whitespace
    pub fn validate(&self) -> Result<()> {
        if self.start.trim().is_empty() || self.end.trim().is_empty() {
            return Err(Error::EmptyDelimiter);
        }
        Ok(())
    }

    /// Placeholder token for `name`
    pub fn token(&self, name: &str) -> String {
        format!("{}{}{}", self.start, name, self.end)
    }
}

/// Options for [`patch_document`](super::patch_document)
#[derive(Debug)]
pub struct PatchOptions {
    pub output_type: OutputType,
    /// Carry the formatting of the run holding a placeholder over to the
    /// runs inserted by paragraph patches
    pub keep_original_styles: bool,
    pub delimiters: PlaceholderDelimiters,
    /// Keep replacing until no occurrence of a placeholder remains in a part
    pub recursive: bool,
    /// Decides whether list references reuse numbering found in the template
    pub numbering_strategy: Box<dyn NumberingStrategy>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            output_type: OutputType::Bytes,
            keep_original_styles: false,
            delimiters: PlaceholderDelimiters::default(),
            recursive: true,
            numbering_strategy: Box::new(FreshAllocation),
        }
    }
}

impl PatchOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output representation
    pub fn with_output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Keep placeholder run formatting
    pub fn with_keep_original_styles(mut self, keep: bool) -> Self {
        self.keep_original_styles = keep;
        self
    }

    /// Set placeholder delimiters
    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.delimiters = PlaceholderDelimiters::new(start, end);
        self
    }

    /// Replace only the first occurrence of each placeholder per pass
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set numbering strategy
    pub fn with_numbering_strategy(mut self, strategy: impl NumberingStrategy + 'static) -> Self {
        self.numbering_strategy = Box::new(strategy);
        self
    }
}
