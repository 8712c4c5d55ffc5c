//! Inline images (w:drawing) and the media they embed

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::Error;
use crate::xml::{RawXmlElement, A, PIC, R};

use super::RenderContext;

/// EMUs per pixel at 96 DPI
pub const EMU_PER_PIXEL: u64 = 9525;

/// Image file format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpg,
    Gif,
    Bmp,
    Svg,
}

impl ImageType {
    /// File extension used for the media part
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpg => "jpg",
            ImageType::Gif => "gif",
            ImageType::Bmp => "bmp",
            ImageType::Svg => "svg",
        }
    }
}

impl FromStr for ImageType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageType::Png),
            "jpg" | "jpeg" => Ok(ImageType::Jpg),
            "gif" => Ok(ImageType::Gif),
            "bmp" => Ok(ImageType::Bmp),
            "svg" => Ok(ImageType::Svg),
            other => Err(Error::InvalidDocument(format!(
                "unsupported image type '{}'",
                other
            ))),
        }
    }
}

/// An image placed inline in a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub data: Vec<u8>,
    pub image_type: ImageType,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Alt text
    pub alt: Option<String>,
}

impl Image {
    /// Image of `width` x `height` pixels
    pub fn new(data: Vec<u8>, image_type: ImageType, width: u32, height: u32) -> Self {
        Self {
            data,
            image_type,
            width,
            height,
            alt: None,
        }
    }

    /// Set alt text
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Build a `w:r` holding the drawing. `r:embed` carries the media token
    /// until the part's relationships are reconciled.
    pub(crate) fn render(&self, ctx: &mut RenderContext<'_>) -> RawXmlElement {
        let (file_name, drawing_id) = ctx.media.add(self);
        let cx = (u64::from(self.width) * EMU_PER_PIXEL).to_string();
        let cy = (u64::from(self.height) * EMU_PER_PIXEL).to_string();
        let id = drawing_id.to_string();

        let doc_pr = RawXmlElement::new("wp:docPr")
            .with_attr("id", id.as_str())
            .with_attr("name", file_name.as_str())
            .with_attr("descr", self.alt.as_deref().unwrap_or_default())
            .empty();

        let picture = RawXmlElement::new("pic:pic")
            .with_attr("xmlns:pic", PIC)
            .with_child(
                RawXmlElement::new("pic:nvPicPr")
                    .with_child(
                        RawXmlElement::new("pic:cNvPr")
                            .with_attr("id", "0")
                            .with_attr("name", file_name.as_str())
                            .empty(),
                    )
                    .with_child(RawXmlElement::new("pic:cNvPicPr").empty()),
            )
            .with_child(
                RawXmlElement::new("pic:blipFill")
                    .with_child(
                        RawXmlElement::new("a:blip")
                            .with_attr("r:embed", media_token(&file_name))
                            .with_attr("xmlns:r", R)
                            .empty(),
                    )
                    .with_child(
                        RawXmlElement::new("a:stretch")
                            .with_child(RawXmlElement::new("a:fillRect").empty()),
                    ),
            )
            .with_child(
                RawXmlElement::new("pic:spPr")
                    .with_child(
                        RawXmlElement::new("a:xfrm")
                            .with_child(
                                RawXmlElement::new("a:off")
                                    .with_attr("x", "0")
                                    .with_attr("y", "0")
                                    .empty(),
                            )
                            .with_child(
                                RawXmlElement::new("a:ext")
                                    .with_attr("cx", cx.as_str())
                                    .with_attr("cy", cy.as_str())
                                    .empty(),
                            ),
                    )
                    .with_child(
                        RawXmlElement::new("a:prstGeom")
                            .with_attr("prst", "rect")
                            .with_child(RawXmlElement::new("a:avLst").empty()),
                    ),
            );

        let inline = RawXmlElement::new("wp:inline")
            .with_attr("distT", "0")
            .with_attr("distB", "0")
            .with_attr("distL", "0")
            .with_attr("distR", "0")
            .with_child(
                RawXmlElement::new("wp:extent")
                    .with_attr("cx", cx.as_str())
                    .with_attr("cy", cy.as_str())
                    .empty(),
            )
            .with_child(doc_pr)
            .with_child(
                RawXmlElement::new("wp:cNvGraphicFramePr").with_child(
                    RawXmlElement::new("a:graphicFrameLocks")
                        .with_attr("xmlns:a", A)
                        .with_attr("noChangeAspect", "1")
                        .empty(),
                ),
            )
            .with_child(
                RawXmlElement::new("a:graphic").with_attr("xmlns:a", A).with_child(
                    RawXmlElement::new("a:graphicData")
                        .with_attr("uri", PIC)
                        .with_child(picture),
                ),
            );

        RawXmlElement::new("w:r")
            .with_child(RawXmlElement::new("w:drawing").with_child(inline))
    }
}

/// Placeholder written into `r:embed` for a media file
pub fn media_token(file_name: &str) -> String {
    format!("{{{}}}", file_name)
}

/// A media file to be written under `word/media/`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaItem {
    pub file_name: String,
    pub image_type: ImageType,
    pub data: Vec<u8>,
}

/// Media embedded during one patch run
#[derive(Clone, Debug, Default)]
pub struct MediaCollection {
    items: Vec<MediaItem>,
    /// File names already used by the template
    reserved: BTreeSet<String>,
}

impl MediaCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection that never reuses the given file names
    pub fn with_reserved<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: Vec::new(),
            reserved: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Register an image and return its file name and drawing id. Identical
    /// images share one file.
    pub fn add(&mut self, image: &Image) -> (String, usize) {
        if let Some(pos) = self
            .items
            .iter()
            .position(|m| m.image_type == image.image_type && m.data == image.data)
        {
            return (self.items[pos].file_name.clone(), pos + 1);
        }

        let file_name = (1..)
            .map(|n| format!("image{}.{}", n, image.image_type.extension()))
            .find(|name| !self.reserved.contains(name) && self.get(name).is_none())
            .unwrap_or_default();

        self.items.push(MediaItem {
            file_name: file_name.clone(),
            image_type: image.image_type,
            data: image.data.clone(),
        });
        (file_name, self.items.len())
    }

    /// Media item by file name
    pub fn get(&self, file_name: &str) -> Option<&MediaItem> {
        self.items.iter().find(|m| m.file_name == file_name)
    }

    /// All registered media, in registration order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
