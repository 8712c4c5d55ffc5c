//! Placeholder patching
//!
//! [`patch_document`] opens a template, replaces every placeholder that has a
//! patch and reconciles what the new content needs: numbering definitions,
//! image and hyperlink relationships, style definitions and content types.
//! Parts nothing touched are written back byte for byte.

pub mod detector;
pub mod media;
mod options;
mod patch;
pub mod replacer;

pub use detector::{detect_in_package, detect_patches, detect_patches_with, DetectedPatches};
pub use options::{OutputType, PatchOptions, PlaceholderDelimiters};
pub use patch::{NumberingIntents, Patch, PatchContent, Patches};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::content::{HyperlinkAllocator, MediaCollection, RenderContext};
use crate::error::{Error, Result};
use crate::numbering::{
    extract_existing_numbering, Numbering, NumberingManager, NumberingReferenceMap,
    NumberingStrategy,
};
use crate::opc::{content_types, rel_types, well_known, ContentTypes, Package, Part, PartUri, TargetMode};
use crate::styles::{
    append_styles, empty_styles_root, extract_master_styles, extract_patch_style_ids,
    patch_style_records, StyleMapper, StyleRecord,
};
use crate::xml::{RawXmlElement, XmlDocument};

/// A patched package in the requested representation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutput {
    Bytes(Vec<u8>),
    Base64(String),
}

impl PatchOutput {
    /// Archive bytes, decoding base64 output
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            PatchOutput::Bytes(bytes) => Ok(bytes),
            PatchOutput::Base64(text) => STANDARD
                .decode(text)
                .map_err(|e| Error::InvalidDocument(e.to_string())),
        }
    }
}

/// Patch a DOCX held in memory
pub fn patch_document(data: &[u8], patches: &Patches, options: &PatchOptions) -> Result<PatchOutput> {
    options.delimiters.validate()?;
    let package = Package::from_bytes(data)?;

    let bytes = if patches.is_empty() {
        package.content_types()?;
        log::debug!("No patches given, returning the template unchanged");
        data.to_vec()
    } else {
        patch_package(package, patches, options)?.to_bytes()?
    };

    Ok(match options.output_type {
        OutputType::Bytes => PatchOutput::Bytes(bytes),
        OutputType::Base64 => PatchOutput::Base64(STANDARD.encode(bytes)),
    })
}

/// Patch an opened package
pub fn patch_package(mut package: Package, patches: &Patches, options: &PatchOptions) -> Result<Package> {
    options.delimiters.validate()?;
    let mut types = package.content_types()?;
    if patches.is_empty() {
        return Ok(package);
    }

    let intents = NumberingIntents::collect(patches);
    log::debug!("Found {} numbering configurations", intents.configs.len());
    let manager = build_numbering(&package, &intents, options.numbering_strategy.as_ref())?;
    let numbering = manager
        .as_ref()
        .map(NumberingManager::reference_map)
        .unwrap_or_default();

    let mut run = PatchRun::new(&package, patches, options, numbering)?;

    let content_parts: Vec<PartUri> = package
        .part_uris()
        .filter(|uri| uri.is_content_part())
        .cloned()
        .collect();
    for uri in &content_parts {
        run.patch_part(&mut package, uri)?;
    }

    if let Some(manager) = &manager {
        write_numbering(&mut package, &mut types, manager, &run.numbering, &content_parts)?;
    }
    run.write_styles(&mut package, &mut types)?;
    run.write_media(&mut package, &mut types)?;

    package.set_content_types(&types)?;
    Ok(package)
}

/// Build numbering for every list the patches use. Template numbering is
/// kept and extended; references the strategy maps onto template numbering
/// are not regenerated.
///
/// Only the strategy's reuse decision is applied. New references get their
/// ids from the manager, one per `(reference, instance)` pair, so the
/// strategy's `target_num_id` for them is not used.
fn build_numbering(
    package: &Package,
    intents: &NumberingIntents,
    strategy: &dyn NumberingStrategy,
) -> Result<Option<NumberingManager>> {
    if intents.is_empty() {
        return Ok(None);
    }

    let template = package
        .part(&well_known::numbering())
        .and_then(Part::xml)
        .map(|doc| &doc.root);
    let existing = extract_existing_numbering(template);
    log::debug!("Found {} existing numbering definitions", existing.len());

    let references: Vec<String> = intents.configs.keys().cloned().collect();
    let mappings = strategy.resolve(&references, &existing);

    let mut manager = match template {
        Some(root) => NumberingManager::with_existing(Numbering::from_element(root)),
        None => NumberingManager::new(),
    };

    let mut configs = intents.configs.clone();
    for mapping in mappings.iter().filter(|m| m.is_existing) {
        if let Ok(num_id) = mapping.target_num_id.parse::<u32>() {
            log::debug!(
                "Reusing numbering {} for '{}'",
                num_id,
                mapping.original_reference
            );
            manager.bind_existing(&mapping.original_reference, num_id);
            configs.remove(&mapping.original_reference);
        }
    }

    manager.generate_from_configs(&configs);
    manager.create_concrete_instances(&configs)?;
    for (reference, instance) in &intents.instances {
        if configs.contains_key(reference) {
            manager.create_concrete_instance(reference, *instance)?;
        }
    }

    Ok(Some(manager))
}

fn write_numbering(
    package: &mut Package,
    types: &mut ContentTypes,
    manager: &NumberingManager,
    references: &NumberingReferenceMap,
    content_parts: &[PartUri],
) -> Result<()> {
    let uri = well_known::numbering();
    types.add_override_if_absent(&uri, content_types::NUMBERING);

    let numbering = manager.get_numbering()?;
    let unchanged = package
        .part(&uri)
        .and_then(Part::xml)
        .is_some_and(|doc| Numbering::from_element(&doc.root) == *numbering);
    if !unchanged {
        package.store_xml(uri, numbering.to_document());
    }

    for part_uri in content_parts {
        if let Some(part) = package.part_mut(part_uri) {
            part.update_xml(|doc| Ok(references.replace_tokens(&mut doc.root)))?;
        }
    }

    let document = well_known::document();
    let mut rels = package.relationships(&document)?;
    if !rels.has_type(rel_types::NUMBERING) {
        rels.add(rel_types::NUMBERING, "numbering.xml");
        package.set_relationships(&document, &rels)?;
    }

    log::info!(
        "Wrote {} numbering definitions",
        manager.get_numbering_config().len()
    );
    Ok(())
}

/// State shared by every part of one patch run
struct PatchRun<'a> {
    patches: &'a Patches,
    options: &'a PatchOptions,
    master_styles: Vec<StyleRecord>,
    style_mapper: StyleMapper,
    numbering: NumberingReferenceMap,
    media: MediaCollection,
    pending_styles: Vec<StyleRecord>,
}

impl<'a> PatchRun<'a> {
    fn new(
        package: &Package,
        patches: &'a Patches,
        options: &'a PatchOptions,
        numbering: NumberingReferenceMap,
    ) -> Result<Self> {
        let reserved = package
            .part_uris()
            .filter(|uri| uri.as_str().starts_with("/word/media/"))
            .filter_map(|uri| uri.file_name().map(str::to_string));

        Ok(Self {
            patches,
            options,
            master_styles: extract_master_styles(package)?,
            style_mapper: StyleMapper::new(),
            numbering,
            media: MediaCollection::with_reserved(reserved),
            pending_styles: Vec::new(),
        })
    }

    /// Substitute every patch in one part, then register the relationships
    /// the new content needs
    fn patch_part(&mut self, package: &mut Package, uri: &PartUri) -> Result<()> {
        let mut rels = package.relationships(uri)?;
        let mut hyperlinks = HyperlinkAllocator::new(rels.iter().map(|r| r.id.as_str()));

        let Some(part) = package.part_mut(uri) else {
            return Ok(());
        };
        let mut media_files = Vec::new();
        let is_document = *uri == well_known::document();

        part.update_xml(|doc| {
            let replaced = self.substitute(&mut doc.root, uri, &mut hyperlinks)?;
            if replaced == 0 {
                return Ok(false);
            }
            if is_document {
                replacer::inject_namespaces(&mut doc.root);
            }
            media_files = media::find_media_tokens(&doc.root, &self.media);
            Ok(true)
        })?;

        if media_files.is_empty() && hyperlinks.allocated().is_empty() {
            return Ok(());
        }

        let links = hyperlinks.take();
        let next = rels.next_index();
        let bindings: Vec<(String, String)> = media_files
            .into_iter()
            .zip(next..)
            .map(|(file, index)| (file, format!("rId{}", index)))
            .collect();
        for (file, id) in &bindings {
            rels.add_with_id(id, rel_types::IMAGE, &format!("media/{}", file), TargetMode::Internal);
        }
        for (id, link) in &links {
            rels.add_with_id(id, rel_types::HYPERLINK, link, TargetMode::External);
        }
        log::debug!(
            "{}: adding {} image and {} hyperlink relationships",
            uri,
            bindings.len(),
            links.len()
        );

        if !bindings.is_empty() {
            if let Some(part) = package.part_mut(uri) {
                part.update_xml(|doc| Ok(media::bind_media_tokens(&mut doc.root, &bindings)))?;
            }
        }
        package.set_relationships(uri, &rels)
    }

    /// Apply each patch to `root`; returns the number of replacements
    fn substitute(
        &mut self,
        root: &mut RawXmlElement,
        uri: &PartUri,
        hyperlinks: &mut HyperlinkAllocator,
    ) -> Result<usize> {
        let mut total = 0;

        for (name, patch) in self.patches {
            let token = self.options.delimiters.token(name);
            let occurrences = replacer::count_occurrences(root, &token);
            if occurrences == 0 {
                continue;
            }

            let style_ids = extract_patch_style_ids(&patch.content);
            let records = patch_style_records(&style_ids, &patch.styles);
            self.style_mapper.build_mapping(&records, &self.master_styles);

            let passes = if self.options.recursive { occurrences } else { 1 };
            let mut ctx = RenderContext {
                patch: name.as_str(),
                styles: &self.style_mapper,
                numbering: &self.numbering,
                media: &mut self.media,
                hyperlinks: &mut *hyperlinks,
            };
            let keep_styles = self.options.keep_original_styles;
            let applied = apply_patch(root, &token, patch, passes, keep_styles, &mut ctx)
                .map_err(|e| e.in_patch(uri.as_str(), name))?;

            log::debug!("{}: replaced {} occurrence(s) of '{}'", uri, applied, name);
            if applied > 0 {
                let definitions = self
                    .style_mapper
                    .take_definitions(records.iter().map(|r| &r.id));
                self.pending_styles.extend(definitions);
            }
            total += applied;
        }

        Ok(total)
    }

    /// Append style definitions brought in by applied patches
    fn write_styles(&mut self, package: &mut Package, types: &mut ContentTypes) -> Result<()> {
        if self.pending_styles.is_empty() {
            return Ok(());
        }
        let styles = std::mem::take(&mut self.pending_styles);
        let uri = well_known::styles();

        if package.part(&uri).is_some_and(Part::is_xml) {
            if let Some(part) = package.part_mut(&uri) {
                part.update_xml(|doc| Ok(append_styles(&mut doc.root, &styles)))?;
            }
        } else {
            let mut root = empty_styles_root();
            append_styles(&mut root, &styles);
            package.store_xml(uri.clone(), XmlDocument::new(root));

            let document = well_known::document();
            let mut rels = package.relationships(&document)?;
            if !rels.has_type(rel_types::STYLES) {
                rels.add(rel_types::STYLES, "styles.xml");
                package.set_relationships(&document, &rels)?;
            }
            types.add_override_if_absent(&uri, content_types::STYLES);
        }

        log::debug!("Added {} style definitions", styles.len());
        Ok(())
    }

    /// Add media parts and the image content types
    fn write_media(&self, package: &mut Package, types: &mut ContentTypes) -> Result<()> {
        if self.media.is_empty() {
            return Ok(());
        }
        for (extension, media_type) in content_types::IMAGE_DEFAULTS {
            types.add_default_if_absent(extension, media_type);
        }
        for item in self.media.items() {
            let uri = PartUri::new(&format!("/word/media/{}", item.file_name))?;
            package.insert(Part::new_binary(uri, item.data.clone()));
        }
        log::debug!("Embedded {} media files", self.media.items().len());
        Ok(())
    }
}

/// Replace up to `passes` occurrences of `token`, rescanning after each one
fn apply_patch(
    root: &mut RawXmlElement,
    token: &str,
    patch: &Patch,
    passes: usize,
    keep_original_styles: bool,
    ctx: &mut RenderContext<'_>,
) -> Result<usize> {
    let mut applied = 0;

    while applied < passes {
        let Some(occurrence) = replacer::find_first(root, token) else {
            break;
        };

        let replaced = match &patch.content {
            PatchContent::Document(blocks) => {
                let rendered = blocks
                    .iter()
                    .map(|block| block.render(ctx))
                    .collect::<Result<Vec<_>>>()?;
                replacer::replace_paragraph(root, &occurrence, rendered)
            }
            PatchContent::Paragraph(inlines) => {
                let rendered = inlines.iter().map(|inline| inline.render(ctx)).collect();
                match replacer::element_at_mut(root, &occurrence.path) {
                    Some(paragraph) => replacer::replace_in_paragraph(
                        paragraph,
                        occurrence.start,
                        occurrence.end,
                        rendered,
                        keep_original_styles,
                    ),
                    None => false,
                }
            }
        };
        if !replaced {
            break;
        }
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ExternalHyperlink, Paragraph, RenderScope, Run};
    use pretty_assertions::assert_eq;

    fn root(xml: &str) -> RawXmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    fn apply(scope: &mut RenderScope, root: &mut RawXmlElement, patch: &Patch, passes: usize) -> usize {
        apply_patch(root, "{{p}}", patch, passes, false, &mut scope.context()).unwrap()
    }

    #[test]
    fn test_apply_bounded_by_passes() {
        let mut body = root("<w:body><w:p><w:r><w:t>{{p}} {{p}}</w:t></w:r></w:p></w:body>");
        // Replacement reintroduces the token
        let patch = Patch::paragraph([Run::new("{{p}}!")]);

        let applied = apply(&mut RenderScope::default(), &mut body, &patch, 2);

        assert_eq!(applied, 2);
        assert_eq!(replacer::paragraph_text(&body.find_all("w:p")[0]), "{{p}}!! {{p}}");
    }

    #[test]
    fn test_apply_single_pass() {
        let mut body = root("<w:body><w:p><w:r><w:t>{{p}}</w:t></w:r></w:p><w:p><w:r><w:t>{{p}}</w:t></w:r></w:p></w:body>");
        let patch = Patch::document([Paragraph::new("x")]);

        assert_eq!(apply(&mut RenderScope::default(), &mut body, &patch, 1), 1);
        assert_eq!(replacer::count_occurrences(&body, "{{p}}"), 1);
    }

    #[test]
    fn test_apply_allocates_hyperlinks() {
        let mut body = root("<w:body><w:p><w:r><w:t>See {{p}}</w:t></w:r></w:p></w:body>");
        let patch = Patch::paragraph([ExternalHyperlink::new(
            "https://example.com",
            vec![Run::new("here")],
        )]);
        let mut scope = RenderScope {
            hyperlinks: HyperlinkAllocator::new(["rId1"]),
            ..Default::default()
        };

        assert_eq!(apply(&mut scope, &mut body, &patch, 1), 1);
        assert_eq!(
            scope.hyperlinks.allocated(),
            [("rIdLink1".to_string(), "https://example.com".to_string())]
        );
        assert_eq!(body.find_all("w:hyperlink")[0].attr("r:id"), Some("rIdLink1"));
    }

    #[test]
    fn test_output_into_bytes() {
        let encoded = PatchOutput::Base64(STANDARD.encode([1u8, 2, 3]));
        assert_eq!(encoded.into_bytes().unwrap(), vec![1, 2, 3]);
        assert!(PatchOutput::Base64("***".into()).into_bytes().is_err());
    }
}
