//! Integration test: patch in-memory templates end to end

mod common;

use common::{init_logger, paragraph, read_entry, read_part, Fixture, W_NS};
use linch_docx_patch::numbering::{NumberFormat, Numbering};
use linch_docx_patch::opc::{content_types, rel_types, ContentTypes, Relationships, TargetMode};
use linch_docx_patch::{
    detect_patches, patch_document, CompatibilityMapper, Error, ExternalHyperlink, Image,
    ImageType, OutputType, PartUri, Paragraph, Patch, PatchOptions, PatchOutput, Patches, Run,
    StyleRecord, StyleType, Table,
};
use pretty_assertions::assert_eq;

const UNTOUCHED: [&str; 4] = [
    "[Content_Types].xml",
    "_rels/.rels",
    "word/_rels/document.xml.rels",
    "word/styles.xml",
];

fn patches(entries: Vec<(&str, Patch)>) -> Patches {
    entries
        .into_iter()
        .map(|(name, patch)| (name.to_string(), patch))
        .collect()
}

fn run(template: &[u8], patches: &Patches, options: &PatchOptions) -> Vec<u8> {
    patch_document(template, patches, options)
        .expect("patch failed")
        .into_bytes()
        .unwrap()
}

fn document_rels(archive: &[u8]) -> Relationships {
    Relationships::from_xml(&read_part(archive, "word/_rels/document.xml.rels")).unwrap()
}

fn bullet_items() -> Patch {
    Patch::document(
        ["one", "two", "three"]
            .into_iter()
            .map(|text| Paragraph::new(text).with_numbering("bullet-list-ref", 0)),
    )
}

#[test]
fn test_greeting_replaced_and_other_parts_untouched() {
    init_logger();
    let template = Fixture::new(&format!(
        "{}{}",
        paragraph("Intro"),
        paragraph("{{greeting}}")
    ))
    .build();

    let output = run(
        &template,
        &patches(vec![("greeting", Patch::document([Paragraph::new("Hello")]))]),
        &PatchOptions::default(),
    );

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"));
    assert!(body.contains("Intro"));
    assert!(!body.contains("{{greeting}}"));

    for name in UNTOUCHED {
        assert_eq!(read_entry(&output, name), read_entry(&template, name), "{}", name);
    }
    assert!(read_entry(&output, "word/numbering.xml").is_none());
}

#[test]
fn test_body_part_gets_namespaces() {
    let template = Fixture::new(&paragraph("{{x}}")).build();
    let output = run(
        &template,
        &patches(vec![("x", Patch::paragraph([Run::new("y")]))]),
        &PatchOptions::default(),
    );

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(&format!(r#"xmlns:w="{}""#, W_NS)));
    assert!(body.contains("xmlns:w15="));
    assert!(body.contains("xmlns:wp="));
    assert!(body.contains(r#"mc:Ignorable="w15""#));
}

#[test]
fn test_placeholder_split_across_runs() {
    let template = Fixture::new(
        r#"<w:p><w:r><w:t>Dear {{na</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>me}}!</w:t></w:r></w:p>"#,
    )
    .build();

    let output = run(
        &template,
        &patches(vec![("name", Patch::paragraph([Run::new("Ada").bold()]))]),
        &PatchOptions::default(),
    );

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(
        r#"<w:r><w:t xml:space="preserve">Dear </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>Ada</w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>!</w:t></w:r>"#
    ));
}

#[test]
fn test_bullet_list_shares_one_numbering_instance() {
    init_logger();
    let template = Fixture::new(&paragraph("{{items}}")).build();

    let output = run(
        &template,
        &patches(vec![("items", bullet_items())]),
        &PatchOptions::default(),
    );

    let numbering = Numbering::from_xml(&read_part(&output, "word/numbering.xml")).unwrap();
    assert_eq!(numbering.abstract_nums.len(), 1);
    assert_eq!(numbering.nums.len(), 1);

    let levels = &numbering.abstract_nums[0].levels;
    let glyphs: Vec<_> = levels
        .iter()
        .map(|l| l.level_text.clone().unwrap_or_default())
        .collect();
    assert_eq!(glyphs, ["●", "○", "■"]);
    assert!(levels
        .iter()
        .all(|l| l.num_fmt == Some(NumberFormat::Bullet)));

    let num_id = numbering.nums[0].num_id;
    let body = read_part(&output, "word/document.xml");
    assert_eq!(
        body.matches(&format!(r#"<w:numId w:val="{}"/>"#, num_id)).count(),
        3
    );
    assert!(!body.contains("{bullet-list-ref-0}"));

    let rels = document_rels(&output);
    assert_eq!(
        rels.iter()
            .filter(|r| r.rel_type == rel_types::NUMBERING)
            .count(),
        1
    );
    assert_eq!(rels.by_type(rel_types::NUMBERING).unwrap().target, "numbering.xml");

    let types = ContentTypes::from_xml(&read_part(&output, "[Content_Types].xml")).unwrap();
    let uri = PartUri::new("/word/numbering.xml").unwrap();
    assert_eq!(types.override_for(&uri), Some(content_types::NUMBERING));
}

#[test]
fn test_instances_restart_numbering() {
    let template = Fixture::new(&format!("{}{}", paragraph("{{a}}"), paragraph("{{b}}"))).build();
    let output = run(
        &template,
        &patches(vec![
            ("a", Patch::document([Paragraph::new("x").with_numbering("steps", 0)])),
            (
                "b",
                Patch::document([Paragraph::new("y").with_numbering_instance("steps", 0, 1)]),
            ),
        ]),
        &PatchOptions::default(),
    );

    let numbering = Numbering::from_xml(&read_part(&output, "word/numbering.xml")).unwrap();
    assert_eq!(numbering.abstract_nums.len(), 1);
    assert_eq!(numbering.nums.len(), 2);

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(r#"<w:numId w:val="1"/>"#));
    assert!(body.contains(r#"<w:numId w:val="2"/>"#));
}

#[test]
fn test_hyperlink_adds_one_external_relationship() {
    let template = Fixture::new(&paragraph("See {{link}}")).build();

    let output = run(
        &template,
        &patches(vec![(
            "link",
            Patch::paragraph([ExternalHyperlink::new(
                "https://example.com/docs",
                vec![Run::new("the docs")],
            )]),
        )]),
        &PatchOptions::default(),
    );

    let rels = document_rels(&output);
    let links: Vec<_> = rels
        .iter()
        .filter(|r| r.rel_type == rel_types::HYPERLINK)
        .collect();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].target, "https://example.com/docs");
    assert!(matches!(links[0].target_mode, TargetMode::External));
    assert!(rels.get("rId1").is_some());

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(&format!(r#"<w:hyperlink r:id="{}""#, links[0].id)));
}

#[test]
fn test_header_relationships_created() {
    let header = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:hdr xmlns:w="{}">{}</w:hdr>"#,
        W_NS,
        paragraph("{{link}}")
    );
    let template = Fixture::new(&paragraph("body"))
        .with_part("word/header1.xml", header)
        .build();

    let output = run(
        &template,
        &patches(vec![(
            "link",
            Patch::paragraph([ExternalHyperlink::new("https://example.com", vec![Run::new("x")])]),
        )]),
        &PatchOptions::default(),
    );

    let rels =
        Relationships::from_xml(&read_part(&output, "word/_rels/header1.xml.rels")).unwrap();
    assert_eq!(rels.len(), 1);
    assert!(rels.has_type(rel_types::HYPERLINK));
    assert_eq!(
        read_entry(&output, "word/document.xml"),
        read_entry(&template, "word/document.xml")
    );
}

#[test]
fn test_image_embedded() {
    let png = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let template = Fixture::new(&paragraph("{{logo}}")).build();

    let output = run(
        &template,
        &patches(vec![(
            "logo",
            Patch::paragraph([Image::new(png.clone(), ImageType::Png, 32, 16)]),
        )]),
        &PatchOptions::default(),
    );

    assert_eq!(read_entry(&output, "word/media/image1.png"), Some(png));

    let rels = document_rels(&output);
    let image = rels.by_type(rel_types::IMAGE).unwrap();
    assert_eq!(image.id, "rId2");
    assert_eq!(image.target, "media/image1.png");

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(r#"r:embed="rId2""#));
    assert!(!body.contains("{image1.png}"));

    let types = ContentTypes::from_xml(&read_part(&output, "[Content_Types].xml")).unwrap();
    assert_eq!(types.default_for("png"), Some("image/png"));
    assert_eq!(types.default_for("jpeg"), Some("image/jpeg"));
}

#[test]
fn test_keep_original_styles() {
    let template =
        Fixture::new(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{{name}}</w:t></w:r></w:p>"#).build();
    let patch = patches(vec![("name", Patch::paragraph([Run::new("Ada")]))]);

    let kept = run(
        &template,
        &patch,
        &PatchOptions::new().with_keep_original_styles(true),
    );
    assert!(read_part(&kept, "word/document.xml")
        .contains("<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Ada</w:t></w:r></w:p>"));

    let plain = run(&template, &patch, &PatchOptions::default());
    assert!(read_part(&plain, "word/document.xml").contains("<w:p><w:r><w:t>Ada</w:t></w:r></w:p>"));
}

#[test]
fn test_recursive_flag() {
    let template = Fixture::new(&format!("{}{}", paragraph("{{x}}"), paragraph("{{x}}"))).build();
    let patch = patches(vec![("x", Patch::paragraph([Run::new("done")]))]);

    let all = run(&template, &patch, &PatchOptions::default());
    assert_eq!(read_part(&all, "word/document.xml").matches("done").count(), 2);

    let once = run(&template, &patch, &PatchOptions::new().with_recursive(false));
    let body = read_part(&once, "word/document.xml");
    assert_eq!(body.matches("done").count(), 1);
    assert_eq!(body.matches("{{x}}").count(), 1);
}

#[test]
fn test_custom_delimiters() {
    let template = Fixture::new(&paragraph("&lt;&lt;who&gt;&gt; and {{who}}")).build();
    let output = run(
        &template,
        &patches(vec![("who", Patch::paragraph([Run::new("me")]))]),
        &PatchOptions::new().with_delimiters("<<", ">>"),
    );
    let body = read_part(&output, "word/document.xml");
    assert!(body.contains("<w:r><w:t>me</w:t></w:r>"));
    assert!(body.contains(r#"<w:t xml:space="preserve"> and {{who}}</w:t>"#));
}

#[test]
fn test_table_patch_in_body() {
    let template = Fixture::new(&paragraph("{{grid}}")).build();
    let output = run(
        &template,
        &patches(vec![(
            "grid",
            Patch::document([Table::from_data(&[&["a", "b"], &["c", "d"]])]),
        )]),
        &PatchOptions::default(),
    );

    let body = read_part(&output, "word/document.xml");
    assert_eq!(body.matches("<w:tc>").count(), 4);
    assert!(body.contains("</w:tbl><w:sectPr/>"));
}

#[test]
fn test_style_definitions_written() {
    let template = Fixture::new(&format!("{}{}", paragraph("{{fancy}}"), paragraph("{{title}}"))).build();

    let output = run(
        &template,
        &patches(vec![
            (
                "fancy",
                Patch::document([Paragraph::new("x").with_style("Fancy")]).with_styles(vec![
                    StyleRecord::new("Fancy", StyleType::Paragraph)
                        .with_name("Fancy")
                        .with_based_on("Normal"),
                ]),
            ),
            (
                "title",
                Patch::document([Paragraph::new("y").with_style("Heading1")])
                    .with_styles(vec![StyleRecord::new("Heading1", StyleType::Paragraph)]),
            ),
        ]),
        &PatchOptions::default(),
    );

    let styles = read_part(&output, "word/styles.xml");
    assert!(styles.contains(r#"w:styleId="Fancy""#));
    assert!(styles.contains(r#"w:styleId="Heading1_1""#));
    assert_eq!(styles.matches(r#"w:styleId="Heading1""#).count(), 1);

    let body = read_part(&output, "word/document.xml");
    assert!(body.contains(r#"<w:pStyle w:val="Fancy"/>"#));
    assert!(body.contains(r#"<w:pStyle w:val="Heading1_1"/>"#));
}

#[test]
fn test_style_parent_definitions_written() {
    let template = Fixture::new(&paragraph("{{note}}")).build();
    let output = run(
        &template,
        &patches(vec![(
            "note",
            Patch::document([Paragraph::new("x").with_style("Callout")]).with_styles(vec![
                StyleRecord::new("Callout", StyleType::Paragraph).with_based_on("Base"),
                StyleRecord::new("Base", StyleType::Paragraph).with_based_on("Normal"),
            ]),
        )]),
        &PatchOptions::default(),
    );

    let styles = read_part(&output, "word/styles.xml");
    assert!(styles.contains(r#"<w:basedOn w:val="Base"/>"#));
    assert_eq!(styles.matches(r#"w:styleId="Base""#).count(), 1);
    assert_eq!(styles.matches(r#"w:styleId="Callout""#).count(), 1);
}

#[test]
fn test_unused_style_definitions_not_written() {
    let template = Fixture::new(&paragraph("nothing here")).build();
    let output = run(
        &template,
        &patches(vec![(
            "fancy",
            Patch::document([Paragraph::new("x").with_style("Fancy")])
                .with_styles(vec![StyleRecord::new("Fancy", StyleType::Paragraph)]),
        )]),
        &PatchOptions::default(),
    );
    assert_eq!(
        read_entry(&output, "word/styles.xml"),
        read_entry(&template, "word/styles.xml")
    );
}

const TEMPLATE_NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="-"/></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

const RELS_WITH_NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

fn template_with_numbering() -> Vec<u8> {
    Fixture::new(&paragraph("{{items}}"))
        .with_part("word/numbering.xml", TEMPLATE_NUMBERING)
        .with_part("word/_rels/document.xml.rels", RELS_WITH_NUMBERING)
        .build()
}

#[test]
fn test_template_numbering_extended() {
    let template = template_with_numbering();
    let output = run(
        &template,
        &patches(vec![("items", bullet_items())]),
        &PatchOptions::default(),
    );

    let numbering = Numbering::from_xml(&read_part(&output, "word/numbering.xml")).unwrap();
    assert_eq!(numbering.abstract_nums.len(), 2);
    assert_eq!(numbering.abstract_nums[0].levels[0].level_text.as_deref(), Some("-"));
    assert_eq!(numbering.nums.len(), 2);
    assert_eq!(numbering.nums[1].num_id, 2);
    assert_eq!(numbering.nums[1].abstract_num_id, 1);

    let body = read_part(&output, "word/document.xml");
    assert_eq!(body.matches(r#"<w:numId w:val="2"/>"#).count(), 3);

    let rels = document_rels(&output);
    assert_eq!(rels.len(), 2);
    assert_eq!(
        read_entry(&output, "word/_rels/document.xml.rels"),
        read_entry(&template, "word/_rels/document.xml.rels")
    );
}

#[test]
fn test_fresh_numbering_ids_come_from_template_maximum() {
    let template = template_with_numbering();
    let output = run(
        &template,
        &patches(vec![(
            "items",
            Patch::document([
                Paragraph::new("a").with_numbering_instance("steps", 0, 0),
                Paragraph::new("b").with_numbering_instance("steps", 0, 1),
            ]),
        )]),
        &PatchOptions::default(),
    );

    let numbering = Numbering::from_xml(&read_part(&output, "word/numbering.xml")).unwrap();
    let num_ids: Vec<_> = numbering.nums.iter().map(|n| n.num_id).collect();
    assert_eq!(num_ids, [1, 2, 3]);

    let body = read_part(&output, "word/document.xml");
    assert_eq!(body.matches(r#"<w:numId w:val="2"/>"#).count(), 1);
    assert_eq!(body.matches(r#"<w:numId w:val="3"/>"#).count(), 1);
}

#[test]
fn test_compatibility_mapper_reuses_template_numbering() {
    let template = template_with_numbering();
    let output = run(
        &template,
        &patches(vec![("items", bullet_items())]),
        &PatchOptions::new().with_numbering_strategy(CompatibilityMapper),
    );

    let body = read_part(&output, "word/document.xml");
    assert_eq!(body.matches(r#"<w:numId w:val="1"/>"#).count(), 3);
    assert_eq!(
        read_entry(&output, "word/numbering.xml"),
        read_entry(&template, "word/numbering.xml")
    );
}

#[test]
fn test_empty_patch_map_returns_template() {
    let template = Fixture::new(&paragraph("{{unused}}")).build();
    let output = run(&template, &Patches::new(), &PatchOptions::default());
    assert_eq!(output, template);
}

#[test]
fn test_rerun_on_output_changes_nothing() {
    let template = Fixture::new(&paragraph("{{items}}")).build();
    let first = run(
        &template,
        &patches(vec![("items", bullet_items())]),
        &PatchOptions::default(),
    );
    let second = run(
        &first,
        &patches(vec![("items", Patch::paragraph([Run::new("again")]))]),
        &PatchOptions::default(),
    );

    for name in common::entry_names(&first) {
        assert_eq!(read_entry(&second, &name), read_entry(&first, &name), "{}", name);
    }
    assert_eq!(
        document_rels(&second)
            .iter()
            .filter(|r| r.rel_type == rel_types::NUMBERING)
            .count(),
        1
    );
}

#[test]
fn test_base64_output() {
    let template = Fixture::new(&paragraph("{{x}}")).build();
    let output = patch_document(
        &template,
        &patches(vec![("x", Patch::paragraph([Run::new("encoded")]))]),
        &PatchOptions::new().with_output_type("base64".parse().unwrap()),
    )
    .unwrap();

    assert!(matches!(output, PatchOutput::Base64(_)));
    let bytes = output.into_bytes().unwrap();
    assert!(read_part(&bytes, "word/document.xml").contains("encoded"));
}

#[test]
fn test_configuration_errors() {
    let template = Fixture::new(&paragraph("{{x}}")).build();
    let patch = patches(vec![("x", Patch::paragraph([Run::new("y")]))]);

    let err = patch_document(&template, &patch, &PatchOptions::new().with_delimiters("", "}}"))
        .unwrap_err();
    assert!(matches!(err, Error::EmptyDelimiter));

    let err = "stream".parse::<OutputType>().unwrap_err();
    assert_eq!(err.to_string(), "Invalid output type: stream");
}

#[test]
fn test_missing_content_types_is_fatal() {
    let template = Fixture::new(&paragraph("{{x}}"))
        .without_part("[Content_Types].xml")
        .build();

    for map in [Patches::new(), patches(vec![("x", Patch::paragraph([Run::new("y")]))])] {
        let err = patch_document(&template, &map, &PatchOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingPart(_)), "{}", err);
    }
}

#[test]
fn test_untouched_binary_and_unknown_parts() {
    let utf16 = vec![0xFF, 0xFE, b'<', 0, b'a', 0];
    let template = Fixture::new(&paragraph("{{x}}"))
        .with_part("customXml/item1.xml", utf16.clone())
        .with_part("docProps/thumbnail.jpeg", vec![0xFF, 0xD8, 0xFF])
        .build();

    let output = run(
        &template,
        &patches(vec![("x", Patch::paragraph([Run::new("y")]))]),
        &PatchOptions::default(),
    );

    assert_eq!(read_entry(&output, "customXml/item1.xml"), Some(utf16));
    assert_eq!(
        read_entry(&output, "docProps/thumbnail.jpeg"),
        Some(vec![0xFF, 0xD8, 0xFF])
    );
}

#[test]
fn test_detect_patches() {
    let header = format!(
        r#"<w:hdr xmlns:w="{}"><w:p><w:r><w:t>{{{{todo_list}}}}</w:t></w:r></w:p></w:hdr>"#,
        W_NS
    );
    let template = Fixture::new(&format!(
        "{}{}",
        paragraph("{{title}} by {{author}}"),
        r#"<w:p><w:r><w:t>{{items_</w:t></w:r><w:r><w:t>bullet}}</w:t></w:r></w:p>"#
    ))
    .with_part("word/header1.xml", header)
    .build();

    let mut detected = detect_patches(&template).unwrap();
    detected.placeholders.sort();
    detected.list_patches.sort();

    assert_eq!(
        detected.placeholders,
        ["author", "items_bullet", "title", "todo_list"]
    );
    assert_eq!(detected.list_patches, ["items_bullet", "todo_list"]);
}
