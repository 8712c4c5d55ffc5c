//! Placeholder scanning and splicing
//!
//! Paragraph text is the concatenated `w:t` text of the paragraph's direct
//! `w:r` children, so a token split over several runs is still found.
//! Offsets are byte offsets into that text.

use crate::xml::{document_namespaces, RawXmlElement, RawXmlNode, IGNORABLE_PREFIX};

/// Location of one placeholder token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occurrence {
    /// Child-node indices from the part root down to the `w:p`
    pub path: Vec<usize>,
    /// Token start in the paragraph text
    pub start: usize,
    /// Token end (exclusive) in the paragraph text
    pub end: usize,
}

/// Text of a paragraph as placeholders see it
pub fn paragraph_text(paragraph: &RawXmlElement) -> String {
    paragraph
        .elements()
        .filter(|e| e.name == "w:r")
        .map(run_text)
        .collect()
}

fn run_text(run: &RawXmlElement) -> String {
    run.elements()
        .filter(|e| e.name == "w:t")
        .map(RawXmlElement::text)
        .collect()
}

/// Number of token occurrences in every paragraph below `root`
pub fn count_occurrences(root: &RawXmlElement, token: &str) -> usize {
    if token.is_empty() {
        return 0;
    }
    let own = if root.name == "w:p" {
        paragraph_text(root).matches(token).count()
    } else {
        0
    };
    own + root
        .elements()
        .map(|child| count_occurrences(child, token))
        .sum::<usize>()
}

/// First occurrence of `token` in document order
pub fn find_first(root: &RawXmlElement, token: &str) -> Option<Occurrence> {
    if token.is_empty() {
        return None;
    }
    let mut path = Vec::new();
    find_in(root, token, &mut path)
}

fn find_in(elem: &RawXmlElement, token: &str, path: &mut Vec<usize>) -> Option<Occurrence> {
    if elem.name == "w:p" {
        if let Some(start) = paragraph_text(elem).find(token) {
            return Some(Occurrence {
                path: path.clone(),
                start,
                end: start + token.len(),
            });
        }
    }

    for (i, child) in elem.children.iter().enumerate() {
        if let RawXmlNode::Element(child) = child {
            path.push(i);
            let found = find_in(child, token, path);
            path.pop();
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

/// Element at `path` below `root`
pub fn element_at_mut<'a>(
    root: &'a mut RawXmlElement,
    path: &[usize],
) -> Option<&'a mut RawXmlElement> {
    let mut current = root;
    for &i in path {
        current = match current.children.get_mut(i) {
            Some(RawXmlNode::Element(e)) => e,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace the paragraph holding `occurrence` with `blocks`. A table cell
/// left without a paragraph gets an empty one. Returns `false` when the path
/// no longer points at a paragraph.
pub fn replace_paragraph(
    root: &mut RawXmlElement,
    occurrence: &Occurrence,
    blocks: Vec<RawXmlElement>,
) -> bool {
    let Some((&index, parent_path)) = occurrence.path.split_last() else {
        return false;
    };
    let Some(parent) = element_at_mut(root, parent_path) else {
        return false;
    };
    if !matches!(parent.children.get(index), Some(RawXmlNode::Element(p)) if p.name == "w:p") {
        return false;
    }

    parent.children.splice(
        index..=index,
        blocks.into_iter().map(RawXmlNode::Element),
    );

    if parent.name == "w:tc" && !parent.elements().any(|e| e.name == "w:p") {
        parent
            .children
            .push(RawXmlNode::Element(RawXmlElement::new("w:p").empty()));
    }
    parent.self_closing = parent.children.is_empty();
    true
}

/// Replace the text range `start..end` of `paragraph` with `inserted`.
///
/// The run holding the range start keeps its text before the range and the
/// run holding the range end keeps its text after it, both with their own
/// formatting; every run in between is removed. With `keep_styles`, each
/// inserted run receives the properties of the run holding the range start.
pub fn replace_in_paragraph(
    paragraph: &mut RawXmlElement,
    start: usize,
    end: usize,
    inserted: Vec<RawXmlElement>,
    keep_styles: bool,
) -> bool {
    let spans = run_spans(paragraph);
    let Some(first) = spans.iter().position(|s| s.end > start) else {
        return false;
    };
    let last = spans
        .iter()
        .rposition(|s| s.start < end)
        .unwrap_or(first)
        .max(first);

    let first_span = &spans[first];
    let last_span = &spans[last];
    let (Some(first_run), Some(last_run)) = (
        paragraph.children[first_span.index].as_element(),
        paragraph.children[last_span.index].as_element(),
    ) else {
        return false;
    };

    let prefix = clip_run(first_run, 0, start - first_span.start);
    let suffix = clip_run(last_run, end - last_span.start, usize::MAX);

    let mut inserted = inserted;
    if keep_styles {
        let carried: Vec<RawXmlElement> = first_run
            .elements()
            .filter(|e| !matches!(e.name.as_str(), "w:t" | "w:br" | "w:tab"))
            .cloned()
            .collect();
        for elem in &mut inserted {
            carry_properties(elem, &carried);
        }
    }

    let mut replacement: Vec<RawXmlNode> = Vec::with_capacity(inserted.len() + 2);
    replacement.extend(prefix.map(RawXmlNode::Element));
    replacement.extend(inserted.into_iter().map(RawXmlNode::Element));
    replacement.extend(suffix.map(RawXmlNode::Element));

    let removed: Vec<usize> = spans[first..=last].iter().map(|s| s.index).collect();
    let insert_at = first_span.index;

    let mut children = Vec::with_capacity(paragraph.children.len() + replacement.len());
    for (i, child) in std::mem::take(&mut paragraph.children).into_iter().enumerate() {
        if i == insert_at {
            children.append(&mut replacement);
        }
        if !removed.contains(&i) {
            children.push(child);
        }
    }
    paragraph.children = children;
    paragraph.self_closing = paragraph.children.is_empty();
    true
}

struct RunSpan {
    index: usize,
    start: usize,
    end: usize,
}

fn run_spans(paragraph: &RawXmlElement) -> Vec<RunSpan> {
    let mut offset = 0;
    paragraph
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, child)| match child {
            RawXmlNode::Element(run) if run.name == "w:r" => {
                let start = offset;
                offset += run_text(run).len();
                Some(RunSpan {
                    index,
                    start,
                    end: offset,
                })
            }
            _ => None,
        })
        .collect()
}

/// Copy of `run` keeping the content between `from` and `to` (run-local
/// text offsets). Properties are always kept; `None` when nothing else is.
fn clip_run(run: &RawXmlElement, from: usize, to: usize) -> Option<RawXmlElement> {
    let mut clipped = RawXmlElement {
        children: Vec::new(),
        self_closing: false,
        ..run.clone()
    };
    let mut has_content = false;
    let mut pos = 0;

    for child in run.elements() {
        match child.name.as_str() {
            "w:rPr" => clipped.children.push(RawXmlNode::Element(child.clone())),
            "w:t" => {
                let text = child.text();
                let len = text.len();
                let lo = from.saturating_sub(pos).min(len);
                let hi = to.saturating_sub(pos).min(len);
                pos += len;
                if lo >= hi {
                    continue;
                }
                let Some(kept) = text.get(lo..hi) else {
                    continue;
                };
                clipped
                    .children
                    .push(RawXmlNode::Element(clip_text(child, kept)));
                has_content = true;
            }
            _ => {
                if pos >= from && pos <= to {
                    clipped.children.push(RawXmlNode::Element(child.clone()));
                    has_content = true;
                }
            }
        }
    }

    has_content.then_some(clipped)
}

fn clip_text(original: &RawXmlElement, text: &str) -> RawXmlElement {
    let mut t = RawXmlElement {
        name: original.name.clone(),
        attributes: original.attributes.clone(),
        children: Vec::new(),
        self_closing: false,
    };
    if needs_preserve(text) {
        t.set_attr("xml:space", "preserve");
    }
    t.with_text(text)
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) || text.contains("  ")
}

fn carry_properties(elem: &mut RawXmlElement, carried: &[RawXmlElement]) {
    match elem.name.as_str() {
        "w:r" => {
            let missing: Vec<RawXmlNode> = carried
                .iter()
                .filter(|c| elem.child(&c.name).is_none())
                .cloned()
                .map(RawXmlNode::Element)
                .collect();
            if !missing.is_empty() {
                elem.children.splice(0..0, missing);
                elem.self_closing = false;
            }
        }
        "w:hyperlink" => {
            for run in elem.elements_mut() {
                carry_properties(run, carried);
            }
        }
        _ => {}
    }
}

/// Declare the namespaces patched content relies on and list `w15` in
/// `mc:Ignorable`. Returns whether the root changed.
pub fn inject_namespaces(root: &mut RawXmlElement) -> bool {
    let mut changed = false;
    for (attr, uri) in document_namespaces() {
        if root.attr(attr).is_none() {
            changed |= root.set_attr(attr, uri);
        }
    }

    let ignorable = root.attr("mc:Ignorable").unwrap_or_default();
    if !ignorable.split_whitespace().any(|p| p == IGNORABLE_PREFIX) {
        let value = format!("{} {}", ignorable, IGNORABLE_PREFIX);
        changed |= root.set_attr("mc:Ignorable", value.trim());
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn parse(xml: &str) -> RawXmlElement {
        XmlDocument::parse(xml.as_bytes()).unwrap().root
    }

    fn xml(elem: &RawXmlElement) -> String {
        elem.to_xml_string().unwrap()
    }

    fn run(text: &str) -> RawXmlElement {
        RawXmlElement::new("w:r").with_child(RawXmlElement::new("w:t").with_text(text))
    }

    const SPLIT: &str = r#"<w:body><w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Dear {{na</w:t></w:r><w:proofErr w:type="spellStart"/><w:r><w:t>me}}, hi</w:t></w:r></w:p></w:body>"#;

    #[test]
    fn test_find_token_split_across_runs() {
        let root = parse(SPLIT);
        let occurrence = find_first(&root, "{{name}}").unwrap();

        assert_eq!(occurrence.path, vec![0]);
        assert_eq!((occurrence.start, occurrence.end), (5, 13));
        assert_eq!(count_occurrences(&root, "{{name}}"), 1);
        assert!(find_first(&root, "{{other}}").is_none());
    }

    #[test]
    fn test_count_nested_paragraphs() {
        let root = parse(
            "<w:body><w:p><w:r><w:t>{{x}} and {{x}}</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>{{x}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body>",
        );
        assert_eq!(count_occurrences(&root, "{{x}}"), 3);

        let mut root = root;
        root.children.remove(0);
        assert_eq!(find_first(&root, "{{x}}").unwrap().path, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_replace_in_paragraph_splits_runs() {
        let mut root = parse(SPLIT);
        let occurrence = find_first(&root, "{{name}}").unwrap();
        let p = element_at_mut(&mut root, &occurrence.path).unwrap();

        assert!(replace_in_paragraph(
            p,
            occurrence.start,
            occurrence.end,
            vec![run("Ada")],
            false
        ));

        assert_eq!(
            xml(p),
            r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Dear </w:t></w:r><w:r><w:t>Ada</w:t></w:r><w:r><w:t>, hi</w:t></w:r><w:proofErr w:type="spellStart"/></w:p>"#
        );
        assert_eq!(paragraph_text(p), "Dear Ada, hi");
    }

    #[test]
    fn test_replace_whole_run_drops_empty_runs() {
        let mut p = parse(r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{{x}}</w:t></w:r></w:p>"#);
        assert!(replace_in_paragraph(&mut p, 0, 5, vec![run("y")], false));
        assert_eq!(xml(&p), "<w:p><w:r><w:t>y</w:t></w:r></w:p>");
    }

    #[test]
    fn test_keep_original_styles() {
        let mut p = parse(r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>a {{x}}</w:t></w:r></w:p>"#);
        let inserted = vec![
            run("y"),
            RawXmlElement::new("w:hyperlink").with_child(run("z")),
        ];
        assert!(replace_in_paragraph(&mut p, 2, 7, inserted, true));

        assert_eq!(
            xml(&p),
            r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">a </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>y</w:t></w:r><w:hyperlink><w:r><w:rPr><w:i/></w:rPr><w:t>z</w:t></w:r></w:hyperlink></w:p>"#
        );
    }

    #[test]
    fn test_keep_styles_does_not_duplicate_properties() {
        let mut p = parse(r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{{x}}</w:t></w:r></w:p>"#);
        let own = RawXmlElement::new("w:r")
            .with_child(RawXmlElement::new("w:rPr").with_child(RawXmlElement::new("w:b").empty()))
            .with_child(RawXmlElement::new("w:t").with_text("y"));
        assert!(replace_in_paragraph(&mut p, 0, 5, vec![own], true));
        assert_eq!(p.find_all("w:rPr").len(), 1);
        assert_eq!(p.find_all("w:b").len(), 1);
    }

    #[test]
    fn test_replace_paragraph_in_cell_keeps_a_paragraph() {
        let mut root = parse("<w:tc><w:p><w:r><w:t>{{t}}</w:t></w:r></w:p></w:tc>");
        let occurrence = find_first(&root, "{{t}}").unwrap();
        let table = RawXmlElement::new("w:tbl");

        assert!(replace_paragraph(&mut root, &occurrence, vec![table]));
        assert_eq!(xml(&root), "<w:tc><w:tbl></w:tbl><w:p/></w:tc>");
    }

    #[test]
    fn test_replace_paragraph_with_blocks() {
        let mut root = parse(
            "<w:body><w:p><w:r><w:t>before</w:t></w:r></w:p><w:p><w:r><w:t>{{b}}</w:t></w:r></w:p><w:sectPr/></w:body>",
        );
        let occurrence = find_first(&root, "{{b}}").unwrap();
        let blocks = vec![
            RawXmlElement::new("w:p").with_child(run("one")),
            RawXmlElement::new("w:p").with_child(run("two")),
        ];

        assert!(replace_paragraph(&mut root, &occurrence, blocks));
        let texts: Vec<String> = root
            .elements()
            .filter(|e| e.name == "w:p")
            .map(paragraph_text)
            .collect();
        assert_eq!(texts, ["before", "one", "two"]);
        assert_eq!(root.elements().last().unwrap().name, "w:sectPr");
    }

    #[test]
    fn test_inject_namespaces_is_idempotent() {
        let mut root = parse(
            r#"<w:document xmlns:w="w" xmlns:r="custom-r" mc:Ignorable="w14"><w:body/></w:document>"#,
        );

        assert!(inject_namespaces(&mut root));
        assert_eq!(root.attr("xmlns:r"), Some("custom-r"));
        assert!(root.attr("xmlns:w15").is_some());
        assert_eq!(root.attr("mc:Ignorable"), Some("w14 w15"));

        assert!(!inject_namespaces(&mut root));
    }

    #[test]
    fn test_inject_namespaces_without_ignorable() {
        let mut root = parse(r#"<w:document><w:body/></w:document>"#);
        inject_namespaces(&mut root);
        assert_eq!(root.attr("mc:Ignorable"), Some("w15"));
    }
}
