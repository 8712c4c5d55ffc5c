//! Hyperlinks (w:hyperlink)

use std::collections::BTreeSet;

use crate::xml::RawXmlElement;

use super::{RenderContext, Run};

/// Link to an external URL. Rendering allocates a relationship id and emits
/// a [`ConcreteHyperlink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalHyperlink {
    pub link: String,
    pub children: Vec<Run>,
}

/// Link to a bookmark in the same document
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InternalHyperlink {
    pub anchor: String,
    pub children: Vec<Run>,
}

/// Link already bound to a relationship id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConcreteHyperlink {
    pub link_id: String,
    pub children: Vec<Run>,
}

impl ExternalHyperlink {
    /// Link showing `children`
    pub fn new(link: impl Into<String>, children: Vec<Run>) -> Self {
        Self {
            link: link.into(),
            children,
        }
    }

    /// Bind to a relationship id
    pub fn concretize(&self, link_id: impl Into<String>) -> ConcreteHyperlink {
        ConcreteHyperlink {
            link_id: link_id.into(),
            children: self.children.clone(),
        }
    }

    pub(crate) fn render(&self, ctx: &mut RenderContext<'_>) -> RawXmlElement {
        let link_id = ctx.hyperlinks.allocate(&self.link);
        self.concretize(link_id).render(ctx)
    }
}

impl InternalHyperlink {
    /// Link to the bookmark `anchor`
    pub fn new(anchor: impl Into<String>, children: Vec<Run>) -> Self {
        Self {
            anchor: anchor.into(),
            children,
        }
    }

    pub(crate) fn render(&self, ctx: &RenderContext<'_>) -> RawXmlElement {
        RawXmlElement::new("w:hyperlink")
            .with_attr("w:anchor", self.anchor.as_str())
            .with_attr("w:history", "1")
            .with_children(self.children.iter().map(|r| r.render(ctx)))
    }
}

impl ConcreteHyperlink {
    /// Link bound to `link_id`
    pub fn new(link_id: impl Into<String>, children: Vec<Run>) -> Self {
        Self {
            link_id: link_id.into(),
            children,
        }
    }

    pub(crate) fn render(&self, ctx: &RenderContext<'_>) -> RawXmlElement {
        RawXmlElement::new("w:hyperlink")
            .with_attr("r:id", self.link_id.as_str())
            .with_attr("w:history", "1")
            .with_children(self.children.iter().map(|r| r.render(ctx)))
    }
}

pub(crate) fn collect_run_styles(runs: &[Run], ids: &mut BTreeSet<String>) {
    for run in runs {
        run.collect_style_ids(ids);
    }
}

/// Hands out hyperlink relationship ids for one part and remembers which
/// targets they point at
#[derive(Clone, Debug)]
pub struct HyperlinkAllocator {
    taken: BTreeSet<String>,
    next: u32,
    allocated: Vec<(String, String)>,
}

impl Default for HyperlinkAllocator {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl HyperlinkAllocator {
    /// Allocator that avoids every id in `existing`
    pub fn new<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            taken: existing.into_iter().map(str::to_string).collect(),
            next: 1,
            allocated: Vec::new(),
        }
    }

    /// Fresh `rIdLink{n}` id for `link`
    pub fn allocate(&mut self, link: &str) -> String {
        loop {
            let id = format!("rIdLink{}", self.next);
            self.next += 1;
            if self.taken.insert(id.clone()) {
                self.allocated.push((id.clone(), link.to_string()));
                return id;
            }
        }
    }

    /// `(id, target)` pairs allocated so far
    pub fn allocated(&self) -> &[(String, String)] {
        &self.allocated
    }

    /// Drain the allocated pairs
    pub fn take(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.allocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RenderScope;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_allocator_skips_existing_ids() {
        let mut links = HyperlinkAllocator::new(["rId1", "rIdLink1"]);
        assert_eq!(links.allocate("https://a.example"), "rIdLink2");
        assert_eq!(links.allocate("https://b.example"), "rIdLink3");
        assert_eq!(
            links.take(),
            vec![
                ("rIdLink2".to_string(), "https://a.example".to_string()),
                ("rIdLink3".to_string(), "https://b.example".to_string()),
            ]
        );
        assert!(links.allocated().is_empty());
    }

    #[test]
    fn test_external_link_becomes_concrete() {
        let mut scope = RenderScope::default();
        let link = ExternalHyperlink::new("https://example.com", vec![Run::new("site")]);
        let xml = link.render(&mut scope.context()).to_xml_string().unwrap();

        assert_eq!(
            xml,
            r#"<w:hyperlink r:id="rIdLink1" w:history="1"><w:r><w:t>site</w:t></w:r></w:hyperlink>"#
        );
        assert_eq!(scope.hyperlinks.allocated().len(), 1);
    }

    #[test]
    fn test_internal_link() {
        let mut scope = RenderScope::default();
        let link = InternalHyperlink::new("_Toc1", vec![Run::new("see")]);
        let xml = link.render(&scope.context()).to_xml_string().unwrap();
        assert!(xml.starts_with(r#"<w:hyperlink w:anchor="_Toc1""#));
    }
}
