//! Binding embedded media to image relationships

use crate::content::{media_token, MediaCollection};
use crate::xml::RawXmlElement;

/// File names of registered media whose token appears in an `r:embed`
/// below `root`, in registration order
pub fn find_media_tokens(root: &RawXmlElement, media: &MediaCollection) -> Vec<String> {
    let mut embeds = Vec::new();
    collect_embeds(root, &mut embeds);

    media
        .items()
        .iter()
        .map(|item| &item.file_name)
        .filter(|name| {
            let token = media_token(name);
            embeds.iter().any(|e| *e == token)
        })
        .cloned()
        .collect()
}

fn collect_embeds<'a>(elem: &'a RawXmlElement, out: &mut Vec<&'a str>) {
    if let Some(embed) = elem.attr("r:embed") {
        out.push(embed);
    }
    for child in elem.elements() {
        collect_embeds(child, out);
    }
}

/// Rewrite media tokens to relationship ids. `bindings` pairs a file name
/// with its id. Returns whether anything changed.
pub fn bind_media_tokens(root: &mut RawXmlElement, bindings: &[(String, String)]) -> bool {
    let tokens: Vec<(String, &str)> = bindings
        .iter()
        .map(|(file_name, id)| (media_token(file_name), id.as_str()))
        .collect();

    let mut changed = false;
    root.visit_mut(&mut |elem| {
        let Some(embed) = elem.attr("r:embed") else {
            return;
        };
        if let Some((_, id)) = tokens.iter().find(|(token, _)| token == embed) {
            let id = id.to_string();
            changed |= elem.set_attr("r:embed", &id);
        }
    });
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Image, ImageType, Inline, RenderScope};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_and_bind_media() {
        let mut scope = RenderScope::default();
        let png: Inline = Image::new(vec![1, 2], ImageType::Png, 4, 4).into();
        let gif: Inline = Image::new(vec![3], ImageType::Gif, 4, 4).into();

        let mut ctx = scope.context();
        let unused = gif.render(&mut ctx);
        let used = png.render(&mut ctx);
        drop(unused);

        let mut root = RawXmlElement::new("w:p").with_child(used);
        let found = find_media_tokens(&root, &scope.media);
        assert_eq!(found, ["image1.png"]);

        let bindings = vec![("image1.png".to_string(), "rId7".to_string())];
        assert!(bind_media_tokens(&mut root, &bindings));
        assert_eq!(root.find_all("a:blip")[0].attr("r:embed"), Some("rId7"));
        assert!(find_media_tokens(&root, &scope.media).is_empty());
        assert!(!bind_media_tokens(&mut root, &bindings));
    }
}
