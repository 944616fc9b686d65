use std::io;

use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// A parsed, mutable HTML document.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parses raw page bytes. Invalid UTF-8 is replaced, malformed markup is
    /// repaired the way browsers do; only a failing reader is an error.
    pub fn parse(mut html: &[u8]) -> io::Result<Self> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html)?;

        Ok(Self { dom })
    }

    /// All elements with the given tag name, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<Element> {
        self.select(|element| element.is(tag))
    }

    /// All elements matching `predicate`, in document order.
    pub fn select<P>(&self, predicate: P) -> Vec<Element>
    where
        P: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        let mut stack = vec![self.dom.document.clone()];

        while let Some(node) = stack.pop() {
            if let NodeData::Element { .. } = node.data {
                let element = Element { handle: node.clone() };
                if predicate(&element) {
                    found.push(element);
                }
            }
            // Reverse so the first child is popped first.
            stack.extend(node.children.borrow().iter().rev().cloned());
        }

        found
    }

    pub fn to_html(&self) -> io::Result<Vec<u8>> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut html = Vec::new();
        serialize(&mut html, &document, SerializeOpts::default())?;
        Ok(html)
    }
}

/// Handle to one element of an [`HtmlDocument`]. Cloning shares the node.
#[derive(Clone)]
pub struct Element {
    handle: Handle,
}

impl Element {
    pub fn is(&self, tag: &str) -> bool {
        match &self.handle.data {
            NodeData::Element { name, .. } => str::eq_ignore_ascii_case(&name.local, tag),
            _ => false,
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| str::eq_ignore_ascii_case(&attr.name.local, name))
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Overwrites an existing attribute. Returns `false` when the element has
    /// no such attribute.
    pub fn set_attr(&self, name: &str, value: &str) -> bool {
        let NodeData::Element { attrs, .. } = &self.handle.data else {
            return false;
        };

        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|attr| str::eq_ignore_ascii_case(&attr.name.local, name)) {
            Some(attr) => {
                attr.value = StrTendril::from_slice(value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
    <head>
        <link rel="stylesheet" href="/style.css">
        <script src="/script.js"></script>
    </head>
    <body>
        <img src="/one.png">
        <div><img src="/two.png"><a href="/page">Link</a></div>
        <img src="/three.png">
    </body>
</html>"#;

    #[test]
    fn test_find_by_tag_is_in_document_order() {
        let doc = HtmlDocument::parse(PAGE.as_bytes()).unwrap();
        let sources: Vec<_> = doc
            .find_by_tag("img")
            .iter()
            .filter_map(|img| img.attr("src"))
            .collect();

        assert_eq!(sources, vec!["/one.png", "/two.png", "/three.png"]);
    }

    #[test]
    fn test_select_with_attribute_predicate() {
        let doc = HtmlDocument::parse(PAGE.as_bytes()).unwrap();
        let scripts = doc.select(|el| el.is("script") && el.has_attr("src"));

        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].attr("src").as_deref(), Some("/script.js"));
    }

    #[test]
    fn test_set_attr_is_visible_in_serialized_html() {
        let doc = HtmlDocument::parse(PAGE.as_bytes()).unwrap();
        let images = doc.find_by_tag("img");

        assert!(images[1].set_attr("src", "assets/two.png"));
        assert!(!images[1].set_attr("data-missing", "x"));

        let html = String::from_utf8(doc.to_html().unwrap()).unwrap();
        assert!(html.contains(r#"<img src="assets/two.png">"#));
        assert!(html.contains(r#"<img src="/one.png">"#));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_malformed_markup_still_parses() {
        let doc = HtmlDocument::parse(b"<p><img src=a.png><b>unclosed").unwrap();
        assert_eq!(doc.find_by_tag("img").len(), 1);
    }

    #[test]
    fn test_serialization_is_stable() {
        let first = HtmlDocument::parse(PAGE.as_bytes()).unwrap().to_html().unwrap();
        let second = HtmlDocument::parse(&first).unwrap().to_html().unwrap();
        assert_eq!(first, second);
    }
}
