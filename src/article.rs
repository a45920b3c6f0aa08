//! Finding the main content of a documentation page.

use crate::markup::{find_first, Handle, Node};

/// Identifies an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    /// An element with this tag name.
    Tag(String),
    /// An element with this `id`.
    Id(String),
    /// An element with this token in its `class`.
    Class(String),
}

impl Marker {
    /// Convenience constructor for `Marker::Tag`.
    pub fn tag(name: &str) -> Marker {
        Marker::Tag(name.to_string())
    }

    /// Returns true if `node` is the element this marker identifies.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Marker::Tag(tag) => node.is_element(tag),
            Marker::Id(id) => node.tag_name().is_some() && node.attr("id").as_deref() == Some(id.as_str()),
            Marker::Class(class) => node.classes().iter().any(|c| c == class),
        }
    }

    fn find(&self, document: &Handle) -> Option<Handle> {
        find_first(document, |node| self.matches(node))
    }
}

/// How the article is found within the whole page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// The children of the first element matching the marker.
    Single(Marker),
    /// A heading and a body found separately; the heading is rendered
    /// as a title before the body.
    Split {
        /// The title element.
        heading: Marker,
        /// The container whose children form the body.
        body: Marker,
    },
}

impl Default for Locator {
    fn default() -> Locator {
        Locator::Single(Marker::tag("article"))
    }
}

/// The located content.  Both parts are empty when nothing matched.
#[derive(Debug, Default)]
pub struct Article {
    /// Title element, for `Locator::Split`.
    pub heading: Option<Handle>,
    /// The nodes to render, in document order.
    pub body: Vec<Handle>,
}

impl Article {
    /// True if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.body.is_empty()
    }
}

impl Locator {
    /// Find the article in `document`.
    pub fn locate(&self, document: &Handle) -> Article {
        let children = |node: Handle| {
            let nodes = node.children().clone();
            nodes
        };
        match self {
            Locator::Single(marker) => Article {
                heading: None,
                body: marker.find(document).map(children).unwrap_or_default(),
            },
            Locator::Split { heading, body } => Article {
                heading: heading.find(document),
                body: body.find(document).map(children).unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_html;

    #[test]
    fn test_first_article_wins() {
        let dom = parse_html(
            &b"<nav>menu</nav><article><p>one</p></article><article><p>two</p></article>"[..],
        )
        .unwrap();
        let article = Locator::default().locate(&dom.document);
        assert_eq!(article.body.len(), 1);
        assert_eq!(article.body[0].text_content(), "one");
        assert!(article.heading.is_none());
    }

    #[test]
    fn test_missing_article_is_empty() {
        let dom = parse_html(&b"<p>no article here</p>"[..]).unwrap();
        assert!(Locator::default().locate(&dom.document).is_empty());
    }

    #[test]
    fn test_split_heading_and_body() {
        let dom = parse_html(
            &br#"<h1>Title</h1><div id="wikiArticle"><p>Body</p></div>"#[..],
        )
        .unwrap();
        let locator = Locator::Split {
            heading: Marker::tag("h1"),
            body: Marker::Id("wikiArticle".into()),
        };
        let article = locator.locate(&dom.document);
        assert_eq!(article.heading.unwrap().text_content(), "Title");
        assert_eq!(article.body.len(), 1);
        assert!(article.body[0].is_element("p"));
    }

    #[test]
    fn test_class_marker() {
        let dom = parse_html(&br#"<main class="main-page-content x">y</main>"#[..]).unwrap();
        let found = Marker::Class("main-page-content".into()).find(&dom.document);
        assert!(found.is_some_and(|n| n.is_element("main")));
    }
}
