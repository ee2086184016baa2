// src/dom/mod.rs

//! Node query facade over a rendered page.
//!
//! Extraction code only ever sees [`Page`] and [`Node`]: a lookup returns
//! zero, one or many nodes, and "not found" is an ordinary outcome. Callers
//! map an absent node to a null field and carry on.
//!
//! `Page` owns a parsed `scraper::Html`, which is not `Send`. Build it after
//! the last `.await` of a page visit and drop it before the next one.

use scraper::{ElementRef, Html, Selector};

/// A parsed snapshot of a rendered page.
pub struct Page {
    document: Html,
    url: String,
}

impl Page {
    /// Parse rendered HTML fetched from `url`.
    pub fn parse(url: impl Into<String>, html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.into(),
        }
    }

    /// The URL the snapshot was rendered from.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            element: self.document.root_element(),
        }
    }

    /// First match under `scope`, or under the document root when `scope` is `None`.
    pub fn find_one<'a>(&'a self, scope: Option<Node<'a>>, selector: &Selector) -> Option<Node<'a>> {
        scope.unwrap_or_else(|| self.root()).find_one(selector)
    }

    /// All matches under `scope` in document order. Never fails; may be empty.
    pub fn find_many<'a>(&'a self, scope: Option<Node<'a>>, selector: &Selector) -> Vec<Node<'a>> {
        scope.unwrap_or_else(|| self.root()).find_many(selector)
    }
}

/// An element of a [`Page`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    /// First descendant matching `selector`.
    pub fn find_one(&self, selector: &Selector) -> Option<Node<'a>> {
        self.element.select(selector).next().map(|element| Node { element })
    }

    /// Every descendant matching `selector`, in document order.
    pub fn find_many(&self, selector: &Selector) -> Vec<Node<'a>> {
        self.element
            .select(selector)
            .map(|element| Node { element })
            .collect()
    }

    /// Rendered text: all descendant text with whitespace runs collapsed and trimmed.
    pub fn text(&self) -> String {
        collapse_whitespace(&self.element.text().collect::<String>())
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Whether the `class` attribute contains `marker` as a substring.
    pub fn has_class_marker(&self, marker: &str) -> bool {
        self.attr("class").is_some_and(|class| class.contains(marker))
    }

    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Direct element children, in document order.
    pub fn children(&self) -> Vec<Node<'a>> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| Node { element })
            .collect()
    }
}

/// Collapse every whitespace run into one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
