//! The parsed document tree.
//!
//! A small reference-counted DOM built by html5ever.  Children are owned by
//! their parent through `Rc`; the parent link is a `Weak` back-reference and
//! is only ever used to answer questions about the surrounding markup.  Once
//! parsing has finished the tree is never modified.

use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::mem;
use std::rc::{Rc, Weak};

use html5ever::driver::ParseOpts;
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeBuilderOpts, TreeSink};
use html5ever::{parse_document, Attribute, ExpandedName, QualName};
use tendril::{StrTendril, TendrilSink};

/// Reference to a node in the tree.
pub type Handle = Rc<Node>;

/// Non-owning reference to a node, used for parent links.
pub type WeakHandle = Weak<Node>;

/// The different kinds of node in the tree.
pub enum NodeData {
    /// The root of the tree.
    Document,
    /// A `<!DOCTYPE>`.
    Doctype,
    /// A run of text.
    Text {
        /// The text itself, with character references already resolved.
        contents: RefCell<StrTendril>,
    },
    /// A comment; its text is not kept.
    Comment,
    /// An element with its attributes.
    Element {
        /// Qualified tag name.
        name: QualName,
        /// Attributes, in source order.
        attrs: RefCell<Vec<Attribute>>,
        /// Content of a `<template>`, kept out of the main tree.
        template_contents: RefCell<Option<Handle>>,
    },
    /// A processing instruction; never produced for HTML input.
    ProcessingInstruction,
}

/// A node in the tree.
pub struct Node {
    parent: Cell<Option<WeakHandle>>,
    children: RefCell<Vec<Handle>>,
    /// What sort of node this is.
    pub data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Handle {
        Rc::new(Node {
            parent: Cell::new(None),
            children: RefCell::new(Vec::new()),
            data,
        })
    }

    /// The child nodes, in document order.
    pub fn children(&self) -> Ref<'_, Vec<Handle>> {
        self.children.borrow()
    }

    /// The parent node, if this node is attached to one.
    pub fn parent(&self) -> Option<Handle> {
        let weak = self.parent.take();
        let parent = weak.as_ref().and_then(Weak::upgrade);
        self.parent.set(weak);
        parent
    }

    /// The local tag name, for elements.
    pub fn tag_name(&self) -> Option<&str> {
        match self.data {
            NodeData::Element { ref name, .. } => Some(&*name.local),
            _ => None,
        }
    }

    /// Returns true if this is an element with the given tag name.
    pub fn is_element(&self, tag: &str) -> bool {
        self.tag_name() == Some(tag)
    }

    /// The tag name of the parent element, if any.
    pub fn parent_tag(&self) -> Option<String> {
        self.parent()
            .and_then(|parent| parent.tag_name().map(str::to_string))
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<String> {
        match self.data {
            NodeData::Element { ref attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| &*attr.name.local == name)
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    /// The whitespace separated tokens of the `class` attribute.
    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// The contents of a text node.
    pub fn text(&self) -> Option<String> {
        match self.data {
            NodeData::Text { ref contents } => Some(contents.borrow().to_string()),
            _ => None,
        }
    }

    /// All descendant text concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        let mut stack: Vec<Handle> = self.children().iter().rev().cloned().collect();
        while let Some(node) = stack.pop() {
            if let NodeData::Text { ref contents } = node.data {
                result.push_str(&contents.borrow());
            }
            stack.extend(node.children().iter().rev().cloned());
        }
        result
    }

    /// The sibling immediately before this node, of any kind.
    pub fn previous_sibling(self: &Rc<Self>) -> Option<Handle> {
        let (parent, index) = get_parent_and_index(self)?;
        let siblings = parent.children();
        let prev = index.checked_sub(1).map(|i| siblings[i].clone());
        prev
    }

    /// Returns true if any direct child is an element with one of `tags`.
    pub fn has_child_element(&self, tags: &[&str]) -> bool {
        self.children()
            .iter()
            .any(|child| child.tag_name().is_some_and(|t| tags.contains(&t)))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data {
            NodeData::Document => write!(f, "#document"),
            NodeData::Doctype => write!(f, "<!DOCTYPE>"),
            NodeData::Text { ref contents } => write!(f, "{:?}", &**contents.borrow()),
            NodeData::Comment => write!(f, "<!-- -->"),
            NodeData::Element { ref name, .. } => write!(f, "<{}>", &*name.local),
            NodeData::ProcessingInstruction => write!(f, "<?pi?>"),
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        // Tear down iteratively; deeply nested pages would otherwise
        // overflow the stack.
        let mut nodes = mem::take(&mut *self.children.borrow_mut());
        while let Some(node) = nodes.pop() {
            let children = mem::take(&mut *node.children.borrow_mut());
            nodes.extend(children);
            if let NodeData::Element {
                ref template_contents,
                ..
            } = node.data
            {
                if let Some(contents) = template_contents.borrow_mut().take() {
                    nodes.push(contents);
                }
            }
        }
    }
}

fn append(new_parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(new_parent)));
    new_parent.children.borrow_mut().push(child);
}

fn get_parent_and_index(target: &Handle) -> Option<(Handle, usize)> {
    let parent = target.parent()?;
    let index = parent
        .children()
        .iter()
        .position(|child| Rc::ptr_eq(child, target))?;
    Some((parent, index))
}

fn append_to_existing_text(prev: &Handle, text: &str) -> bool {
    match prev.data {
        NodeData::Text { ref contents } => {
            contents.borrow_mut().push_slice(text);
            true
        }
        _ => false,
    }
}

fn remove_from_parent(target: &Handle) {
    if let Some((parent, i)) = get_parent_and_index(target) {
        parent.children.borrow_mut().remove(i);
        target.parent.set(None);
    }
}

fn text_node(text: StrTendril) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(text),
    })
}

/// A parsed HTML document.
pub struct Markup {
    /// The document root.
    pub document: Handle,
    /// Parse errors reported by html5ever; these never stop parsing.
    pub errors: RefCell<Vec<Cow<'static, str>>>,
}

impl Default for Markup {
    fn default() -> Markup {
        Markup {
            document: Node::new(NodeData::Document),
            errors: RefCell::new(Vec::new()),
        }
    }
}

impl fmt::Debug for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Markup")
            .field("document", &self.document)
            .field("errors", &self.errors.borrow().len())
            .finish()
    }
}

impl TreeSink for Markup {
    type Handle = Handle;
    type Output = Self;
    type ElemName<'a>
        = ExpandedName<'a>
    where
        Self: 'a;

    fn finish(self) -> Self {
        self
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Handle {
        self.document.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Handle) -> ExpandedName<'a> {
        match target.data {
            NodeData::Element { ref name, .. } => name.expanded(),
            // The tree builder only asks for names of elements it created.
            _ => unreachable!("elem_name called on a non-element"),
        }
    }

    fn create_element(&self, name: QualName, attrs: Vec<Attribute>, flags: ElementFlags) -> Handle {
        Node::new(NodeData::Element {
            name,
            attrs: RefCell::new(attrs),
            template_contents: RefCell::new(if flags.template {
                Some(Node::new(NodeData::Document))
            } else {
                None
            }),
        })
    }

    fn create_comment(&self, _text: StrTendril) -> Handle {
        Node::new(NodeData::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Handle {
        Node::new(NodeData::ProcessingInstruction)
    }

    fn append(&self, parent: &Handle, child: NodeOrText<Handle>) {
        // Merge adjacent text so each run is a single node.
        if let NodeOrText::AppendText(ref text) = child {
            if let Some(last) = parent.children().last() {
                if append_to_existing_text(last, text) {
                    return;
                }
            }
        }

        append(
            parent,
            match child {
                NodeOrText::AppendText(text) => text_node(text),
                NodeOrText::AppendNode(node) => node,
            },
        );
    }

    fn append_before_sibling(&self, sibling: &Handle, child: NodeOrText<Handle>) {
        let Some((parent, i)) = get_parent_and_index(sibling) else {
            return;
        };

        let child = match (child, i) {
            (NodeOrText::AppendText(text), 0) => text_node(text),
            (NodeOrText::AppendText(text), i) => {
                let children = parent.children();
                if append_to_existing_text(&children[i - 1], &text) {
                    return;
                }
                text_node(text)
            }
            (NodeOrText::AppendNode(node), _) => node,
        };

        remove_from_parent(&child);

        child.parent.set(Some(Rc::downgrade(&parent)));
        parent.children.borrow_mut().insert(i, child);
    }

    fn append_based_on_parent_node(
        &self,
        element: &Handle,
        prev_element: &Handle,
        child: NodeOrText<Handle>,
    ) {
        if element.parent().is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        append(&self.document, Node::new(NodeData::Doctype));
    }

    fn get_template_contents(&self, target: &Handle) -> Handle {
        if let NodeData::Element {
            ref template_contents,
            ..
        } = target.data
        {
            if let Some(contents) = template_contents.borrow().as_ref() {
                return contents.clone();
            }
        }
        target.clone()
    }

    fn same_node(&self, x: &Handle, y: &Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &Handle, attrs: Vec<Attribute>) {
        let NodeData::Element {
            attrs: ref existing,
            ..
        } = target.data
        else {
            return;
        };

        let mut existing = existing.borrow_mut();
        let present: HashSet<QualName> = existing.iter().map(|attr| attr.name.clone()).collect();
        existing.extend(attrs.into_iter().filter(|attr| !present.contains(&attr.name)));
    }

    fn remove_from_parent(&self, target: &Handle) {
        remove_from_parent(target);
    }

    fn reparent_children(&self, node: &Handle, new_parent: &Handle) {
        let children = mem::take(&mut *node.children.borrow_mut());
        for child in &children {
            child.parent.set(Some(Rc::downgrade(new_parent)));
        }
        new_parent.children.borrow_mut().extend(children);
    }

    fn is_mathml_annotation_xml_integration_point(&self, _handle: &Handle) -> bool {
        false
    }
}

/// Parse an HTML document.
///
/// Scripting is treated as disabled so that the contents of `<noscript>`
/// are parsed as markup rather than raw text.
pub fn parse_html(mut input: impl io::Read) -> io::Result<Markup> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };
    parse_document(Markup::default(), opts)
        .from_utf8()
        .read_from(&mut input)
}

/// Find the first node, depth-first in document order, for which `pred`
/// holds.  `root` itself is considered first.
pub fn find_first<P>(root: &Handle, pred: P) -> Option<Handle>
where
    P: Fn(&Node) -> bool,
{
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if pred(&node) {
            return Some(node);
        }
        stack.extend(node.children().iter().rev().cloned());
    }
    None
}

/// Select the elements reached from `root` by following a chain of child
/// tag names, like the CSS selector `html > head > meta`.
pub fn select_path(root: &Handle, path: &[&str]) -> Vec<Handle> {
    let mut current = vec![root.clone()];
    for tag in path {
        current = current
            .iter()
            .flat_map(|node| {
                node.children()
                    .iter()
                    .filter(|child| child.is_element(tag))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Markup {
        parse_html(html.as_bytes()).unwrap()
    }

    #[test]
    fn test_parent_and_siblings() {
        let dom = parse("<ul><li><strong>a</strong> b</li></ul>");
        let li = find_first(&dom.document, |n| n.is_element("li")).unwrap();
        assert_eq!(li.parent_tag().as_deref(), Some("ul"));

        let text = li.children()[1].clone();
        assert_eq!(text.text().as_deref(), Some(" b"));
        assert!(text.previous_sibling().unwrap().is_element("strong"));
        assert!(li.children()[0].previous_sibling().is_none());
    }

    #[test]
    fn test_attrs_and_classes() {
        let dom = parse(r#"<div class=" notecard   warning " id="x">hi</div>"#);
        let div = find_first(&dom.document, |n| n.is_element("div")).unwrap();
        assert_eq!(div.classes(), vec!["notecard", "warning"]);
        assert_eq!(div.attr("id").as_deref(), Some("x"));
        assert_eq!(div.attr("title"), None);
    }

    #[test]
    fn test_select_noscript_meta() {
        let dom = parse(
            r#"<html><head></head><body><noscript><META http-equiv="refresh" content="0;URL=x"></noscript></body></html>"#,
        );
        let metas = select_path(&dom.document, &["html", "body", "noscript", "meta"]);
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].attr("content").as_deref(), Some("0;URL=x"));
    }

    #[test]
    fn test_text_content() {
        let dom = parse("<pre>a<span>b</span>\nc</pre>");
        let pre = find_first(&dom.document, |n| n.is_element("pre")).unwrap();
        assert_eq!(pre.text_content(), "ab\nc");
    }

    #[test]
    fn test_parse_errors_recorded() {
        let dom = parse("<!DOCTYPE html><p>a</div>");
        assert!(!dom.errors.borrow().is_empty());
        let clean = parse("<!DOCTYPE html><html><head></head><body><p>a</p></body></html>");
        assert!(clean.errors.borrow().is_empty());
    }
}
