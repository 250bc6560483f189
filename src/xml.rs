//! Owned, mutable XML element tree.
//!
//! Parts are parsed with `roxmltree` (read-only) and copied into this tree so
//! they can be edited in place, then written back out with `quick-xml`.
//! Element and attribute names are kept in their qualified form (`w:pPr`).

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    name: String,
    /// `xmlns` / `xmlns:p` declarations introduced at this element.
    namespaces: Vec<(String, String)>,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(k, _)| k != name);
    }

    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let key = match prefix {
            Some(p) => format!("xmlns:{p}"),
            None => "xmlns".to_string(),
        };
        self.namespaces.retain(|(k, _)| *k != key);
        self.namespaces.push((key, uri.to_string()));
    }

    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.name == name))
    }

    fn element_at_mut(&mut self, idx: usize) -> &mut XmlElement {
        match &mut self.children[idx] {
            XmlNode::Element(e) => e,
            XmlNode::Text(_) => unreachable!("index always comes from an element position"),
        }
    }

    pub fn append(&mut self, child: XmlElement) -> &mut XmlElement {
        self.children.push(XmlNode::Element(child));
        let idx = self.children.len() - 1;
        self.element_at_mut(idx)
    }

    pub fn insert(&mut self, idx: usize, child: XmlElement) -> &mut XmlElement {
        let idx = idx.min(self.children.len());
        self.children.insert(idx, XmlNode::Element(child));
        self.element_at_mut(idx)
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(XmlNode::Text(text.into()));
    }

    pub fn get_or_add(&mut self, name: &str) -> &mut XmlElement {
        match self.position(name) {
            Some(idx) => self.element_at_mut(idx),
            None => self.append(XmlElement::new(name)),
        }
    }

    /// Like [`XmlElement::get_or_add`], but a new child becomes the first child.
    pub fn get_or_insert_first(&mut self, name: &str) -> &mut XmlElement {
        match self.position(name) {
            Some(idx) => self.element_at_mut(idx),
            None => self.insert(0, XmlElement::new(name)),
        }
    }

    /// Returns the child named `name`, inserting a new one in schema position.
    ///
    /// `order` lists sibling names in the order the schema requires; the new
    /// child goes before the first existing sibling that sorts after it.
    /// Names missing from `order` are appended.
    pub fn get_or_add_ordered(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        if let Some(idx) = self.position(name) {
            return self.element_at_mut(idx);
        }
        let Some(rank) = order.iter().position(|n| *n == name) else {
            return self.append(XmlElement::new(name));
        };
        let later = &order[rank + 1..];
        let idx = self
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if later.contains(&e.name.as_str())))
            .unwrap_or(self.children.len());
        self.insert(idx, XmlElement::new(name))
    }

    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if e.name == name));
        before - self.children.len()
    }

    /// Removes every descendant element for which `keep` returns false,
    /// together with its subtree. Returns how many elements were removed.
    pub fn retain_descendants<F>(&mut self, keep: &mut F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let mut removed = 0;
        self.children.retain(|n| match n {
            XmlNode::Element(e) if !keep(e) => {
                removed += 1;
                false
            }
            _ => true,
        });
        for child in self.elements_mut() {
            removed += child.retain_descendants(keep);
        }
        removed
    }

    pub fn visit_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut XmlElement),
    {
        f(self);
        for child in self.elements_mut() {
            child.visit_mut(f);
        }
    }

    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        for child in self.elements() {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }

    pub fn descendant_text(&self, name: &str) -> String {
        let mut text = String::new();
        for el in self.descendants() {
            if el.name == name {
                for node in &el.children {
                    if let XmlNode::Text(t) = node {
                        text.push_str(t);
                    }
                }
            }
        }
        text
    }
}

fn qualified(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> String {
    let prefix = match namespace {
        Some(XML_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_string(),
    }
}

fn convert(node: roxmltree::Node, parent: Option<roxmltree::Node>) -> XmlElement {
    let tag = node.tag_name();
    let mut el = XmlElement::new(qualified(node, tag.namespace(), tag.name()));

    for ns in node.namespaces() {
        if ns.uri() == XML_NS {
            continue;
        }
        let inherited = parent.is_some_and(|p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if !inherited {
            el.declare_namespace(ns.name(), ns.uri());
        }
    }

    for attr in node.attributes() {
        let name = qualified(node, attr.namespace(), attr.name());
        el.attributes.push((name, attr.value().to_string()));
    }

    for child in node.children() {
        if child.is_element() {
            el.children.push(XmlNode::Element(convert(child, Some(node))));
        } else if child.is_text()
            && let Some(text) = child.text()
        {
            el.children.push(XmlNode::Text(text.to_string()));
        }
    }
    el
}

pub fn parse(text: &str) -> Result<XmlElement> {
    let doc = roxmltree::Document::parse(text)?;
    Ok(convert(doc.root_element(), None))
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, el: &XmlElement) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in el.namespaces.iter().chain(el.attributes.iter()) {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &el.children {
        match child {
            XmlNode::Element(e) => write_element(writer, e)?,
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

pub fn to_bytes(root: &XmlElement) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    write_element(&mut writer, root)?;
    Ok(writer.into_inner().into_inner())
}
