use crate::docx::{W_PPR, W_RPR, W_VAL};
use crate::error::{Error, Result};
use crate::model::{BorderEdge, Font, ParagraphFormat, edge_borders};
use crate::xml::XmlElement;

pub(crate) const W_STYLE: &str = "w:style";
const W_PBDR: &str = "w:pBdr";

/// Base style every other paragraph style inherits from.
pub const DEFAULT_STYLE_NAME: &str = "Normal";

/// Schema order of `w:style` children.
pub(crate) const STYLE_ORDER: &[&str] = &[
    "w:name", "w:aliases", "w:basedOn", "w:next", "w:link", "w:autoRedefine",
    "w:hidden", "w:uiPriority", "w:semiHidden", "w:unhideWhenUsed", "w:qFormat",
    "w:locked", "w:personal", "w:personalCompose", "w:personalReply", "w:rsid",
    "w:pPr", "w:rPr", "w:tblPr", "w:trPr", "w:tcPr", "w:tblStylePr",
];

#[derive(Clone, Debug, PartialEq)]
pub struct StyleDefinition {
    element: XmlElement,
}

impl StyleDefinition {
    pub fn from_element(element: XmlElement) -> Self {
        Self { element }
    }

    pub fn new(name: &str, style_type: &str) -> Self {
        let mut element = XmlElement::new(W_STYLE)
            .with_attr("w:type", style_type)
            .with_attr("w:styleId", style_id_for(name));
        element.append(XmlElement::new("w:name").with_attr(W_VAL, name));
        Self { element }
    }

    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut XmlElement {
        &mut self.element
    }

    pub fn name(&self) -> Option<&str> {
        self.element.child("w:name").and_then(|n| n.attr(W_VAL))
    }

    pub fn style_id(&self) -> Option<&str> {
        self.element.attr("w:styleId")
    }

    pub fn style_type(&self) -> &str {
        self.element.attr("w:type").unwrap_or("paragraph")
    }

    pub fn is_default(&self) -> bool {
        matches!(self.element.attr("w:default"), Some("1" | "true" | "on"))
    }

    pub fn is_base(&self) -> bool {
        self.style_type() == "paragraph"
            && (self.is_default() || self.name() == Some(DEFAULT_STYLE_NAME))
    }

    /// True when `name` refers to this style, either by display name
    /// (case-insensitively, so `Heading 1` finds Word's `heading 1`) or by id.
    pub fn matches(&self, name: &str) -> bool {
        self.name().is_some_and(|n| n.eq_ignore_ascii_case(name))
            || self.style_id() == Some(style_id_for(name).as_str())
    }

    pub fn font(&self) -> Font {
        Font::read(self.element.child(W_RPR))
    }

    pub fn paragraph_format(&self) -> ParagraphFormat {
        ParagraphFormat::read(self.element.child(W_PPR))
    }

    pub fn borders(&self) -> Vec<BorderEdge> {
        self.element
            .child(W_PPR)
            .and_then(|p| p.child(W_PBDR))
            .map(edge_borders)
            .unwrap_or_default()
    }

    pub fn run_properties_mut(&mut self) -> &mut XmlElement {
        self.element.get_or_add_ordered(W_RPR, STYLE_ORDER)
    }

    pub fn paragraph_properties_mut(&mut self) -> &mut XmlElement {
        self.element.get_or_add_ordered(W_PPR, STYLE_ORDER)
    }

    pub fn clear_paragraph_borders(&mut self) {
        if let Some(ppr) = self.element.child_mut(W_PPR) {
            ppr.remove_children(W_PBDR);
        }
    }
}

fn style_id_for(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The `w:styles` part: document defaults and latent styles in `root`,
/// style definitions in document order.
#[derive(Clone, Debug)]
pub struct Styles {
    root: XmlElement,
    styles: Vec<StyleDefinition>,
}

impl Styles {
    pub fn from_element(mut root: XmlElement) -> Self {
        let styles = root
            .children_named(W_STYLE)
            .cloned()
            .map(StyleDefinition::from_element)
            .collect();
        root.remove_children(W_STYLE);
        Self { root, styles }
    }

    pub fn to_element(&self) -> XmlElement {
        let mut root = self.root.clone();
        for style in &self.styles {
            root.append(style.element.clone());
        }
        root
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDefinition> {
        self.styles.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.iter().any(|s| s.matches(name))
    }

    pub fn get(&self, name: &str) -> Result<&StyleDefinition> {
        self.styles
            .iter()
            .find(|s| s.matches(name))
            .ok_or_else(|| Error::StyleNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut StyleDefinition> {
        self.styles
            .iter_mut()
            .find(|s| s.matches(name))
            .ok_or_else(|| Error::StyleNotFound(name.to_string()))
    }

    pub fn name_for_id(&self, style_id: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|s| s.style_id() == Some(style_id))
            .and_then(|s| s.name())
    }

    pub fn default_paragraph(&self) -> Option<&StyleDefinition> {
        self.styles
            .iter()
            .find(|s| s.style_type() == "paragraph" && s.is_default())
            .or_else(|| self.styles.iter().find(|s| s.is_base()))
    }

    pub fn default_paragraph_mut(&mut self) -> Result<&mut StyleDefinition> {
        let idx = self
            .styles
            .iter()
            .position(|s| s.style_type() == "paragraph" && s.is_default())
            .or_else(|| self.styles.iter().position(|s| s.is_base()))
            .ok_or_else(|| Error::StyleNotFound(DEFAULT_STYLE_NAME.to_string()))?;
        Ok(&mut self.styles[idx])
    }

    /// Adds a deep copy of `style`, keeping its name and type. The copy gets
    /// a fresh id when its id is already taken here, and never claims the
    /// default flag.
    pub fn add_clone(&mut self, style: &StyleDefinition) -> &mut StyleDefinition {
        let mut copy = style.clone();
        let base_id = style
            .style_id()
            .map(str::to_string)
            .or_else(|| style.name().map(style_id_for))
            .unwrap_or_else(|| "Style".to_string());
        let mut id = base_id.clone();
        let mut n = 1;
        while self.styles.iter().any(|s| s.style_id() == Some(id.as_str())) {
            id = format!("{base_id}{n}");
            n += 1;
        }
        copy.element.set_attr("w:styleId", id);
        copy.element.remove_attr("w:default");
        self.styles.push(copy);
        let idx = self.styles.len() - 1;
        &mut self.styles[idx]
    }

    pub fn add(&mut self, style: StyleDefinition) -> &mut StyleDefinition {
        self.styles.push(style);
        let idx = self.styles.len() - 1;
        &mut self.styles[idx]
    }

    pub fn retain_descendants<F>(&mut self, keep: &mut F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let mut removed = self.root.retain_descendants(keep);
        for style in &mut self.styles {
            removed += style.element.retain_descendants(keep);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_falls_back_to_id() {
        let mut styles = Styles::from_element(XmlElement::new("w:styles"));
        let mut heading = StyleDefinition::new("heading 1", "paragraph");
        heading.element_mut().set_attr("w:styleId", "Heading1");
        styles.add(heading);

        assert!(styles.get("Heading 1").is_ok());
        assert!(styles.get("Heading1").is_ok());
        assert!(matches!(styles.get("Title"), Err(Error::StyleNotFound(n)) if n == "Title"));
    }

    #[test]
    fn clone_gets_fresh_id_on_collision() {
        let mut styles = Styles::from_element(XmlElement::new("w:styles"));
        styles.add(StyleDefinition::new("Quote", "paragraph"));
        let other = StyleDefinition::new("Quote", "paragraph");
        let copy = styles.add_clone(&other);
        assert_eq!(copy.style_id(), Some("Quote1"));
        assert_eq!(copy.name(), Some("Quote"));
    }
}
