#![allow(dead_code)]

use docgen::xml::{self, XmlElement};
use docgen::{StyleDefinition, edge_borders};

pub const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

/// Parses a WordprocessingML fragment; `{W}` in `body` is replaced by the
/// namespace declaration.
pub fn fragment(body: &str) -> XmlElement {
    xml::parse(&body.replace("{W}", W)).unwrap()
}

pub fn style(body: &str) -> StyleDefinition {
    StyleDefinition::from_element(fragment(body))
}

pub fn edges(props: &XmlElement) -> Vec<(String, u32, u32)> {
    edge_borders(props)
        .into_iter()
        .map(|b| (b.edge.tag().to_string(), b.size, b.space))
        .collect()
}

pub fn names(el: &XmlElement) -> Vec<String> {
    el.elements().map(|e| e.name().to_string()).collect()
}
