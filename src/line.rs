//! Decorative borders and spacing added to produced paragraphs.
//!
//! Edges are appended directly to the paragraph's `w:pPr`, so each operation
//! adds to whatever the others left there. Indent and spacing values are
//! written onto the existing `w:ind` / `w:spacing` node when there is one.

use crate::docx::{PPR_ORDER, W_PPR};
use crate::model::{BorderEdge, Edge};
use crate::xml::XmlElement;

const SYMBOL_TRIGGERS: &[char] = &[':'];

/// 6pt in twentieths of a point.
const PARAGRAPH_GAP: &str = "60";

#[derive(Clone, Debug)]
pub struct LineFormatter {
    spacing_enabled: bool,
    symbol_triggers: Vec<char>,
}

impl LineFormatter {
    pub fn new(spacing_enabled: bool) -> Self {
        Self {
            spacing_enabled,
            symbol_triggers: SYMBOL_TRIGGERS.to_vec(),
        }
    }

    pub fn spacing_enabled(&self) -> bool {
        self.spacing_enabled
    }

    pub fn is_trigger(&self, symbol: char) -> bool {
        self.symbol_triggers.contains(&symbol)
    }

    pub fn triggers_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = char> + 'a {
        self.symbol_triggers
            .iter()
            .copied()
            .filter(move |c| text.contains(*c))
    }

    /// Right edge (8, spaced 24) plus bottom edge (8) for a registered trigger.
    pub fn add_symbol_triggered_border(&self, paragraph: &mut XmlElement, symbol: char) {
        if !self.spacing_enabled || !self.is_trigger(symbol) {
            return;
        }
        let ppr = paragraph.get_or_insert_first(W_PPR);
        ppr.append(BorderEdge::single(Edge::Right, 8, 24).to_element());
        ppr.append(BorderEdge::single(Edge::Bottom, 8, 0).to_element());
    }

    pub fn set_spacing_border(&self, paragraph: &mut XmlElement) {
        if !self.spacing_enabled {
            return;
        }
        let ppr = paragraph.get_or_insert_first(W_PPR);
        let ind = ppr.get_or_add_ordered("w:ind", PPR_ORDER);
        ind.set_attr("w:left", "0");
        ind.set_attr("w:right", "0");
        for edge in [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right] {
            ppr.append(BorderEdge::single(edge, 4, 0).to_element());
        }
    }

    pub fn set_spacing_property(&self, paragraph: &mut XmlElement) {
        if !self.spacing_enabled {
            return;
        }
        let ppr = paragraph.get_or_insert_first(W_PPR);
        ppr.append(BorderEdge::single(Edge::Bottom, 4, 0).to_element());

        let ind = ppr.get_or_add_ordered("w:ind", PPR_ORDER);
        ind.set_attr("w:left", "0");
        ind.set_attr("w:right", "0");
        ind.remove_attr("w:hanging");
        ind.set_attr("w:firstLine", "0");

        let spacing = ppr.get_or_add_ordered("w:spacing", PPR_ORDER);
        spacing.set_attr("w:before", PARAGRAPH_GAP);
        spacing.set_attr("w:after", PARAGRAPH_GAP);
    }
}
