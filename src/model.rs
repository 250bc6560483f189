//! Typed views of run and paragraph properties.
//!
//! Every attribute is optional: `None` means the property node does not set
//! it. Booleans are tri-state, so `Some(false)` is an explicit "off" written
//! as `<w:b w:val="0"/>`. Indents and spacing are in twips.

use crate::docx::{PPR_ORDER, RPR_ORDER, W_VAL};
use crate::xml::XmlElement;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

impl Alignment {
    fn parse(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" => Some(Alignment::Justify),
            "distribute" => Some(Alignment::Distribute),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
            Alignment::Distribute => "distribute",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Underline {
    Off,
    Style(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineRule {
    Auto,
    Exact,
    AtLeast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineSpacing {
    /// 240ths of a line for [`LineRule::Auto`], twips otherwise.
    pub value: i32,
    pub rule: LineRule,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    pub size: Option<f32>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphFormat {
    pub alignment: Option<Alignment>,
    /// Negative values are hanging indents.
    pub first_line_indent: Option<i32>,
    pub line_spacing: Option<LineSpacing>,
    pub space_before: Option<i32>,
    pub space_after: Option<i32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Left,
    Bottom,
    Right,
    Between,
}

impl Edge {
    pub const ALL: [Edge; 5] = [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right, Edge::Between];

    pub fn tag(self) -> &'static str {
        match self {
            Edge::Top => "w:top",
            Edge::Left => "w:left",
            Edge::Bottom => "w:bottom",
            Edge::Right => "w:right",
            Edge::Between => "w:between",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Edge::ALL.into_iter().find(|e| e.tag() == tag)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BorderEdge {
    pub edge: Edge,
    pub style: String,
    /// Eighths of a point.
    pub size: u32,
    pub space: u32,
    pub color: String,
}

impl BorderEdge {
    pub fn single(edge: Edge, size: u32, space: u32) -> Self {
        Self {
            edge,
            style: "single".to_string(),
            size,
            space,
            color: "auto".to_string(),
        }
    }

    pub fn from_element(el: &XmlElement) -> Option<Self> {
        let edge = Edge::from_tag(el.name())?;
        Some(Self {
            edge,
            style: el.attr(W_VAL).unwrap_or("nil").to_string(),
            size: el.attr("w:sz").and_then(|v| v.parse().ok()).unwrap_or(0),
            space: el.attr("w:space").and_then(|v| v.parse().ok()).unwrap_or(0),
            color: el.attr("w:color").unwrap_or("auto").to_string(),
        })
    }

    pub fn to_element(&self) -> XmlElement {
        XmlElement::new(self.edge.tag())
            .with_attr(W_VAL, self.style.as_str())
            .with_attr("w:sz", self.size.to_string())
            .with_attr("w:space", self.space.to_string())
            .with_attr("w:color", self.color.as_str())
    }
}

pub fn edge_borders(props: &XmlElement) -> Vec<BorderEdge> {
    props.elements().filter_map(BorderEdge::from_element).collect()
}

fn on_off(el: &XmlElement) -> bool {
    !matches!(el.attr(W_VAL), Some("0" | "false" | "off"))
}

fn twips(el: &XmlElement, attr: &str) -> Option<i32> {
    el.attr(attr).and_then(|v| v.parse::<i32>().ok())
}

impl Font {
    pub fn read(rpr: Option<&XmlElement>) -> Self {
        let Some(rpr) = rpr else {
            return Self::default();
        };
        Self {
            name: rpr
                .child("w:rFonts")
                .and_then(|f| f.attr("w:ascii"))
                .map(str::to_string),
            size: rpr
                .child("w:sz")
                .and_then(|n| n.attr(W_VAL))
                .and_then(|v| v.parse::<f32>().ok())
                .map(|hp| hp / 2.0),
            color: rpr
                .child("w:color")
                .and_then(|n| n.attr(W_VAL))
                .map(str::to_string),
            bold: rpr.child("w:b").map(on_off),
            italic: rpr.child("w:i").map(on_off),
            underline: rpr.child("w:u").map(|u| match u.attr(W_VAL) {
                Some("none") => Underline::Off,
                Some(style) => Underline::Style(style.to_string()),
                None => Underline::Style("single".to_string()),
            }),
        }
    }

    /// The subset of this font a merge copies onto another style: set values
    /// that are not an explicit "off".
    pub fn additive(&self) -> Self {
        Self {
            name: self.name.clone(),
            size: self.size,
            color: self.color.clone(),
            bold: self.bold.filter(|b| *b),
            italic: self.italic.filter(|i| *i),
            underline: self.underline.clone().filter(|u| *u != Underline::Off),
        }
    }

    pub fn apply(&self, rpr: &mut XmlElement) {
        if let Some(name) = &self.name {
            set_font_name(rpr, name);
        }
        if let Some(size) = self.size {
            set_font_size(rpr, size);
        }
        if let Some(color) = &self.color {
            rpr.get_or_add_ordered("w:color", RPR_ORDER)
                .set_attr(W_VAL, color.as_str());
        }
        if let Some(bold) = self.bold {
            set_toggle(rpr, "w:b", bold);
        }
        if let Some(italic) = self.italic {
            set_toggle(rpr, "w:i", italic);
        }
        if let Some(underline) = &self.underline {
            let val = match underline {
                Underline::Off => "none",
                Underline::Style(s) => s.as_str(),
            };
            rpr.get_or_add_ordered("w:u", RPR_ORDER).set_attr(W_VAL, val);
        }
    }
}

pub fn set_font_name(rpr: &mut XmlElement, name: &str) {
    let fonts = rpr.get_or_add_ordered("w:rFonts", RPR_ORDER);
    fonts.remove_attr("w:asciiTheme");
    fonts.remove_attr("w:hAnsiTheme");
    fonts.set_attr("w:ascii", name);
    fonts.set_attr("w:hAnsi", name);
}

pub fn set_east_asia_font(rpr: &mut XmlElement, name: &str) {
    let fonts = rpr.get_or_add_ordered("w:rFonts", RPR_ORDER);
    fonts.remove_attr("w:eastAsiaTheme");
    fonts.set_attr("w:eastAsia", name);
}

pub fn set_font_size(rpr: &mut XmlElement, points: f32) {
    let half_points = (points * 2.0).round() as i64;
    rpr.get_or_add_ordered("w:sz", RPR_ORDER)
        .set_attr(W_VAL, half_points.to_string());
}

pub fn set_toggle(rpr: &mut XmlElement, tag: &str, on: bool) {
    let el = rpr.get_or_add_ordered(tag, RPR_ORDER);
    if on {
        el.remove_attr(W_VAL);
    } else {
        el.set_attr(W_VAL, "0");
    }
}

impl ParagraphFormat {
    pub fn read(ppr: Option<&XmlElement>) -> Self {
        let Some(ppr) = ppr else {
            return Self::default();
        };
        let spacing = ppr.child("w:spacing");
        let ind = ppr.child("w:ind");
        Self {
            alignment: ppr
                .child("w:jc")
                .and_then(|n| n.attr(W_VAL))
                .and_then(Alignment::parse),
            first_line_indent: ind.and_then(|n| {
                twips(n, "w:firstLine").or_else(|| twips(n, "w:hanging").map(|h| -h))
            }),
            line_spacing: spacing.and_then(|n| {
                let value = twips(n, "w:line")?;
                let rule = match n.attr("w:lineRule") {
                    Some("exact") => LineRule::Exact,
                    Some("atLeast") => LineRule::AtLeast,
                    _ => LineRule::Auto,
                };
                Some(LineSpacing { value, rule })
            }),
            space_before: spacing.and_then(|n| twips(n, "w:before")),
            space_after: spacing.and_then(|n| twips(n, "w:after")),
        }
    }

    pub fn apply(&self, ppr: &mut XmlElement) {
        if let Some(alignment) = self.alignment {
            ppr.get_or_add_ordered("w:jc", PPR_ORDER)
                .set_attr(W_VAL, alignment.as_str());
        }
        if let Some(indent) = self.first_line_indent {
            let ind = ppr.get_or_add_ordered("w:ind", PPR_ORDER);
            if indent < 0 {
                ind.remove_attr("w:firstLine");
                ind.set_attr("w:hanging", (-indent).to_string());
            } else {
                ind.remove_attr("w:hanging");
                ind.set_attr("w:firstLine", indent.to_string());
            }
        }
        if let Some(line) = self.line_spacing {
            let spacing = ppr.get_or_add_ordered("w:spacing", PPR_ORDER);
            spacing.set_attr("w:line", line.value.to_string());
            let rule = match line.rule {
                LineRule::Auto => "auto",
                LineRule::Exact => "exact",
                LineRule::AtLeast => "atLeast",
            };
            spacing.set_attr("w:lineRule", rule);
        }
        if let Some(before) = self.space_before {
            ppr.get_or_add_ordered("w:spacing", PPR_ORDER)
                .set_attr("w:before", before.to_string());
        }
        if let Some(after) = self.space_after {
            ppr.get_or_add_ordered("w:spacing", PPR_ORDER)
                .set_attr("w:after", after.to_string());
        }
    }
}
