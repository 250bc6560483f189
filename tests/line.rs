mod common;

use common::{edges, fragment};
use docgen::LineFormatter;

fn paragraph() -> docgen::xml::XmlElement {
    fragment(r#"<w:p {W}><w:r><w:t>Summary: done</w:t></w:r></w:p>"#)
}

fn e(tag: &str, size: u32, space: u32) -> (String, u32, u32) {
    (tag.to_string(), size, space)
}

#[test]
fn disabled_formatter_changes_nothing() {
    let lines = LineFormatter::new(false);
    let mut p = paragraph();
    let before = p.clone();
    lines.add_symbol_triggered_border(&mut p, ':');
    lines.set_spacing_border(&mut p);
    lines.set_spacing_property(&mut p);
    assert_eq!(p, before);
}

#[test]
fn only_registered_symbols_trigger() {
    let lines = LineFormatter::new(true);
    let mut p = paragraph();
    lines.add_symbol_triggered_border(&mut p, ';');
    assert!(p.child("w:pPr").is_none());

    lines.add_symbol_triggered_border(&mut p, ':');
    let ppr = p.child("w:pPr").unwrap();
    assert_eq!(edges(ppr), [e("w:right", 8, 24), e("w:bottom", 8, 0)]);
    assert_eq!(p.elements().next().unwrap().name(), "w:pPr");
}

#[test]
fn spacing_border_boxes_the_paragraph() {
    let lines = LineFormatter::new(true);
    let mut p = fragment(r#"<w:p {W}><w:pPr><w:ind w:left="720" w:right="360"/></w:pPr></w:p>"#);
    lines.set_spacing_border(&mut p);
    let ppr = p.child("w:pPr").unwrap();
    let ind = ppr.child("w:ind").unwrap();
    assert_eq!((ind.attr("w:left"), ind.attr("w:right")), (Some("0"), Some("0")));
    assert_eq!(
        edges(ppr),
        [e("w:top", 4, 0), e("w:left", 4, 0), e("w:bottom", 4, 0), e("w:right", 4, 0)]
    );
}

#[test]
fn spacing_property_sets_rule_indent_and_gap() {
    let lines = LineFormatter::new(true);
    let mut p = fragment(
        r#"<w:p {W}><w:pPr><w:spacing w:line="360" w:lineRule="auto"/><w:ind w:hanging="200"/></w:pPr></w:p>"#,
    );
    lines.set_spacing_property(&mut p);
    let ppr = p.child("w:pPr").unwrap();
    assert_eq!(edges(ppr), [e("w:bottom", 4, 0)]);
    let ind = ppr.child("w:ind").unwrap();
    assert_eq!(ind.attr("w:firstLine"), Some("0"));
    assert_eq!(ind.attr("w:hanging"), None);
    let spacing = ppr.child("w:spacing").unwrap();
    assert_eq!(spacing.attr("w:before"), Some("60"));
    assert_eq!(spacing.attr("w:after"), Some("60"));
    assert_eq!(spacing.attr("w:line"), Some("360"));
}

#[test]
fn operations_accumulate() {
    let lines = LineFormatter::new(true);
    let mut p = paragraph();
    lines.add_symbol_triggered_border(&mut p, ':');
    lines.set_spacing_border(&mut p);
    lines.set_spacing_property(&mut p);
    let ppr = p.child("w:pPr").unwrap();
    assert_eq!(edges(ppr).len(), 7);
    assert_eq!(ppr.children_named("w:ind").count(), 1);
    assert_eq!(ppr.children_named("w:spacing").count(), 1);
}

#[test]
fn finds_triggers_in_text() {
    let lines = LineFormatter::new(false);
    assert_eq!(lines.triggers_in("a: b").collect::<Vec<_>>(), [':']);
    assert_eq!(lines.triggers_in("no colon").count(), 0);
}
