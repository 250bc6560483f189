mod common;

use common::{fragment, style};
use docgen::{
    Alignment, DocumentFormatter, DocxDocument, Error, LineRule, StyleDefinition, StyleOverrides,
    Underline, clean_decorative_lines,
};

fn formatter() -> DocumentFormatter {
    DocumentFormatter::new("微软雅黑", 12.0)
}

#[test]
fn clean_without_keep_removes_edges_and_group() {
    let mut props = fragment(
        r#"<w:pPr {W}><w:top w:val="single"/><w:left w:val="single"/><w:bottom w:val="single"/>
           <w:right w:val="single"/><w:between w:val="single"/>
           <w:pBdr><w:top w:val="double"/></w:pBdr><w:jc w:val="center"/></w:pPr>"#,
    );
    clean_decorative_lines(&mut props, false);
    let left: Vec<&str> = props.elements().map(|e| e.name()).collect();
    assert_eq!(left, ["w:jc"]);
}

#[test]
fn clean_with_keep_still_drops_group() {
    let mut props = fragment(
        r#"<w:tcPr {W}><w:top w:val="single"/><w:right w:val="single"/><w:pBdr><w:top w:val="double"/></w:pBdr></w:tcPr>"#,
    );
    clean_decorative_lines(&mut props, true);
    let left: Vec<&str> = props.elements().map(|e| e.name()).collect();
    assert_eq!(left, ["w:top", "w:right"]);
}

#[test]
fn base_style_into_base_style_is_noop() {
    let mut target = style(
        r#"<w:style {W} w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/>
           <w:rPr><w:sz w:val="20"/></w:rPr></w:style>"#,
    );
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/>
           <w:pPr><w:jc w:val="center"/><w:pBdr><w:top w:val="single"/></w:pBdr></w:pPr>
           <w:rPr><w:sz w:val="40"/><w:b/></w:rPr></w:style>"#,
    );
    let before = target.clone();
    formatter().merge_style_properties(&mut target, &source);
    assert_eq!(target, before);
}

#[test]
fn false_font_value_never_turns_attribute_off() {
    let mut target = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/>
           <w:rPr><w:b/><w:i/><w:u w:val="single"/></w:rPr></w:style>"#,
    );
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/>
           <w:rPr><w:b w:val="0"/><w:i w:val="false"/><w:u w:val="none"/><w:color w:val="FF0000"/></w:rPr></w:style>"#,
    );
    formatter().merge_style_properties(&mut target, &source);
    let font = target.font();
    assert_eq!(font.bold, Some(true));
    assert_eq!(font.italic, Some(true));
    assert_eq!(font.underline, Some(Underline::Style("single".into())));
    assert_eq!(font.color.as_deref(), Some("FF0000"));
}

#[test]
fn zero_paragraph_values_do_overwrite() {
    let mut target = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Body"><w:name w:val="Body"/>
           <w:pPr><w:spacing w:before="120" w:after="240"/><w:ind w:firstLine="420"/></w:pPr></w:style>"#,
    );
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Body"><w:name w:val="Body"/>
           <w:pPr><w:spacing w:before="0" w:line="360" w:lineRule="auto"/><w:ind w:firstLine="0"/>
           <w:jc w:val="both"/></w:pPr></w:style>"#,
    );
    formatter().merge_style_properties(&mut target, &source);
    let format = target.paragraph_format();
    assert_eq!(format.space_before, Some(0));
    assert_eq!(format.space_after, Some(240));
    assert_eq!(format.first_line_indent, Some(0));
    assert_eq!(format.alignment, Some(Alignment::Justify));
    let line = format.line_spacing.unwrap();
    assert_eq!((line.value, line.rule), (360, LineRule::Auto));
}

#[test]
fn font_attributes_are_copied() {
    let mut target = StyleDefinition::new("Caption", "paragraph");
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Caption"><w:name w:val="Caption"/>
           <w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:b/><w:sz w:val="21"/></w:rPr></w:style>"#,
    );
    formatter().merge_style_properties(&mut target, &source);
    let font = target.font();
    assert_eq!(font.name.as_deref(), Some("Georgia"));
    assert_eq!(font.size, Some(10.5));
    assert_eq!(font.bold, Some(true));
}

#[test]
fn merged_style_loses_border_group() {
    let mut target = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/>
           <w:pPr><w:pBdr><w:bottom w:val="single" w:sz="8"/></w:pBdr></w:pPr></w:style>"#,
    );
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/>
           <w:pPr><w:pBdr><w:top w:val="double"/></w:pBdr><w:jc w:val="center"/></w:pPr></w:style>"#,
    );
    formatter().merge_style_properties(&mut target, &source);
    assert!(target.borders().is_empty());
    assert!(target.element().descendants().iter().all(|e| e.name() != "w:pBdr"));
    assert_eq!(target.paragraph_format().alignment, Some(Alignment::Center));
}

#[test]
fn merge_leaves_source_untouched() {
    let mut target = StyleDefinition::new("Title", "paragraph");
    let source = style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/>
           <w:pPr><w:pBdr><w:top w:val="double"/></w:pBdr></w:pPr></w:style>"#,
    );
    let before = source.clone();
    formatter().merge_style_properties(&mut target, &source);
    assert_eq!(source, before);
}

fn template_with_quote() -> DocxDocument {
    let mut template = DocxDocument::new();
    template.styles_mut().add(style(
        r#"<w:style {W} w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/>
           <w:rPr><w:color w:val="336699"/></w:rPr></w:style>"#,
    ));
    let heading = template.styles_mut().get_mut("Heading 1").unwrap();
    heading
        .run_properties_mut()
        .append(fragment(r#"<w:color {W} w:val="AA0000"/>"#));
    template
}

#[test]
fn copy_clones_missing_style_and_applies_overrides() {
    let template = template_with_quote();
    let mut target = DocxDocument::new();
    let overrides = StyleOverrides {
        bold: true,
        italic: true,
    };
    formatter()
        .copy_paragraph_styles(&mut target, Some(&template), "Quote", overrides)
        .unwrap();

    let quote = target.styles().get("Quote").unwrap();
    let font = quote.font();
    assert_eq!(font.color.as_deref(), Some("336699"));
    assert_eq!(font.bold, Some(true));
    assert_eq!(font.italic, Some(true));
}

#[test]
fn copy_merges_existing_style_and_applies_overrides() {
    let template = template_with_quote();
    let mut target = DocxDocument::new();
    target
        .styles_mut()
        .add(StyleDefinition::new("Quote", "paragraph"));
    let overrides = StyleOverrides {
        bold: true,
        italic: false,
    };
    formatter()
        .copy_paragraph_styles(&mut target, Some(&template), "Quote", overrides)
        .unwrap();

    assert_eq!(target.styles().iter().filter(|s| s.matches("Quote")).count(), 1);
    let font = target.styles().get("Quote").unwrap().font();
    assert_eq!(font.color.as_deref(), Some("336699"));
    assert_eq!(font.bold, Some(true));
    assert_eq!(font.italic, None);
}

#[test]
fn structural_styles_are_merged_not_duplicated() {
    let template = template_with_quote();
    let mut target = DocxDocument::new();
    let count = target.styles().len();
    formatter()
        .copy_paragraph_styles(&mut target, Some(&template), "Heading 1", StyleOverrides::default())
        .unwrap();
    assert_eq!(target.styles().len(), count);
    let font = target.styles().get("Heading 1").unwrap().font();
    assert_eq!(font.color.as_deref(), Some("AA0000"));
}

#[test]
fn copy_reports_missing_style() {
    let template = DocxDocument::new();
    let mut target = DocxDocument::new();
    let err = formatter()
        .copy_paragraph_styles(&mut target, Some(&template), "Aside", StyleOverrides::default())
        .unwrap_err();
    assert!(matches!(err, Error::StyleNotFound(name) if name == "Aside"));
}

#[test]
fn copy_without_template_does_nothing() {
    let mut target = DocxDocument::new();
    let before = target.styles().to_element();
    formatter()
        .copy_paragraph_styles(&mut target, None, "Missing", StyleOverrides::default())
        .unwrap();
    assert_eq!(target.styles().to_element(), before);
}

#[test]
fn base_styles_without_template_set_both_font_slots() {
    let mut doc = DocxDocument::new();
    formatter().apply_base_styles(&mut doc, None).unwrap();
    let normal = doc.styles().get("Normal").unwrap();
    assert_eq!(normal.font().name.as_deref(), Some("微软雅黑"));
    assert_eq!(normal.font().size, Some(12.0));
    let fonts = normal
        .element()
        .child("w:rPr")
        .and_then(|r| r.child("w:rFonts"))
        .unwrap();
    assert_eq!(fonts.attr("w:eastAsia"), Some("微软雅黑"));
}

#[test]
fn base_styles_with_template_clone_new_and_merge_existing() {
    let template = template_with_quote();
    let mut doc = DocxDocument::new();
    formatter().apply_base_styles(&mut doc, Some(&template)).unwrap();

    assert!(doc.styles().contains("Quote"));
    assert_eq!(doc.styles().len(), template.styles().len());
    let heading = doc.styles().get("Heading 1").unwrap().font();
    assert_eq!(heading.color.as_deref(), Some("AA0000"));
    // the blank default style is untouched: base never overrides base
    assert_eq!(doc.styles().get("Normal").unwrap().font().name, None);
}
