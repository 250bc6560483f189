use crate::borders::clean_decorative_lines;
use crate::docx::{DocxDocument, PPR_ORDER, W_PPR, W_PSTYLE, W_R, W_RPR, W_T, W_VAL};
use crate::error::Result;
use crate::model::{set_east_asia_font, set_font_name, set_font_size, set_toggle};
use crate::styles::{DEFAULT_STYLE_NAME, StyleDefinition};
use crate::xml::XmlElement;

/// Styles that are always merged into the output document, never duplicated.
const STRUCTURAL_STYLES: &[&str] = &[DEFAULT_STYLE_NAME, "Heading 1", "Heading 2"];

/// Character emphasis requested for a copied style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StyleOverrides {
    pub bold: bool,
    pub italic: bool,
}

/// Applies the configured font and reconciles template styles.
#[derive(Clone, Debug)]
pub struct DocumentFormatter {
    font_name: String,
    font_size: f32,
}

impl DocumentFormatter {
    pub fn new(font_name: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_name: font_name.into(),
            font_size,
        }
    }

    pub fn font_name(&self) -> &str {
        &self.font_name
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Folds `source` into `target`.
    ///
    /// Fonts only ever gain attributes: an unset or explicitly false value on
    /// the source is skipped. Paragraph-format values are copied whenever the
    /// source sets them, zeros included. The target never keeps a paragraph
    /// border group. Merging the base style into the base style does nothing.
    pub fn merge_style_properties(&self, target: &mut StyleDefinition, source: &StyleDefinition) {
        if source.is_base() && target.is_base() {
            log::debug!("skipping merge of base style {:?}", target.name());
            return;
        }

        let mut source = source.clone();
        clean_decorative_lines(source.element_mut(), false);
        if let Some(ppr) = source.element_mut().child_mut(W_PPR) {
            clean_decorative_lines(ppr, false);
        }

        source.font().additive().apply(target.run_properties_mut());
        source
            .paragraph_format()
            .apply(target.paragraph_properties_mut());

        target.clear_paragraph_borders();
    }

    /// Brings one style a paragraph uses over from `template`.
    ///
    /// The default style and the first two heading styles are always merged;
    /// any other style is cloned when the target lacks it and merged
    /// otherwise. `overrides` then apply to the resulting target style on
    /// both paths.
    pub fn copy_paragraph_styles(
        &self,
        target: &mut DocxDocument,
        template: Option<&DocxDocument>,
        style_name: &str,
        overrides: StyleOverrides,
    ) -> Result<()> {
        let Some(template) = template else {
            return Ok(());
        };

        if STRUCTURAL_STYLES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(style_name))
        {
            let source = template.styles().get(style_name)?;
            let existing = target.styles_mut().get_mut(style_name)?;
            self.merge_style_properties(existing, source);
            return Ok(());
        }

        let source = template.styles().get(style_name)?;
        let styles = target.styles_mut();
        let style = if styles.contains(style_name) {
            let existing = styles.get_mut(style_name)?;
            self.merge_style_properties(existing, source);
            existing
        } else {
            log::debug!("cloning style {style_name:?} from template");
            styles.add_clone(source)
        };

        if overrides.bold {
            set_toggle(style.run_properties_mut(), "w:b", true);
        }
        if overrides.italic {
            set_toggle(style.run_properties_mut(), "w:i", true);
        }
        Ok(())
    }

    /// Reconciles the output document's styles with `template`, or, without
    /// one, sets the configured font on the default style.
    pub fn apply_base_styles(
        &self,
        doc: &mut DocxDocument,
        template: Option<&DocxDocument>,
    ) -> Result<()> {
        if let Some(template) = template {
            for style in template.styles().iter() {
                let Some(name) = style.name() else {
                    log::debug!("skipping unnamed template style {:?}", style.style_id());
                    continue;
                };
                if doc.styles().contains(name) {
                    let existing = doc.styles_mut().get_mut(name)?;
                    self.merge_style_properties(existing, style);
                } else {
                    doc.styles_mut().add_clone(style);
                }
            }
            return Ok(());
        }

        let base = doc.styles_mut().default_paragraph_mut()?;
        let rpr = base.run_properties_mut();
        set_font_name(rpr, &self.font_name);
        set_font_size(rpr, self.font_size);
        set_east_asia_font(rpr, &self.font_name);
        Ok(())
    }

    /// Appends a paragraph holding `text` in the configured font.
    ///
    /// `style_name` is only used when the document defines it.
    pub fn create_paragraph<'a>(
        &self,
        doc: &'a mut DocxDocument,
        text: &str,
        bold: bool,
        italic: bool,
        style_name: Option<&str>,
    ) -> &'a mut XmlElement {
        let style_id = style_name
            .and_then(|name| doc.styles().get(name).ok())
            .and_then(|s| s.style_id())
            .map(str::to_string);

        let mut run = XmlElement::new(W_R);
        let rpr = run.get_or_add(W_RPR);
        set_font_name(rpr, &self.font_name);
        set_east_asia_font(rpr, &self.font_name);
        if bold {
            set_toggle(rpr, "w:b", true);
        }
        if italic {
            set_toggle(rpr, "w:i", true);
        }
        let t = run.append(XmlElement::new(W_T).with_attr("xml:space", "preserve"));
        t.push_text(text);

        let paragraph = doc.add_paragraph();
        if let Some(id) = style_id {
            paragraph
                .get_or_insert_first(W_PPR)
                .get_or_add_ordered(W_PSTYLE, PPR_ORDER)
                .set_attr(W_VAL, id);
        }
        paragraph.append(run);
        paragraph
    }
}

/// Parses a size label such as `小四(12)` or a plain number into points.
pub fn configure_font(label: &str) -> Option<f32> {
    let label = label.trim();
    let inner = match (label.find(['(', '（']), label.rfind([')', '）'])) {
        (Some(open), Some(close)) if open < close => {
            let open_len = label[open..].chars().next().map_or(1, char::len_utf8);
            &label[open + open_len..close]
        }
        _ => label,
    };
    inner
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|pt| pt.is_finite() && *pt > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_labels() {
        assert_eq!(configure_font("小四(12)"), Some(12.0));
        assert_eq!(configure_font("五号(10.5)"), Some(10.5));
        assert_eq!(configure_font("三号（16）"), Some(16.0));
        assert_eq!(configure_font("14"), Some(14.0));
        assert_eq!(configure_font("large"), None);
        assert_eq!(configure_font("(0)"), None);
    }
}
