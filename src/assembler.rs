//! Builds the output document: template loading, normalization, style
//! reconciliation, content appending and saving, strictly in that order.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::borders::{clean_decorative_lines, strip_border_elements};
use crate::config::StyleConfig;
use crate::docx::{DocxDocument, SECT_PR_ORDER, W_PPR, W_TYPE, W_VAL, paragraph_text};
use crate::error::{Error, Result};
use crate::formatting::DocumentFormatter;
use crate::line::LineFormatter;

/// Per-call document settings. Unset font fields fall back to the
/// configured defaults.
#[derive(Clone, Debug, Default)]
pub struct DocumentRequest {
    pub font_name: Option<String>,
    /// Points.
    pub font_size: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub template: Option<PathBuf>,
    /// Decorates appended paragraphs with separator lines and spacing.
    pub spacing_enabled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblyState {
    Created,
    TemplateLoaded,
    Normalized,
    StylesMerged,
    ContentAppended,
    SectionsFixed,
    Saved,
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyState::Created => "created",
            AssemblyState::TemplateLoaded => "template loaded",
            AssemblyState::Normalized => "normalized",
            AssemblyState::StylesMerged => "styles merged",
            AssemblyState::ContentAppended => "content appended",
            AssemblyState::SectionsFixed => "sections fixed",
            AssemblyState::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Returns `path` if it is free, otherwise the first free `stem_N.ext`
/// counting up from 1.
///
/// The counter has no upper bound; it stops because a directory only ever
/// holds finitely many files.
pub fn resolve_output_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut counter: u64 = 1;
    loop {
        let candidate = path.with_file_name(format!("{stem}_{counter}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Marks every section as continuous, creating the `w:type` marker where
/// a section has none.
pub fn force_continuous_sections(doc: &mut DocxDocument) {
    for sect in doc.sections_mut() {
        sect.get_or_add_ordered(W_TYPE, SECT_PR_ORDER)
            .set_attr(W_VAL, "continuous");
    }
}

/// One document build.
pub struct Assembly {
    state: AssemblyState,
    output: PathBuf,
    request: DocumentRequest,
    formatter: DocumentFormatter,
    doc: DocxDocument,
    template: Option<DocxDocument>,
}

impl Assembly {
    pub fn new(output: &Path, request: DocumentRequest, defaults: &StyleConfig) -> Self {
        let formatter = DocumentFormatter::new(
            request
                .font_name
                .clone()
                .unwrap_or_else(|| defaults.font_name.clone()),
            request.font_size.unwrap_or(defaults.font_size),
        );
        Self {
            state: AssemblyState::Created,
            output: resolve_output_path(output),
            request,
            formatter,
            doc: DocxDocument::new(),
            template: None,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn document(&self) -> &DocxDocument {
        &self.doc
    }

    fn advance(&mut self, next: AssemblyState) {
        log::debug!("assembly {} -> {}", self.state, next);
        self.state = next;
    }

    /// Starts from the template when one is given and present on disk,
    /// otherwise from a blank document.
    pub fn load_template(&mut self) -> Result<()> {
        match self.request.template.as_deref() {
            Some(path) if path.exists() => {
                let template =
                    DocxDocument::open(path).map_err(|e| Error::template_load(path, e))?;
                log::info!("loaded template {}", path.display());
                self.doc = template.clone();
                self.template = Some(template);
            }
            Some(path) => {
                log::warn!("template {} not found, starting blank", path.display());
            }
            None => {}
        }
        self.advance(AssemblyState::TemplateLoaded);
        Ok(())
    }

    /// Cleans the existing content: paragraphs keep their own edges but
    /// get the separator treatment, cells lose border groups, sections
    /// become continuous, and nothing named `*Bdr*` survives.
    pub fn normalize(&mut self) -> Result<()> {
        self.normalize_content().map_err(Error::assembly)?;
        self.advance(AssemblyState::Normalized);
        Ok(())
    }

    fn normalize_content(&mut self) -> Result<()> {
        // Existing content is always decorated, whatever the request says.
        let lines = LineFormatter::new(true);
        for paragraph in self.doc.paragraphs_mut() {
            clean_decorative_lines(paragraph.get_or_insert_first(W_PPR), true);
            let text = paragraph_text(paragraph);
            for symbol in lines.triggers_in(&text) {
                lines.add_symbol_triggered_border(paragraph, symbol);
            }
            lines.set_spacing_property(paragraph);
        }

        self.doc
            .for_each_cell_properties(|tcpr| clean_decorative_lines(tcpr, true));

        force_continuous_sections(&mut self.doc);

        let removed = strip_border_elements(self.doc.element_mut())
            + self
                .doc
                .styles_mut()
                .retain_descendants(&mut |el| !el.name().contains("Bdr"));
        log::debug!("removed {removed} residual border elements");
        Ok(())
    }

    pub fn merge_styles(&mut self) -> Result<()> {
        self.formatter
            .apply_base_styles(&mut self.doc, self.template.as_ref())
            .map_err(Error::assembly)?;
        self.advance(AssemblyState::StylesMerged);
        Ok(())
    }

    /// One paragraph per line of `content`, decorated according to the
    /// request's spacing flag.
    pub fn append_content(&mut self, content: &str) -> Result<()> {
        let lines = LineFormatter::new(self.request.spacing_enabled);
        for line in content.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            let paragraph = self.formatter.create_paragraph(
                &mut self.doc,
                line,
                self.request.bold,
                self.request.italic,
                None,
            );
            for symbol in lines.triggers_in(line) {
                lines.add_symbol_triggered_border(paragraph, symbol);
            }
            lines.set_spacing_border(paragraph);
            lines.set_spacing_property(paragraph);
        }
        self.advance(AssemblyState::ContentAppended);
        Ok(())
    }

    pub fn fix_sections(&mut self) {
        force_continuous_sections(&mut self.doc);
        self.advance(AssemblyState::SectionsFixed);
    }

    pub fn save(&mut self) -> Result<PathBuf> {
        self.doc.save(&self.output)?;
        log::info!("document saved to {}", self.output.display());
        self.advance(AssemblyState::Saved);
        Ok(self.output.clone())
    }

    /// Runs every step; the first failure aborts the build.
    pub fn run(mut self, content: &str) -> Result<PathBuf> {
        self.load_template()?;
        self.normalize()?;
        self.merge_styles()?;
        self.append_content(content)?;
        self.fix_sections();
        self.save()
    }
}

/// Writes `content` into a new document at `filename` (or the next free
/// numbered variant of it) and returns the path actually written.
pub fn create_document(
    content: &str,
    filename: &Path,
    request: &DocumentRequest,
    defaults: &StyleConfig,
) -> Result<PathBuf> {
    Assembly::new(filename, request.clone(), defaults).run(content)
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::styles::Styles;
    use crate::xml::XmlElement;

    #[test]
    fn style_failure_is_reported_as_assembly_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut assembly = Assembly::new(
            &dir.path().join("out.docx"),
            DocumentRequest::default(),
            &StyleConfig::default(),
        );
        assembly.load_template().unwrap();
        *assembly.doc.styles_mut() = Styles::from_element(XmlElement::new("w:styles"));

        let err = assembly.merge_styles().unwrap_err();
        assert!(matches!(err, Error::Assembly { .. }));
        let cause = err.source().and_then(|e| e.downcast_ref::<Error>());
        assert!(matches!(cause, Some(Error::StyleNotFound(name)) if name == "Normal"));
        assert_eq!(assembly.state(), AssemblyState::TemplateLoaded);
    }
}
