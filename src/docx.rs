use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::styles::Styles;
use crate::xml::{self, XmlElement};

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const STYLES_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const STYLES_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

pub(crate) const W_BODY: &str = "w:body";
pub(crate) const W_P: &str = "w:p";
pub(crate) const W_PPR: &str = "w:pPr";
pub(crate) const W_PSTYLE: &str = "w:pStyle";
pub(crate) const W_R: &str = "w:r";
pub(crate) const W_RPR: &str = "w:rPr";
pub(crate) const W_T: &str = "w:t";
pub(crate) const W_TC: &str = "w:tc";
pub(crate) const W_TCPR: &str = "w:tcPr";
pub(crate) const W_SECT_PR: &str = "w:sectPr";
pub(crate) const W_TYPE: &str = "w:type";
pub(crate) const W_VAL: &str = "w:val";

/// Schema order of `w:pPr` children.
pub(crate) const PPR_ORDER: &[&str] = &[
    "w:pStyle", "w:keepNext", "w:keepLines", "w:pageBreakBefore", "w:framePr",
    "w:widowControl", "w:numPr", "w:suppressLineNumbers", "w:pBdr", "w:shd", "w:tabs",
    "w:suppressAutoHyphens", "w:kinsoku", "w:wordWrap", "w:overflowPunct",
    "w:topLinePunct", "w:autoSpaceDE", "w:autoSpaceDN", "w:bidi", "w:adjustRightInd",
    "w:snapToGrid", "w:spacing", "w:ind", "w:contextualSpacing", "w:mirrorIndents",
    "w:suppressOverlap", "w:jc", "w:textDirection", "w:textAlignment",
    "w:textboxTightWrap", "w:outlineLvl", "w:divId", "w:cnfStyle", "w:rPr", "w:sectPr",
    "w:pPrChange",
];

/// Schema order of `w:rPr` children.
pub(crate) const RPR_ORDER: &[&str] = &[
    "w:rStyle", "w:rFonts", "w:b", "w:bCs", "w:i", "w:iCs", "w:caps", "w:smallCaps",
    "w:strike", "w:dstrike", "w:outline", "w:shadow", "w:emboss", "w:imprint",
    "w:noProof", "w:snapToGrid", "w:vanish", "w:webHidden", "w:color", "w:spacing",
    "w:w", "w:kern", "w:position", "w:sz", "w:szCs", "w:highlight", "w:u", "w:effect",
    "w:bdr", "w:shd", "w:fitText", "w:vertAlign", "w:rtl", "w:cs", "w:em", "w:lang",
    "w:eastAsianLayout", "w:specVanish", "w:oMath",
];

/// Schema order of `w:sectPr` children.
pub(crate) const SECT_PR_ORDER: &[&str] = &[
    "w:headerReference", "w:footerReference", "w:footnotePr", "w:endnotePr", "w:type",
    "w:pgSz", "w:pgMar", "w:paperSrc", "w:pgBorders", "w:lnNumType", "w:pgNumType",
    "w:cols", "w:formProt", "w:vAlign", "w:noEndnote", "w:titlePg", "w:textDirection",
    "w:bidi", "w:rtlGutter", "w:docGrid", "w:printerSettings", "w:sectPrChange",
];

const BLANK_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const BLANK_PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const BLANK_DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const BLANK_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/><w:cols w:space="720"/><w:docGrid w:linePitch="360"/></w:sectPr></w:body></w:document>"#;

const BLANK_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:asciiTheme="minorHAnsi" w:eastAsiaTheme="minorEastAsia" w:hAnsiTheme="minorHAnsi" w:cstheme="minorBidi"/><w:sz w:val="22"/><w:szCs w:val="22"/><w:lang w:val="en-US" w:eastAsia="zh-CN" w:bidi="ar-SA"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:bCs/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:unhideWhenUsed/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:bCs/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style><w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/><w:uiPriority w:val="1"/><w:semiHidden/><w:unhideWhenUsed/></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:uiPriority w:val="99"/><w:semiHidden/><w:unhideWhenUsed/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style></w:styles>"#;

/// In-memory DOCX package.
///
/// `word/document.xml` and `word/styles.xml` are held as editable trees; every
/// other part is carried through to [`DocxDocument::save`] untouched.
#[derive(Clone, Debug)]
pub struct DocxDocument {
    parts: Vec<(String, Vec<u8>)>,
    document: XmlElement,
    styles: Styles,
    styles_registered: bool,
}

fn read_parts<R: Read + std::io::Seek>(zip: &mut zip::ZipArchive<R>) -> Result<Vec<(String, Vec<u8>)>> {
    let mut parts = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut file = zip.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        parts.push((file.name().to_string(), data));
    }
    Ok(parts)
}

fn part_text<'a>(parts: &'a [(String, Vec<u8>)], name: &str) -> Option<Result<&'a str>> {
    parts.iter().find(|(n, _)| n == name).map(|(_, data)| {
        std::str::from_utf8(data).map_err(|e| Error::InvalidDocx(format!("{name}: {e}")))
    })
}

impl DocxDocument {
    pub fn new() -> Self {
        let parts = vec![
            (CONTENT_TYPES_PART.to_string(), BLANK_CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels".to_string(), BLANK_PACKAGE_RELS.as_bytes().to_vec()),
            (DOCUMENT_PART.to_string(), Vec::new()),
            (DOCUMENT_RELS_PART.to_string(), BLANK_DOCUMENT_RELS.as_bytes().to_vec()),
            (STYLES_PART.to_string(), Vec::new()),
        ];
        // The built-in parts are constants checked by the unit tests below.
        let document = xml::parse(BLANK_DOCUMENT).unwrap_or_else(|_| blank_document_tree());
        let styles = xml::parse(BLANK_STYLES)
            .map(Styles::from_element)
            .unwrap_or_else(|_| Styles::from_element(XmlElement::new("w:styles")));
        Self {
            parts,
            document,
            styles,
            styles_registered: true,
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let mut zip = zip::ZipArchive::new(file)?;
        let parts = read_parts(&mut zip)?;

        let document_text = part_text(&parts, DOCUMENT_PART)
            .ok_or_else(|| Error::InvalidDocx(format!("missing {DOCUMENT_PART}")))??;
        let document = xml::parse(document_text)?;
        if document.child(W_BODY).is_none() {
            return Err(Error::InvalidDocx("missing w:body".into()));
        }

        let (styles, styles_registered) = match part_text(&parts, STYLES_PART) {
            Some(text) => (Styles::from_element(xml::parse(text?)?), true),
            None => {
                let mut root = XmlElement::new("w:styles");
                root.declare_namespace(Some("w"), WML_NS);
                (Styles::from_element(root), false)
            }
        };

        log::debug!(
            "opened {} ({} parts, {} styles)",
            path.display(),
            parts.len(),
            styles.len()
        );

        Ok(Self {
            parts,
            document,
            styles,
            styles_registered,
        })
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn styles_mut(&mut self) -> &mut Styles {
        &mut self.styles
    }

    pub fn element(&self) -> &XmlElement {
        &self.document
    }

    pub fn element_mut(&mut self) -> &mut XmlElement {
        &mut self.document
    }

    pub fn body(&self) -> Option<&XmlElement> {
        self.document.child(W_BODY)
    }

    pub fn body_mut(&mut self) -> &mut XmlElement {
        self.document.get_or_add(W_BODY)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &XmlElement> {
        self.body()
            .into_iter()
            .flat_map(|body| body.children_named(W_P))
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.body_mut().elements_mut().filter(|e| e.name() == W_P)
    }

    /// Calls `f` with the properties node of every table cell in the body,
    /// creating the node where a cell has none.
    pub fn for_each_cell_properties<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut XmlElement),
    {
        self.body_mut().visit_mut(&mut |el| {
            if el.name() == W_TC {
                f(el.get_or_insert_first(W_TCPR));
            }
        });
    }

    /// Section properties: those ending a section inside a paragraph's
    /// properties, followed by the body's final one.
    pub fn sections(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let Some(body) = self.body() else {
            return out;
        };
        for child in body.elements() {
            if child.name() == W_SECT_PR {
                out.push(child);
            } else if child.name() == W_P
                && let Some(sect) = child.child(W_PPR).and_then(|p| p.child(W_SECT_PR))
            {
                out.push(sect);
            }
        }
        out
    }

    pub fn sections_mut(&mut self) -> Vec<&mut XmlElement> {
        let mut out = Vec::new();
        for child in self.body_mut().elements_mut() {
            if child.name() == W_SECT_PR {
                out.push(child);
            } else if child.name() == W_P
                && let Some(sect) = child.child_mut(W_PPR).and_then(|p| p.child_mut(W_SECT_PR))
            {
                out.push(sect);
            }
        }
        out
    }

    /// Appends an empty paragraph, keeping the body's final `w:sectPr` last.
    pub fn add_paragraph(&mut self) -> &mut XmlElement {
        let body = self.body_mut();
        let trailing_sect = body
            .nodes()
            .iter()
            .rposition(|n| matches!(n, xml::XmlNode::Element(e) if e.name() == W_SECT_PR));
        let ends_with_sect = trailing_sect.is_some_and(|idx| {
            body.nodes()[idx + 1..]
                .iter()
                .all(|n| matches!(n, xml::XmlNode::Text(_)))
        });
        match trailing_sect {
            Some(idx) if ends_with_sect => body.insert(idx, XmlElement::new(W_P)),
            _ => body.append(XmlElement::new(W_P)),
        }
    }

    pub fn paragraph_style_name(&self, paragraph: &XmlElement) -> Option<String> {
        let style_id = paragraph
            .child(W_PPR)
            .and_then(|p| p.child(W_PSTYLE))
            .and_then(|s| s.attr(W_VAL));
        match style_id {
            Some(id) => self.styles.name_for_id(id).map(str::to_string),
            None => self
                .styles
                .default_paragraph()
                .and_then(|s| s.name())
                .map(str::to_string),
        }
    }

    fn register_styles_part(&mut self) -> Result<()> {
        if let Some(text) = part_text(&self.parts, CONTENT_TYPES_PART) {
            let mut types = xml::parse(text?)?;
            let part_name = format!("/{STYLES_PART}");
            if !types
                .children_named("Override")
                .any(|o| o.attr("PartName") == Some(part_name.as_str()))
            {
                types.append(
                    XmlElement::new("Override")
                        .with_attr("PartName", part_name)
                        .with_attr("ContentType", STYLES_CONTENT_TYPE),
                );
            }
            self.replace_part(CONTENT_TYPES_PART, xml::to_bytes(&types)?);
        }

        let mut rels = match part_text(&self.parts, DOCUMENT_RELS_PART) {
            Some(text) => xml::parse(text?)?,
            None => {
                let mut root = XmlElement::new("Relationships");
                root.declare_namespace(None, PKG_REL_NS);
                root
            }
        };
        if !rels
            .children_named("Relationship")
            .any(|r| r.attr("Type") == Some(STYLES_REL_TYPE))
        {
            let mut n = rels.elements().count() + 1;
            while rels
                .elements()
                .any(|r| r.attr("Id") == Some(format!("rId{n}").as_str()))
            {
                n += 1;
            }
            rels.append(
                XmlElement::new("Relationship")
                    .with_attr("Id", format!("rId{n}"))
                    .with_attr("Type", STYLES_REL_TYPE)
                    .with_attr("Target", "styles.xml"),
            );
        }
        self.replace_part(DOCUMENT_RELS_PART, xml::to_bytes(&rels)?);
        self.styles_registered = true;
        Ok(())
    }

    fn replace_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        if !self.styles_registered {
            self.register_styles_part()?;
        }
        self.replace_part(DOCUMENT_PART, xml::to_bytes(&self.document)?);
        self.replace_part(STYLES_PART, xml::to_bytes(&self.styles.to_element())?);

        let file = std::fs::File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        let content_types = self.parts.iter().filter(|(n, _)| n == CONTENT_TYPES_PART);
        let rest = self.parts.iter().filter(|(n, _)| n != CONTENT_TYPES_PART);
        for (name, data) in content_types.chain(rest) {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}

impl Default for DocxDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn blank_document_tree() -> XmlElement {
    let mut root = XmlElement::new("w:document");
    root.declare_namespace(Some("w"), WML_NS);
    root.declare_namespace(Some("r"), REL_NS);
    root.get_or_add(W_BODY).append(XmlElement::new(W_SECT_PR));
    root
}

pub fn paragraph_text(paragraph: &XmlElement) -> String {
    paragraph.descendant_text(W_T)
}

/// Text of the first `limit` paragraphs of a document on disk.
pub fn preview(path: &Path, limit: usize) -> Result<Vec<String>> {
    let doc = DocxDocument::open(path)?;
    Ok(doc.paragraphs().take(limit).map(paragraph_text).collect())
}
