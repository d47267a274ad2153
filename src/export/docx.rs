//! DOCX export.
//!
//! The document is built from the record alone, never from the selected
//! template: a plain single-column layout with real text, right-aligned dates
//! and native bullets, so it stays editable in any word processor.
//!
//! Building happens in two steps. [`compose`] turns the record into a small
//! paragraph model, which is what the tests look at; [`package`] serialises
//! that model as WordprocessingML and zips it into an OOXML package.

use crate::error::ExportError;
use crate::record::ResumeRecord;
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Right edge of the text area on A4 with the default margins, in twips.
pub const RIGHT_TAB_TWIPS: u32 = 9026;
/// Half an inch on every side, in twips.
pub const PAGE_MARGIN_TWIPS: u32 = 720;

const A4_WIDTH_TWIPS: u32 = 11906;
const A4_HEIGHT_TWIPS: u32 = 16838;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Title,
    Heading2,
    Heading3,
}

impl ParagraphStyle {
    fn id(self) -> &'static str {
        match self {
            ParagraphStyle::Title => "Title",
            ParagraphStyle::Heading2 => "Heading2",
            ParagraphStyle::Heading3 => "Heading3",
        }
    }
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    /// Half-points; `None` inherits the paragraph style.
    pub size: Option<u32>,
    /// Emit a tab before the text, jumping to the right tab stop.
    pub leading_tab: bool,
}

impl Run {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    fn size(mut self, half_points: u32) -> Self {
        self.size = Some(half_points);
        self
    }

    fn after_tab(mut self) -> Self {
        self.leading_tab = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub style: Option<ParagraphStyle>,
    pub runs: Vec<Run>,
    pub centered: bool,
    pub bullet: bool,
    pub right_tab: bool,
    pub bottom_border: bool,
    /// Twips.
    pub space_before: u32,
    /// Twips.
    pub space_after: u32,
}

impl Paragraph {
    fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    fn styled(style: ParagraphStyle, text: &str) -> Self {
        Self {
            style: Some(style),
            ..Self::new(vec![Run::plain(text)])
        }
    }

    fn heading(text: &str, before: u32, after: u32) -> Self {
        Self::styled(ParagraphStyle::Heading3, text).spacing(before, after)
    }

    fn spacing(mut self, before: u32, after: u32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    /// Concatenated text, with tabs shown as `\t`.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| {
                if r.leading_tab {
                    format!("\t{}", r.text)
                } else {
                    r.text.clone()
                }
            })
            .collect()
    }
}

/// Lay the record out as paragraphs.
pub fn compose(record: &ResumeRecord) -> Vec<Paragraph> {
    let mut out = vec![
        Paragraph::styled(ParagraphStyle::Title, &record.full_name)
            .centered()
            .spacing(0, 100),
        Paragraph::styled(ParagraphStyle::Heading2, &record.job_title)
            .centered()
            .spacing(0, 200),
        Paragraph {
            bottom_border: true,
            ..Paragraph::new(vec![Run::plain(record.contact_values().join(" | ")).size(20)])
        }
        .centered()
        .spacing(0, 400),
        Paragraph::heading("PROFESSIONAL SUMMARY", 200, 100),
        Paragraph::new(vec![Run::plain(&record.summary)]).spacing(0, 300),
        Paragraph::heading("SKILLS", 200, 100),
        Paragraph::new(vec![Run::plain(record.skills.join(", "))]).spacing(0, 300),
        Paragraph::heading("EXPERIENCE", 200, 200),
    ];

    for exp in &record.experience {
        out.push(Paragraph {
            right_tab: true,
            ..Paragraph::new(vec![
                Run::plain(&exp.role).bold().size(24),
                Run::plain(&exp.dates).bold().after_tab(),
            ])
            .spacing(100, 0)
        });
        out.push(Paragraph {
            right_tab: true,
            ..Paragraph::new(vec![
                Run::plain(&exp.company).italic(),
                Run::plain(exp.location.as_deref().unwrap_or_default())
                    .italic()
                    .after_tab(),
            ])
            .spacing(0, 100)
        });
        for line in &exp.description {
            out.push(Paragraph {
                bullet: true,
                ..Paragraph::new(vec![Run::plain(line)]).spacing(0, 50)
            });
        }
        out.push(Paragraph::default().spacing(0, 200));
    }

    out.push(Paragraph::heading("EDUCATION", 100, 200));
    for edu in &record.education {
        out.push(Paragraph {
            right_tab: true,
            ..Paragraph::new(vec![
                Run::plain(&edu.school).bold(),
                Run::plain(&edu.dates).after_tab(),
            ])
        });
        out.push(Paragraph::new(vec![Run::plain(&edu.degree).italic()]).spacing(0, 100));
    }

    out
}

/// Build the `.docx` bytes for a record.
pub fn export_docx(record: &ResumeRecord) -> Result<Vec<u8>, ExportError> {
    package(&compose(record))
}

/// Zip the paragraphs into an OOXML package.
pub fn package(paragraphs: &[Paragraph]) -> Result<Vec<u8>, ExportError> {
    let failed = |e: &dyn std::fmt::Display| ExportError::Packaging(e.to_string());

    let document = document_xml(paragraphs);
    let parts: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", ROOT_RELS_XML),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/document.xml", &document),
        ("word/styles.xml", STYLES_XML),
        ("word/numbering.xml", NUMBERING_XML),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options).map_err(|e| failed(&e))?;
        zip.write_all(body.as_bytes()).map_err(|e| failed(&e))?;
    }
    let cursor = zip.finish().map_err(|e| failed(&e))?;
    Ok(cursor.into_inner())
}

fn document_xml(paragraphs: &[Paragraph]) -> String {
    let mut body = String::new();
    for p in paragraphs {
        paragraph_xml(p, &mut body);
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr><w:pgSz w:w="{A4_WIDTH_TWIPS}" w:h="{A4_HEIGHT_TWIPS}"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
        m = PAGE_MARGIN_TWIPS
    )
}

fn paragraph_xml(p: &Paragraph, out: &mut String) {
    out.push_str("<w:p><w:pPr>");
    if let Some(style) = p.style {
        out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style.id()));
    }
    if p.bullet {
        out.push_str(r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr>"#);
    }
    if p.bottom_border {
        out.push_str(
            r#"<w:pBdr><w:bottom w:val="single" w:sz="6" w:space="12" w:color="999999"/></w:pBdr>"#,
        );
    }
    if p.right_tab {
        out.push_str(&format!(
            r#"<w:tabs><w:tab w:val="right" w:pos="{RIGHT_TAB_TWIPS}"/></w:tabs>"#
        ));
    }
    out.push_str(&format!(
        r#"<w:spacing w:before="{}" w:after="{}"/>"#,
        p.space_before, p.space_after
    ));
    if p.centered {
        out.push_str(r#"<w:jc w:val="center"/>"#);
    }
    out.push_str("</w:pPr>");
    for run in &p.runs {
        run_xml(run, out);
    }
    out.push_str("</w:p>");
}

fn run_xml(run: &Run, out: &mut String) {
    out.push_str("<w:r>");
    if run.bold || run.italic || run.size.is_some() {
        out.push_str("<w:rPr>");
        if run.bold {
            out.push_str("<w:b/>");
        }
        if run.italic {
            out.push_str("<w:i/>");
        }
        if let Some(size) = run.size {
            out.push_str(&format!(r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#));
        }
        out.push_str("</w:rPr>");
    }
    if run.leading_tab {
        out.push_str("<w:tab/>");
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape(run.text.as_str()));
    out.push_str("</w:t></w:r>");
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:rPr><w:sz w:val="56"/><w:szCs w:val="56"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:color w:val="2E74B5"/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:color w:val="1F4D78"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style></w:styles>"#;

const NUMBERING_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:multiLevelType w:val="singleLevel"/><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="●"/><w:lvlJc w:val="left"/><w:pPr><w:ind w:left="720" w:hanging="360"/></w:pPr></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{sample, Experience};
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut text = String::new();
        part.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn header_paragraphs() {
        let paragraphs = compose(&sample());
        assert_eq!(paragraphs[0].style, Some(ParagraphStyle::Title));
        assert_eq!(paragraphs[0].text(), "Alex Morgan");
        assert_eq!(paragraphs[1].style, Some(ParagraphStyle::Heading2));
        assert_eq!(
            paragraphs[2].text(),
            "alex.morgan@example.com | (555) 123-4567 | San Francisco, CA | linkedin.com/in/alexmorgan"
        );
        assert!(paragraphs[2].bottom_border);
        assert_eq!(paragraphs[2].runs[0].size, Some(20));
    }

    #[test]
    fn section_headings_in_order() {
        let headings: Vec<String> = compose(&sample())
            .iter()
            .filter(|p| p.style == Some(ParagraphStyle::Heading3))
            .map(Paragraph::text)
            .collect();
        assert_eq!(
            headings,
            ["PROFESSIONAL SUMMARY", "SKILLS", "EXPERIENCE", "EDUCATION"]
        );
    }

    #[test]
    fn skills_are_comma_joined() {
        let record = sample().with_skills(vec!["Rust".into(), "Go".into()]);
        let paragraphs = compose(&record);
        assert!(paragraphs.iter().any(|p| p.text() == "Rust, Go"));
    }

    #[test]
    fn experience_block_layout() {
        let record = sample().with_experience(vec![Experience {
            role: "Dev".into(),
            company: "Acme".into(),
            location: None,
            dates: "2020 - 2022".into(),
            description: vec!["Shipped".into(), "Fixed".into()],
        }]);
        let paragraphs = compose(&record);
        let start = paragraphs
            .iter()
            .position(|p| p.text() == "EXPERIENCE")
            .unwrap();
        let block = &paragraphs[start + 1..start + 6];

        assert_eq!(block[0].text(), "Dev\t2020 - 2022");
        assert!(block[0].right_tab);
        assert!(block[0].runs.iter().all(|r| r.bold));
        assert_eq!(block[0].runs[0].size, Some(24));

        assert_eq!(block[1].text(), "Acme\t");
        assert!(block[1].runs.iter().all(|r| r.italic));

        assert!(block[2].bullet && block[3].bullet);
        assert_eq!(block[3].text(), "Fixed");
        assert!(block[4].runs.is_empty());
        assert_eq!(block[4].space_after, 200);
    }

    #[test]
    fn education_entries() {
        let paragraphs = compose(&sample());
        let n = paragraphs.len();
        assert_eq!(paragraphs[n - 2].text(), "University of Texas at Austin\t2012 - 2016");
        assert!(paragraphs[n - 2].runs[0].bold);
        assert!(!paragraphs[n - 2].runs[1].bold);
        assert_eq!(paragraphs[n - 1].text(), "B.S. Computer Science");
        assert!(paragraphs[n - 1].runs[0].italic);
    }

    #[test]
    fn package_contains_every_part() {
        let bytes = export_docx(&sample()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "[Content_Types].xml",
                "_rels/.rels",
                "word/_rels/document.xml.rels",
                "word/document.xml",
                "word/numbering.xml",
                "word/styles.xml",
            ]
        );
    }

    #[test]
    fn document_text_is_escaped_and_margins_set() {
        let record = sample().with_full_name("Smith & <Jones>");
        let xml = read_part(&export_docx(&record).unwrap(), "word/document.xml");
        assert!(xml.contains("Smith &amp; &lt;Jones&gt;"));
        assert!(xml.contains(r#"w:top="720" w:right="720" w:bottom="720" w:left="720""#));
        assert!(xml.contains(r#"<w:tab w:val="right" w:pos="9026"/>"#));
        assert!(xml.contains("PROFESSIONAL SUMMARY"));
    }
}
