//! Format-specific text extraction

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{Error, Result};
use crate::types::FileType;

/// Elements whose text never reaches the extracted output
const SKIPPED_HTML_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Elements that separate words even without whitespace in the source
const BLOCK_HTML_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Raw text pulled out of a file, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawText {
    /// Extracted text
    pub text: String,
    /// Total pages (if applicable)
    pub page_count: Option<u32>,
}

impl RawText {
    fn plain(text: String) -> Self {
        Self {
            text,
            page_count: None,
        }
    }
}

/// Stateless extraction adapters, one per supported format
pub struct FileParser;

impl FileParser {
    /// Extract raw text from `data` according to `file_type`.
    ///
    /// Binary `.doc` files are not handled here; they must be converted to
    /// OOXML first (see [`super::legacy::LegacyConverter`]). A `.doc` upload
    /// that is already an OOXML package is read as `.docx`.
    pub fn extract(file_type: FileType, file_name: &str, data: &[u8]) -> Result<RawText> {
        match file_type {
            FileType::Pdf => Self::parse_pdf(file_name, data),
            FileType::Docx => Self::parse_docx(file_name, data),
            FileType::Doc if Self::is_ooxml(data) => Self::parse_docx(file_name, data),
            FileType::Doc => Err(Error::extraction(
                file_name,
                "binary Word document requires conversion",
            )),
            FileType::Txt => Self::parse_text(file_name, data),
            FileType::Html => Ok(Self::parse_html(data)),
        }
    }

    /// True when `data` is a zip container (OOXML package)
    pub fn is_ooxml(data: &[u8]) -> bool {
        data.starts_with(b"PK\x03\x04")
    }

    /// Parse PDF document
    fn parse_pdf(file_name: &str, data: &[u8]) -> Result<RawText> {
        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extraction(file_name, e.to_string()))?;

        let page_count = match lopdf::Document::load_mem(data) {
            Ok(doc) => Some(doc.get_pages().len() as u32),
            Err(e) => {
                tracing::debug!("Could not count pages of '{}': {}", file_name, e);
                None
            }
        };

        Ok(RawText { text, page_count })
    }

    /// Parse DOCX document
    fn parse_docx(file_name: &str, data: &[u8]) -> Result<RawText> {
        let doc = docx_rs::read_docx(data)
            .map_err(|e| Error::extraction(file_name, e.to_string()))?;

        let mut text = String::new();

        for child in doc.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    push_paragraph(&mut text, &p.children);
                }
                docx_rs::DocumentChild::Table(table) => {
                    for row in &table.rows {
                        #[allow(irrefutable_let_patterns)]
                        let docx_rs::TableChild::TableRow(row) = row else {
                            continue;
                        };
                        for cell in &row.cells {
                            #[allow(irrefutable_let_patterns)]
                            let docx_rs::TableRowChild::TableCell(cell) = cell else {
                                continue;
                            };
                            for content in &cell.children {
                                if let docx_rs::TableCellContent::Paragraph(p) = content {
                                    push_paragraph(&mut text, &p.children);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(RawText::plain(text))
    }

    /// Parse plain text; the bytes must be valid UTF-8
    fn parse_text(file_name: &str, data: &[u8]) -> Result<RawText> {
        let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
        let text = std::str::from_utf8(data)
            .map_err(|e| Error::extraction(file_name, format!("invalid UTF-8: {}", e)))?;
        Ok(RawText::plain(text.to_string()))
    }

    /// Parse HTML document, dropping script and style content
    fn parse_html(data: &[u8]) -> RawText {
        let html = String::from_utf8_lossy(data);
        let document = Html::parse_document(&html);

        let root = Selector::parse("body")
            .ok()
            .and_then(|selector| document.select(&selector).next())
            .unwrap_or_else(|| document.root_element());

        let mut text = String::new();
        collect_html_text(root, &mut text);
        RawText::plain(text)
    }
}

fn push_paragraph(out: &mut String, children: &[docx_rs::ParagraphChild]) {
    for child in children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for child in &run.children {
                match child {
                    docx_rs::RunChild::Text(t) => out.push_str(&t.text),
                    docx_rs::RunChild::Tab(_) => out.push('\t'),
                    docx_rs::RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out.push('\n');
}

/// Text nodes are copied as-is so inline markup never splits a word;
/// block elements get a separating space on both sides.
fn collect_html_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&**text),
            Node::Element(el) if SKIPPED_HTML_ELEMENTS.contains(&el.name()) => {}
            Node::Element(el) => {
                let block = BLOCK_HTML_ELEMENTS.contains(&el.name());
                if block {
                    separate_words(out);
                }
                if let Some(child) = ElementRef::wrap(child) {
                    collect_html_text(child, out);
                }
                if block {
                    separate_words(out);
                }
            }
            _ => {}
        }
    }
}

fn separate_words(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}
