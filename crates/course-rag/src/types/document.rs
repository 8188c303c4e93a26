//! Extracted document and chunk types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Legacy Microsoft Word document (.doc)
    Doc,
    /// Plain text file
    Txt,
    /// HTML document
    Html,
}

impl FileType {
    /// All supported formats, in the order they are advertised
    pub const ALL: [FileType; 5] = [
        FileType::Pdf,
        FileType::Docx,
        FileType::Doc,
        FileType::Txt,
        FileType::Html,
    ];

    /// Detect file type from a bare extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Txt),
            "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Detect file type from a file name's extension
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Txt => "txt",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Text and metadata extracted from one uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    /// Normalized text
    pub text: String,
    /// Whitespace-delimited tokens in the raw extracted text
    pub word_count: usize,
    /// Original upload name
    pub file_name: String,
    /// Detected format
    pub file_type: FileType,
    /// When extraction finished
    pub processed_at: DateTime<Utc>,
    /// SHA-256 of the normalized text
    pub content_hash: String,
    /// Page count, for paginated formats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl ExtractedDocument {
    /// Metadata written back to the owning course
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            file_name: self.file_name.clone(),
            file_type: self.file_type,
            word_count: self.word_count,
            processed_at: self.processed_at,
            content_hash: self.content_hash.clone(),
            page_count: self.page_count,
        }
    }
}

/// Per-document metadata kept on a course record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_type: FileType,
    pub word_count: usize,
    pub processed_at: DateTime<Utc>,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// A window of course text stored in a course index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub content: String,
    pub course_id: String,
}

impl Chunk {
    pub fn new(content: impl Into<String>, course_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            course_id: course_id.into(),
        }
    }
}
