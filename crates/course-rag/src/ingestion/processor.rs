//! Ingestion pipeline orchestration: extract, count, normalize

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

use crate::error::{Error, Result};
use crate::types::response::IngestFailure;
use crate::types::{ExtractedDocument, FileType};

use super::legacy::LegacyConverter;
use super::normalize::{normalize, word_count};
use super::parser::{FileParser, RawText};

/// An uploaded file parked on disk until processing finishes.
///
/// The file is deleted when the value is dropped, on success and failure
/// paths alike.
#[derive(Debug)]
pub struct StagedUpload {
    file_name: String,
    path: TempPath,
}

impl StagedUpload {
    /// Write `data` to a fresh temporary file inside `dir`
    pub async fn stage(dir: &Path, file_name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let dir = dir.to_path_buf();

        let path = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
            use std::io::Write;

            let mut file = tempfile::Builder::new()
                .prefix("upload-")
                .tempfile_in(dir)?;
            file.write_all(&data)?;
            file.flush()?;
            Ok(file.into_temp_path())
        })
        .await
        .map_err(|e| Error::internal(format!("Upload staging task failed: {}", e)))??;

        Ok(Self { file_name, path })
    }

    /// Original file name as sent by the client
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Location of the staged bytes
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of processing a batch of uploads
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully processed documents, in upload order
    pub documents: Vec<ExtractedDocument>,
    /// Files that failed, in upload order
    pub failures: Vec<IngestFailure>,
}

/// Turns uploaded files into [`ExtractedDocument`]s
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    legacy: LegacyConverter,
}

impl DocumentProcessor {
    pub fn new(legacy: LegacyConverter) -> Self {
        Self { legacy }
    }

    /// Process one file stored at `path`, named `file_name` by the uploader.
    ///
    /// The format comes from `file_name`'s extension. Unsupported formats are
    /// rejected before the file is read. The word count is taken on the raw
    /// extracted text, before normalization.
    pub async fn process_file(&self, path: &Path, file_name: &str) -> Result<ExtractedDocument> {
        let file_type = FileType::from_file_name(file_name).ok_or_else(|| {
            let ext = Path::new(file_name)
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            Error::UnsupportedFormat(if ext.is_empty() {
                format!("'{}' has no extension", file_name)
            } else {
                ext
            })
        })?;

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::extraction(file_name, format!("failed to read upload: {}", e)))?;

        tracing::info!("Processing file: {} ({} bytes, {})", file_name, data.len(), file_type);

        let raw = self.extract(file_type, file_name, data).await?;
        let words = word_count(&raw.text);
        let text = normalize(&raw.text);

        Ok(ExtractedDocument {
            content_hash: hash_content(&text),
            text,
            word_count: words,
            file_name: file_name.to_string(),
            file_type,
            processed_at: Utc::now(),
            page_count: raw.page_count,
        })
    }

    /// Process every staged upload, isolating per-file failures.
    ///
    /// Each staged file is removed as soon as its processing ends.
    pub async fn process_multiple_files(&self, uploads: Vec<StagedUpload>) -> BatchOutcome {
        let results = futures::future::join_all(uploads.into_iter().map(|upload| async move {
            let result = self.process_file(upload.path(), upload.file_name()).await;
            (upload.file_name().to_string(), result)
        }))
        .await;

        let mut outcome = BatchOutcome::default();
        for (file_name, result) in results {
            match result {
                Ok(doc) => outcome.documents.push(doc),
                Err(e) => {
                    tracing::warn!("Skipping '{}': {}", file_name, e);
                    outcome.failures.push(IngestFailure {
                        file_name,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Batch processed: {} documents, {} failures",
            outcome.documents.len(),
            outcome.failures.len()
        );

        outcome
    }

    async fn extract(&self, file_type: FileType, file_name: &str, data: Vec<u8>) -> Result<RawText> {
        let data = if file_type == FileType::Doc && !FileParser::is_ooxml(&data) {
            tracing::info!("Converting legacy format: {}", file_name);
            self.legacy.convert_doc(file_name, &data).await?
        } else {
            data
        };

        let name = file_name.to_string();
        let parse_type = if file_type == FileType::Doc {
            FileType::Docx
        } else {
            file_type
        };

        // Parsers can panic on hostile input; contain that to this file
        tokio::task::spawn_blocking(move || FileParser::extract(parse_type, &name, &data))
            .await
            .map_err(|e| Error::extraction(file_name, format!("parser aborted: {}", e)))?
    }
}

/// Default staging directory for uploads
pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Hash content for change detection
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LegacyConfig;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(LegacyConverter::new(LegacyConfig::default()))
    }

    #[tokio::test]
    async fn test_process_txt() {
        let dir = tempfile::tempdir().unwrap();
        let raw = "Cells   divide\n\n\n\nby mitosis.  ";
        let upload = StagedUpload::stage(dir.path(), "bio.txt", raw.as_bytes().to_vec())
            .await
            .unwrap();

        let doc = processor()
            .process_file(upload.path(), upload.file_name())
            .await
            .unwrap();

        assert_eq!(doc.file_type, FileType::Txt);
        assert_eq!(doc.file_name, "bio.txt");
        assert_eq!(doc.word_count, 4);
        assert_eq!(doc.word_count, word_count(raw));
        assert_eq!(doc.text, "Cells divide\n\nby mitosis.");
        assert_eq!(doc.content_hash.len(), 64);
    }

    #[tokio::test]
    async fn test_process_html() {
        let dir = tempfile::tempdir().unwrap();
        let html = b"<html><body><p>One two</p><script>three()</script><p>four</p></body></html>";
        let upload = StagedUpload::stage(dir.path(), "lesson.html", html.to_vec())
            .await
            .unwrap();

        let doc = processor()
            .process_file(upload.path(), upload.file_name())
            .await
            .unwrap();

        assert_eq!(doc.file_type, FileType::Html);
        assert_eq!(doc.word_count, 3);
        assert_eq!(doc.text, "One two four");
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let docx = paragraphs.iter().fold(docx_rs::Docx::new(), |docx, text| {
            docx.add_paragraph(docx_rs::Paragraph::new().add_run(docx_rs::Run::new().add_text(*text)))
        });
        let mut buffer = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        buffer.into_inner()
    }

    /// One page showing `text` in a standard font
    fn pdf_bytes(text: &str) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_process_docx_and_ooxml_doc() {
        let dir = tempfile::tempdir().unwrap();
        let data = docx_bytes(&["Cells divide by mitosis.", "Daughter cells are identical."]);

        for (name, file_type) in [("lecture.docx", FileType::Docx), ("lecture.doc", FileType::Doc)] {
            let upload = StagedUpload::stage(dir.path(), name, data.clone()).await.unwrap();
            let doc = processor()
                .process_file(upload.path(), upload.file_name())
                .await
                .unwrap();

            assert_eq!(doc.file_type, file_type);
            assert_eq!(doc.file_name, name);
            assert_eq!(doc.word_count, 8);
            assert_eq!(doc.text, "Cells divide by mitosis. Daughter cells are identical.");
            assert_eq!(doc.page_count, None);
        }
    }

    #[tokio::test]
    async fn test_process_pdf_counts_pages_and_words() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::stage(dir.path(), "slides.pdf", pdf_bytes("Cells divide by mitosis"))
            .await
            .unwrap();

        let doc = processor()
            .process_file(upload.path(), upload.file_name())
            .await
            .unwrap();

        assert_eq!(doc.file_type, FileType::Pdf);
        assert_eq!(doc.page_count, Some(1));
        assert_eq!(doc.word_count, 4);
        assert!(doc.text.contains("mitosis"));
    }

    #[tokio::test]
    async fn test_unsupported_format_does_not_read_file() {
        let missing = Path::new("/nonexistent/dir/slides.pptx");
        let err = processor().process_file(missing, "slides.pptx").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == "pptx"));

        let err = processor().process_file(missing, "Makefile").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_staged_upload_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StagedUpload::stage(dir.path(), "a.txt", b"hello".to_vec())
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = vec![
            StagedUpload::stage(dir.path(), "good.txt", b"alpha beta".to_vec())
                .await
                .unwrap(),
            StagedUpload::stage(dir.path(), "bad.pdf", b"not a pdf".to_vec())
                .await
                .unwrap(),
            StagedUpload::stage(dir.path(), "sheet.xlsx", b"zip".to_vec())
                .await
                .unwrap(),
            StagedUpload::stage(dir.path(), "also-good.txt", b"gamma".to_vec())
                .await
                .unwrap(),
        ];

        let outcome = processor().process_multiple_files(uploads).await;

        let names: Vec<_> = outcome.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["good.txt", "also-good.txt"]);
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(failed, vec!["bad.pdf", "sheet.xlsx"]);

        let leftover = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftover, 0);
    }
}
