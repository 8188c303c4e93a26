//! Binary Word (.doc) conversion through headless LibreOffice

use std::path::Path;
use tokio::process::Command;

use crate::config::LegacyConfig;
use crate::error::{Error, Result};

/// Converts legacy `.doc` files into `.docx` bytes
#[derive(Debug, Clone)]
pub struct LegacyConverter {
    config: LegacyConfig,
}

impl LegacyConverter {
    pub fn new(config: LegacyConfig) -> Self {
        Self { config }
    }

    /// Check if conversion is enabled
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Convert a binary `.doc` to `.docx`.
    ///
    /// Works in a scratch directory that is removed when this returns,
    /// whether conversion succeeded or not.
    pub async fn convert_doc(&self, file_name: &str, data: &[u8]) -> Result<Vec<u8>> {
        if !self.config.enabled {
            return Err(Error::extraction(
                file_name,
                "legacy .doc conversion is disabled",
            ));
        }

        let scratch = tempfile::Builder::new()
            .prefix("course-rag-doc-")
            .tempdir()
            .map_err(|e| Error::extraction(file_name, format!("scratch dir: {}", e)))?;

        let input_path = scratch.path().join("input.doc");
        tokio::fs::write(&input_path, data)
            .await
            .map_err(|e| Error::extraction(file_name, format!("write scratch file: {}", e)))?;

        let output = Command::new(&self.config.libreoffice_binary)
            .arg("--headless")
            .arg("--convert-to")
            .arg("docx")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(&input_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::extraction(
                    file_name,
                    format!("failed to run {}: {}", self.config.libreoffice_binary, e),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(
                file_name,
                format!("LibreOffice conversion failed: {}", stderr.trim()),
            ));
        }

        let converted = read_converted(scratch.path()).await;
        converted.map_err(|e| Error::extraction(file_name, format!("read converted file: {}", e)))
    }
}

async fn read_converted(dir: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(dir.join("input.docx")).await
}
