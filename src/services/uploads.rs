//! Upload batches, bounded locally before any extraction request

use std::path::Path;

use crate::config::UploadLimits;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("no documents to upload")]
    Empty,
    #[error("too many documents: {count} (maximum {max})")]
    TooManyFiles { count: usize, max: usize },
    #[error("documents too large: {total} bytes (maximum {max} bytes)")]
    TooLarge { total: u64, max: u64 },
    #[error("cannot read {path}: {reason}")]
    Read { path: String, reason: String },
}

/// One document destined for the extraction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDocument {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), content_type: None, bytes }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a document from disk, guessing the content type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| UploadError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_for);
        Ok(Self { name, content_type: content_type.map(str::to_string), bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some("application/pdf"),
        "csv" => Some("text/csv"),
        "txt" | "las" => Some("text/plain"),
        "json" => Some("application/json"),
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "xls" => Some("application/vnd.ms-excel"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

/// A document set that passed the local limits.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    documents: Vec<UploadDocument>,
}

impl UploadBatch {
    pub fn new(documents: Vec<UploadDocument>, limits: &UploadLimits) -> Result<Self, UploadError> {
        if documents.is_empty() {
            return Err(UploadError::Empty);
        }
        if documents.len() > limits.max_files {
            return Err(UploadError::TooManyFiles {
                count: documents.len(),
                max: limits.max_files,
            });
        }
        let total: u64 = documents.iter().map(UploadDocument::size).sum();
        if total > limits.max_total_bytes {
            return Err(UploadError::TooLarge { total, max: limits.max_total_bytes });
        }
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &[UploadDocument] {
        &self.documents
    }

    pub fn total_bytes(&self) -> u64 {
        self.documents.iter().map(UploadDocument::size).sum()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(size: usize) -> UploadDocument {
        UploadDocument::new("report.pdf", vec![0u8; size])
    }

    #[test]
    fn accepts_within_limits() {
        let limits = UploadLimits::default();
        let batch = UploadBatch::new(vec![doc(1024); 5], &limits).unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.total_bytes(), 5 * 1024);
    }

    #[test]
    fn rejects_sixth_file() {
        let err = UploadBatch::new(vec![doc(1); 6], &UploadLimits::default()).unwrap_err();
        assert_eq!(err, UploadError::TooManyFiles { count: 6, max: 5 });
    }

    #[test]
    fn rejects_combined_size_over_limit() {
        let limits = UploadLimits { max_files: 5, max_total_bytes: 100 };
        assert!(UploadBatch::new(vec![doc(50), doc(50)], &limits).is_ok());
        let err = UploadBatch::new(vec![doc(50), doc(51)], &limits).unwrap_err();
        assert_eq!(err, UploadError::TooLarge { total: 101, max: 100 });
    }

    #[test]
    fn rejects_empty_batch() {
        assert_eq!(
            UploadBatch::new(Vec::new(), &UploadLimits::default()).unwrap_err(),
            UploadError::Empty
        );
    }

    #[tokio::test]
    async fn reads_document_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DDR_0412.PDF");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let doc = UploadDocument::from_path(&path).await.unwrap();
        assert_eq!(doc.name, "DDR_0412.PDF");
        assert_eq!(doc.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(doc.size(), 8);

        let missing = UploadDocument::from_path(&dir.path().join("nope.pdf")).await;
        assert!(matches!(missing, Err(UploadError::Read { .. })));
    }
}
