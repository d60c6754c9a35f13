use std::path::Path;

use crate::errors::{AppError, Result};

/// Upload ceiling enforced by the backend.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpeg", "jpg", "pdf", "png"];

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self { file_name, content_type, bytes }
    }

    /// Reads a document from disk, refusing anything the backend would reject.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::ValidationError(format!("Invalid file path: {}", path.display())))?
            .to_string();

        let extension = extension_of(&file_name);
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::ValidationError(
                "Invalid file type. Allowed: .jpeg, .jpg, .pdf, .png".to_string(),
            ));
        }

        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() as usize > MAX_DOCUMENT_BYTES {
            return Err(AppError::ValidationError("File size must be less than 5MB".to_string()));
        }

        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// One of the six attachment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DocumentSlot {
    #[default]
    Empty,
    /// Already held by the backend (editing a rejected submission).
    Stored(String),
    Upload(DocumentFile),
}

impl DocumentSlot {
    pub fn is_present(&self) -> bool {
        !matches!(self, DocumentSlot::Empty)
    }

    pub fn upload(&self) -> Option<&DocumentFile> {
        match self {
            DocumentSlot::Upload(file) => Some(file),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DocumentSlot::Empty => "not provided".to_string(),
            DocumentSlot::Stored(url) => format!("on file ({})", url),
            DocumentSlot::Upload(file) => format!("{} ({} KB)", file.file_name, file.size() / 1024),
        }
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

fn content_type_for(file_name: &str) -> &'static str {
    match extension_of(file_name).as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}
