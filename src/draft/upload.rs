//! Selected files, upload policy and previews
//!
//! Files picked for an attachment slot are held in memory until submission.
//! `UploadPolicy` is the allow-list gate applied at selection time.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::AttachmentRejected;

/// Default size cap for a single attachment (5 MiB)
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// A file chosen by the user but not yet sent to the server
#[derive(Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PendingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read attachment file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("Attachment path has no file name: {}", path.display()))?;
        let content_type = guess_content_type(&file_name).to_string();

        Ok(Self::new(file_name, content_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Lower-cased extension, if the file name has one
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }

    pub fn is_image(&self) -> bool {
        self.content_type.to_lowercase().starts_with("image/")
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Map a file name to the content type the portal expects for it
pub fn guess_content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// What the wizard shows for a selected file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preview {
    /// Inline image (`data:<type>;base64,...`)
    DataUri(String),
    /// Non-image file, rendered as an icon
    Icon(FileIcon),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileIcon {
    Pdf,
    Document,
    Spreadsheet,
    Generic,
}

impl Preview {
    pub fn derive(file: &PendingFile) -> Self {
        if file.is_image() {
            return Preview::DataUri(format!("data:{};base64,{}", file.content_type, file.to_base64()));
        }

        let icon = match file.extension().as_deref() {
            Some("pdf") => FileIcon::Pdf,
            Some("doc") | Some("docx") | Some("txt") => FileIcon::Document,
            Some("xls") | Some("xlsx") => FileIcon::Spreadsheet,
            _ => FileIcon::Generic,
        };
        Preview::Icon(icon)
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Preview::DataUri(_))
    }
}

/// Size and type allow-list applied when a file is selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: ["pdf", "jpg", "jpeg", "png", "doc", "docx"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            allowed_content_types: [
                "application/pdf",
                "image/jpeg",
                "image/png",
                "application/msword",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }
}

impl UploadPolicy {
    pub fn new(max_file_size: usize, allowed_extensions: Vec<String>, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions.into_iter().map(|e| e.to_lowercase()).collect(),
            allowed_content_types: allowed_content_types.into_iter().map(|c| c.to_lowercase()).collect(),
        }
    }

    /// Check a file against the size cap and both allow-lists
    pub fn validate(&self, file: &PendingFile) -> Result<(), AttachmentRejected> {
        if file.size() == 0 {
            return Err(AttachmentRejected::EmptyFile {
                file_name: file.file_name.clone(),
            });
        }

        if file.size() > self.max_file_size {
            return Err(AttachmentRejected::TooLarge {
                file_name: file.file_name.clone(),
                size: file.size(),
                max: self.max_file_size,
            });
        }

        let extension = file.extension().unwrap_or_default();
        if !self.allowed_extensions.iter().any(|e| e == &extension) {
            return Err(AttachmentRejected::DisallowedExtension {
                file_name: file.file_name.clone(),
                extension,
            });
        }

        let content_type = file.content_type.to_lowercase();
        if !self.allowed_content_types.iter().any(|c| c == &content_type) {
            return Err(AttachmentRejected::DisallowedContentType {
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
            });
        }

        Ok(())
    }
}
