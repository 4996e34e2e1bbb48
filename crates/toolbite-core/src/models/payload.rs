use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A file as received at ingress, before any storage has been allocated for it.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub bytes: Bytes,
    pub original_name: String,
    pub mime_type: String,
}

impl IncomingFile {
    pub fn new(
        bytes: impl Into<Bytes>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            original_name: original_name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension of the original file name, if it has one.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(|ext| ext.to_lowercase())
    }
}

/// Where a payload's bytes live for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Memory,
    File(PathBuf),
}

/// An uploaded artifact owned by exactly one request.
///
/// The bytes stay available in memory even when the payload has been staged to
/// a file, so strategies may use whichever form their engine wants.
#[derive(Debug, Clone)]
pub struct Payload {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub location: StorageLocation,
    bytes: Bytes,
}

impl Payload {
    pub fn in_memory(id: Uuid, file: IncomingFile) -> Self {
        Self::build(id, file, StorageLocation::Memory)
    }

    pub fn staged(id: Uuid, file: IncomingFile, path: PathBuf) -> Self {
        Self::build(id, file, StorageLocation::File(path))
    }

    fn build(id: Uuid, file: IncomingFile, location: StorageLocation) -> Self {
        Self {
            id,
            size_bytes: file.bytes.len() as u64,
            original_name: file.original_name,
            mime_type: file.mime_type,
            location,
            bytes: file.bytes,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Path of the staged copy, `None` for in-memory payloads.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            StorageLocation::File(path) => Some(path),
            StorageLocation::Memory => None,
        }
    }

    pub fn summary(&self) -> PayloadSummary {
        PayloadSummary {
            id: self.id,
            original_name: self.original_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size_bytes,
        }
    }
}

/// Payload metadata that outlives the request's storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadSummary {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}
