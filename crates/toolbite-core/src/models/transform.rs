use super::{IncomingFile, Operation};
use bytes::Bytes;
use std::collections::BTreeMap;

/// Operation-specific string options taken from the request form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOptions(BTreeMap<String, String>);

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for TransformOptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One request for one operation. Consumed by the dispatcher.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub operation: Operation,
    pub file: Option<IncomingFile>,
    pub options: TransformOptions,
}

impl TransformRequest {
    pub fn new(operation: Operation, file: Option<IncomingFile>, options: TransformOptions) -> Self {
        Self {
            operation,
            file,
            options,
        }
    }
}

/// A fully materialized output buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl Artifact {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    Single(Artifact),
    /// One artifact per source page, in page order.
    Sequence(Vec<Artifact>),
}

impl TransformResult {
    pub fn artifact_count(&self) -> usize {
        match self {
            TransformResult::Single(_) => 1,
            TransformResult::Sequence(items) => items.len(),
        }
    }

    pub fn total_bytes(&self) -> usize {
        match self {
            TransformResult::Single(artifact) => artifact.len(),
            TransformResult::Sequence(items) => items.iter().map(Artifact::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_lookup() {
        let options = TransformOptions::new().with("quality", "55");
        assert_eq!(options.get("quality"), Some("55"));
        assert_eq!(options.get("pages"), None);
        assert!(!options.is_empty());
    }

    #[test]
    fn test_result_totals() {
        let result = TransformResult::Sequence(vec![
            Artifact::new(vec![0u8; 3], "image/png"),
            Artifact::new(vec![0u8; 5], "image/png"),
        ]);
        assert_eq!(result.artifact_count(), 2);
        assert_eq!(result.total_bytes(), 8);
    }
}
