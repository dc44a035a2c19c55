//! Document metadata sidecar.

use super::QueryConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// Sidecar uploaded next to a document, naming the questions to ask.
///
/// ```json
/// {"query": {"policy": {"Text": "What is the policy number?"}}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Questions keyed by alias
    #[serde(default)]
    pub query: BTreeMap<String, QuerySpec>,
}

/// One configured question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// The question
    #[serde(rename = "Text")]
    pub text: String,
}

impl DocumentMetadata {
    /// Parse sidecar JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Metadata(e.to_string()))
    }

    /// Build the query configuration for an analysis request.
    pub fn queries_config(&self) -> Vec<QueryConfig> {
        self.query
            .iter()
            .map(|(alias, spec)| QueryConfig {
                text: spec.text.clone(),
                alias: alias.clone(),
                pages: vec!["*".to_string()],
            })
            .collect()
    }
}

/// Source of document metadata.
pub trait MetadataProvider: Send + Sync {
    /// Fetch and parse the sidecar stored at `key` in `bucket`.
    fn fetch_metadata(&self, bucket: &str, key: &str) -> Result<DocumentMetadata>;
}

/// Key of the sidecar for a document: `.pdf` removed, `/metadata.json` appended.
pub fn metadata_key(object_key: &str) -> String {
    format!("{}/metadata.json", object_key.replace(".pdf", ""))
}

/// Reads sidecars from `<root>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct DirectoryMetadata {
    root: PathBuf,
}

impl DirectoryMetadata {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetadataProvider for DirectoryMetadata {
    fn fetch_metadata(&self, bucket: &str, key: &str) -> Result<DocumentMetadata> {
        let path = self.root.join(bucket).join(key);
        let json = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                Error::Metadata(format!("no metadata at {}", path.display()))
            }
            _ => Error::Io(e),
        })?;
        DocumentMetadata::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_metadata_key() {
        assert_eq!(metadata_key("claims/form.pdf"), "claims/form/metadata.json");
        assert_eq!(metadata_key("scan.png"), "scan.png/metadata.json");
    }

    #[test]
    fn test_queries_config() {
        let metadata = DocumentMetadata::from_json(
            r#"{"query": {"zip": {"Text": "Zip code?"}, "name": {"Text": "Full name?"}}}"#,
        )
        .unwrap();

        let config = metadata.queries_config();
        assert_eq!(config.len(), 2);
        assert_eq!(config[0].alias, "name");
        assert_eq!(config[0].text, "Full name?");
        assert_eq!(config[0].pages, vec!["*"]);
    }

    #[test]
    fn test_metadata_without_queries() {
        let metadata = DocumentMetadata::from_json("{}").unwrap();
        assert!(metadata.queries_config().is_empty());
    }

    #[test]
    fn test_malformed_metadata() {
        let result = DocumentMetadata::from_json(r#"{"query": {"a": {}}}"#);
        assert!(matches!(result, Err(Error::Metadata(_))));
    }

    #[test]
    fn test_directory_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta").join("doc");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(
            path.join("metadata.json"),
            r#"{"query": {"q": {"Text": "Total?"}}}"#,
        )
        .unwrap();

        let provider = DirectoryMetadata::new(dir.path());
        let metadata = provider.fetch_metadata("meta", "doc/metadata.json").unwrap();
        assert_eq!(metadata.query["q"].text, "Total?");

        let missing = provider.fetch_metadata("meta", "other/metadata.json");
        assert!(matches!(missing, Err(Error::Metadata(_))));
    }
}
