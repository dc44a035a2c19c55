//! Export destinations.

use crate::error::Result;
use std::path::PathBuf;

/// Destination for rendered exports.
pub trait OutputSink: Send + Sync {
    /// Store `body` under `key` in `bucket`.
    fn put(&self, bucket: &str, key: &str, body: &[u8], content_type: &str) -> Result<()>;
}

/// Key of the export for a document: `<stem>/<stem>_output.csv`.
///
/// The stem is the file name up to its first `.`.
pub fn output_key(object_key: &str) -> String {
    let name = object_key.rsplit('/').next().unwrap_or(object_key);
    let stem = name.split('.').next().unwrap_or(name);
    format!("{stem}/{stem}_output.csv")
}

/// Writes exports to `<root>/<bucket>/<key>`, creating directories as needed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path an export would be written to.
    pub fn path_for(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl OutputSink for DirectorySink {
    fn put(&self, bucket: &str, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        let path = self.path_for(bucket, key);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, body)?;
        log::debug!(
            "Wrote {} bytes ({}) to {}",
            body.len(),
            content_type,
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_key() {
        assert_eq!(output_key("uploads/claim.pdf"), "claim/claim_output.csv");
        assert_eq!(output_key("claim.v2.pdf"), "claim/claim_output.csv");
        assert_eq!(output_key("noext"), "noext/noext_output.csv");
    }

    #[test]
    fn test_directory_sink_writes() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());

        sink.put("out", "a/a_output.csv", b"hello", "text/csv").unwrap();

        let written = std::fs::read(sink.path_for("out", "a/a_output.csv")).unwrap();
        assert_eq!(written, b"hello");
    }
}
