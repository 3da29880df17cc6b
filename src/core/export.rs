//! Output sinks for a finished document: a file on disk or the clipboard.

use super::CoreError;
use std::fs;
use std::path::Path;

/// Writes `document` to `path` as UTF-8, byte for byte, with no framing.
pub fn save_document(path: &Path, document: &str) -> Result<(), CoreError> {
    fs::write(path, document).map_err(|e| CoreError::OutputWrite {
        target: path.display().to_string(),
        source: Box::new(e),
    })?;
    tracing::info!("Saved {} bytes to {}", document.len(), path.display());
    Ok(())
}

/// Defines a common interface for placing plain text on a clipboard.
/// This allows for a mock implementation during tests, avoiding the need
/// to talk to the system clipboard.
pub trait ClipboardSink {
    fn set_text(&self, text: &str) -> Result<(), CoreError>;
}

/// The production implementation backed by the `arboard` crate.
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), CoreError> {
        let to_error = |e: arboard::Error| CoreError::OutputWrite {
            target: "clipboard".to_string(),
            source: Box::new(e),
        };
        let mut clipboard = arboard::Clipboard::new().map_err(to_error)?;
        clipboard.set_text(text.to_owned()).map_err(to_error)?;
        tracing::info!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_document_writes_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let document = "####\n\nÄrger\r\nno trailing newline";

        save_document(&path, document).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), document);
    }

    #[test]
    fn test_save_document_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old content that is longer").unwrap();

        save_document(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_save_document_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.txt");

        let err = save_document(&path, "text").unwrap_err();
        match err {
            CoreError::OutputWrite { target, .. } => assert!(target.ends_with("out.txt")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
