use super::{AggregationResult, CoreError, ReadFailure};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed-width delimiter written before and after every file block.
pub const SEPARATOR: &str = "##################################################";

/// Concatenates files into one delimited document.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Reads `paths` in order and joins their contents.
    ///
    /// The document opens with [`SEPARATOR`]; each readable file then adds
    /// a blank line, a `#### <name>:` header, a blank line, its raw content,
    /// a blank line and the separator again. Files that cannot be read are
    /// listed in `errors` and leave no trace in the document.
    ///
    /// An empty `paths` yields a document that is just the separator. Callers
    /// that treat "nothing selected" as "everything" must expand the
    /// selection before calling this.
    pub fn aggregate<P: AsRef<Path>>(paths: &[P]) -> AggregationResult {
        let mut document = String::from(SEPARATOR);
        let mut errors = Vec::new();

        for path in paths {
            let path = path.as_ref();
            match FileHandler::read_text(path) {
                Ok(content) => {
                    tracing::debug!("Appending {} ({} bytes)", path.display(), content.len());
                    Self::push_block(&mut document, &FileHandler::base_name(path), &content);
                }
                Err(e) => {
                    tracing::warn!("Skipping file during aggregation: {}", e);
                    errors.push(ReadFailure::from_error(path, &e));
                }
            }
        }

        tracing::info!(
            "Aggregated {} of {} files ({} failed)",
            paths.len() - errors.len(),
            paths.len(),
            errors.len()
        );
        AggregationResult { document, errors }
    }

    fn push_block(document: &mut String, name: &str, content: &str) {
        document.push_str("\n\n#### ");
        document.push_str(name);
        document.push_str(":\n\n");
        document.push_str(content);
        document.push_str("\n\n");
        document.push_str(SEPARATOR);
    }
}

/// Single-file reads shared by aggregation and preview.
pub struct FileHandler;

impl FileHandler {
    /// Reads a whole file as UTF-8. Invalid UTF-8 surfaces as a
    /// `FileRead` error with an `InvalidData` source.
    pub fn read_text(path: &Path) -> Result<String, CoreError> {
        fs::read_to_string(path).map_err(|source| CoreError::FileRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full content of one file for display.
    pub fn read_preview(path: &Path) -> Result<String, CoreError> {
        if path.is_dir() {
            return Err(CoreError::FileRead {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path is a directory",
                ),
            });
        }
        Self::read_text(path)
    }

    pub fn base_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Absolute paths of `entries`, in order.
pub fn entry_paths<'a, I>(entries: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = &'a super::FileEntry>,
{
    entries
        .into_iter()
        .map(|entry| entry.absolute_path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tracing_test::traced_test;

    fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_document_format_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", b"alpha");
        let b = write(dir.path(), "b.log", b"line one\nline two\n");

        let result = AggregationEngine::aggregate(&[a, b]);
        let sep = "#".repeat(50);
        let expected = format!(
            "{sep}\n\n#### a.txt:\n\nalpha\n\n{sep}\n\n#### b.log:\n\nline one\nline two\n\n\n{sep}"
        );
        assert_eq!(result.document, expected);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_separator_is_fifty_hashes() {
        assert_eq!(SEPARATOR.len(), 50);
        assert!(SEPARATOR.chars().all(|c| c == '#'));
    }

    #[test]
    fn test_empty_input_yields_only_leading_separator() {
        let result = AggregationEngine::aggregate::<PathBuf>(&[]);
        assert_eq!(result.document, SEPARATOR);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_blocks_follow_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", b"AAA");
        let b = write(dir.path(), "b.txt", b"BBB");
        let c = write(dir.path(), "c.txt", b"CCC");

        let doc = AggregationEngine::aggregate(&[c.clone(), a.clone(), b.clone()]).document;
        let pos = |s: &str| doc.find(s).unwrap();
        assert!(pos("#### c.txt:") < pos("#### a.txt:"));
        assert!(pos("#### a.txt:") < pos("#### b.txt:"));
        assert!(pos("CCC") < pos("AAA") && pos("AAA") < pos("BBB"));
    }

    #[traced_test]
    #[test]
    fn test_missing_file_is_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", b"first");
        let missing = dir.path().join("missing.txt");
        let c = write(dir.path(), "c.txt", b"third");

        let result = AggregationEngine::aggregate(&[a, missing.clone(), c]);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, missing);
        assert!(result.document.contains("#### a.txt:"));
        assert!(result.document.contains("#### c.txt:"));
        assert!(!result.document.contains("missing.txt"));
        assert_eq!(result.document.matches(SEPARATOR).count(), 3);
        assert!(logs_contain("Skipping file during aggregation"));
    }

    #[test]
    fn test_invalid_utf8_is_a_per_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = write(dir.path(), "blob.bin", &[0xff, 0xfe, 0x00, 0x80]);
        let ok = write(dir.path(), "ok.txt", b"fine");

        let result = AggregationEngine::aggregate(&[bin.clone(), ok]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path, bin);
        assert!(result.document.contains("fine"));
        assert!(!result.document.contains("blob.bin"));
    }

    #[test]
    fn test_directory_in_input_is_an_error_not_an_abort() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write(dir.path(), "ok.txt", b"fine");
        let result = AggregationEngine::aggregate(&[dir.path().to_path_buf(), ok]);
        assert_eq!(result.errors.len(), 1);
        assert!(result.document.contains("#### ok.txt:"));
    }

    #[test]
    fn test_read_preview_returns_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "notes.txt", b"one\ntwo\nthree");
        assert_eq!(FileHandler::read_preview(&path).unwrap(), "one\ntwo\nthree");
        assert!(matches!(
            FileHandler::read_preview(dir.path()),
            Err(CoreError::FileRead { .. })
        ));
    }
}
