//! Persisted form of a chapter and the stores that hold it.
//!
//! A chapter is stored as one JSON document, rewritten in full on every save.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info};

use crate::chapter::Chapter;
use crate::defaults::Factory;
use crate::error::QwResult;

/// Parse a chapter from its persisted form.
///
/// An empty `options` list on an ending is read as no options at all.
pub fn parse(bytes: &[u8]) -> QwResult<Chapter> {
    let mut chapter: Chapter = serde_json::from_slice(bytes)?;
    for branch in chapter.branches.iter_mut().filter(|b| b.is_endings()) {
        for segment in &mut branch.segments {
            if segment.options.as_ref().is_some_and(Vec::is_empty) {
                segment.options = None;
            }
        }
    }
    Ok(chapter)
}

/// Parse a chapter, or generate a default one when `bytes` holds nothing but
/// whitespace.
///
/// Returns whether the chapter was generated.
pub fn load(bytes: &[u8], factory: &mut Factory) -> QwResult<(Chapter, bool)> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("empty input, generating default chapter");
        return Ok((factory.chapter(), true));
    }
    Ok((parse(bytes)?, false))
}

/// Serialize a chapter with `indent` spaces per level.
///
/// Field order is fixed, non-ASCII text is written as-is and there is no
/// trailing newline.
pub fn save(chapter: &Chapter, indent: usize) -> QwResult<Vec<u8>> {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    chapter.serialize(&mut serializer)?;
    Ok(out)
}

/// A backing store for one chapter document.
pub trait Storage {
    /// Read the entire stored document. An empty store yields no bytes.
    fn read_all(&mut self) -> QwResult<Vec<u8>>;

    /// Replace the stored document with `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> QwResult<()>;
}

/// A chapter file, held open for reading and writing.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: File,
}

impl FileStorage {
    /// Open `path`, creating an empty file if it does not exist.
    pub fn open(path: impl AsRef<Path>) -> QwResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        Ok(Self { path, file })
    }

    /// The file's path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read_all(&mut self) -> QwResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn write_all(&mut self, bytes: &[u8]) -> QwResult<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.set_len(bytes.len() as u64)?;
        self.file.flush()?;
        info!(path = %self.path.display(), bytes = bytes.len(), "wrote chapter file");
        Ok(())
    }
}

/// An in-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
    writes: usize,
}

impl MemoryStorage {
    /// A store pre-filled with `bytes`.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            writes: 0,
        }
    }

    /// The stored document.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// How many times the document has been written.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn read_all(&mut self) -> QwResult<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn write_all(&mut self, bytes: &[u8]) -> QwResult<()> {
        self.bytes = bytes.to_vec();
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QwError;

    #[test]
    fn blank_input_generates_chapter() {
        let mut factory = Factory::sequential();
        let (chapter, generated) = load(b"  \n", &mut factory).unwrap();
        assert!(generated);
        assert_eq!(chapter.branches.len(), 2);
    }

    #[test]
    fn malformed_input_is_an_error() {
        let mut factory = Factory::sequential();
        assert!(matches!(
            load(b"{\"title\": 3}", &mut factory),
            Err(QwError::Json(_))
        ));
    }

    #[test]
    fn indent_is_configurable() {
        let chapter = Factory::sequential().chapter();
        let two = String::from_utf8(save(&chapter, 2).unwrap()).unwrap();
        let four = String::from_utf8(save(&chapter, 4).unwrap()).unwrap();
        assert!(two.starts_with("{\n  \"title\""));
        assert!(four.starts_with("{\n    \"title\""));
        assert!(!two.ends_with('\n'));
    }

    #[test]
    fn non_ascii_written_verbatim() {
        let mut chapter = Factory::sequential().chapter();
        chapter.title = "Глава первая".to_string();
        let text = String::from_utf8(save(&chapter, 2).unwrap()).unwrap();
        assert!(text.contains("Глава первая"));
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{
            "title": "t",
            "branches": [
                {"id": "@endings", "segments": [{"id": "e", "text": "fin"}]}
            ]
        }"#;
        let chapter = parse(json.as_bytes()).unwrap();
        assert!(chapter.variables.is_empty());
        assert_eq!(chapter.branches[0].title, "");
        assert!(chapter.branches[0].segments[0].options.is_none());
    }

    #[test]
    fn empty_options_on_ending_read_as_none() {
        let json = r#"{
            "title": "t",
            "branches": [
                {"id": "b", "segments": [{"id": "s", "text": "", "options": []}]},
                {"id": "@endings", "segments": [{"id": "e", "text": "fin", "options": []}]}
            ]
        }"#;
        let chapter = parse(json.as_bytes()).unwrap();
        assert!(chapter.branches[1].segments[0].options.is_none());
        // Only endings are normalized; a story segment keeps its empty list.
        assert_eq!(chapter.branches[0].segments[0].options, Some(Vec::new()));

        let text = String::from_utf8(save(&chapter, 2).unwrap()).unwrap();
        assert_eq!(text.matches("\"options\"").count(), 1);
        assert!(crate::validate(&parse(text.as_bytes()).unwrap())
            .iter()
            .all(|v| !matches!(v, crate::Violation::EndingWithOptions(_))));
    }

    #[test]
    fn memory_storage_counts_writes() {
        let mut store = MemoryStorage::default();
        assert!(store.read_all().unwrap().is_empty());
        store.write_all(b"abc").unwrap();
        assert_eq!(store.bytes(), b"abc");
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn file_storage_truncates_on_rewrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chapter.json");

        let mut store = FileStorage::open(&path).unwrap();
        assert!(store.read_all().unwrap().is_empty());
        store.write_all(b"a long first document").unwrap();
        store.write_all(b"short").unwrap();
        assert_eq!(store.read_all().unwrap(), b"short");
        assert_eq!(std::fs::read(&path).unwrap(), b"short");
        assert_eq!(store.path(), path);
    }
}
