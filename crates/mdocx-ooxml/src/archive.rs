//! Archive handling for DOCX packages
//!
//! A DOCX file is a ZIP archive of XML parts. The archive is unpacked into
//! memory on open and written back in one pass on close.

use std::collections::HashMap;
use std::io::{Read, Seek, Write};

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

use crate::error::Result;

/// An unpacked OOXML package
#[derive(Debug, Clone, Default)]
pub struct OoxmlArchive {
    /// Part contents keyed by path inside the archive
    parts: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Unpack every part from a ZIP stream
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader)?;
        let mut parts = HashMap::with_capacity(zip.len());

        for index in 0..zip.len() {
            let mut entry = zip.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut contents = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut contents)?;
            parts.insert(entry.name().to_string(), contents);
        }

        Ok(Self { parts })
    }

    /// Get a part's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts.get(path).map(Vec::as_slice)
    }

    /// Get a part's contents decoded as UTF-8 (lossy)
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Check if a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.parts.contains_key(path)
    }

    /// Part paths, sorted
    pub fn part_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.parts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Set or replace a part
    pub fn set(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        self.parts.insert(path.into(), contents);
    }

    /// Set or replace a part from a string
    pub fn set_string(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        self.set(path, contents.into().into_bytes());
    }

    /// Remove a part
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        self.parts.remove(path)
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the archive holds no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Write the archive as a ZIP stream
    ///
    /// Parts are written in sorted order with a fixed timestamp, so identical
    /// packages produce identical bytes.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for path in self.part_names() {
            zip.start_file(path, options)?;
            zip.write_all(&self.parts[path])?;
        }

        zip.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_part_operations() {
        let mut archive = OoxmlArchive::default();
        assert!(archive.is_empty());

        archive.set_string("word/document.xml", "<w:document/>");
        assert!(archive.contains("word/document.xml"));
        assert_eq!(
            archive.get_string("word/document.xml"),
            Some("<w:document/>".to_string())
        );

        archive.remove("word/document.xml");
        assert!(!archive.contains("word/document.xml"));
        assert_eq!(archive.get("word/document.xml"), None);
    }

    #[test]
    fn test_write_and_reopen() {
        let mut archive = OoxmlArchive::default();
        archive.set_string("b.xml", "<b/>");
        archive.set_string("a.xml", "<a/>");

        let mut out = Cursor::new(Vec::new());
        archive.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let reopened = OoxmlArchive::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reopened.part_names(), vec!["a.xml", "b.xml"]);
        assert_eq!(reopened.get("b.xml"), Some(&b"<b/>"[..]));
    }

    #[test]
    fn test_deterministic_output() {
        let mut archive = OoxmlArchive::default();
        for name in ["z.xml", "m.xml", "a.xml"] {
            archive.set_string(name, format!("<{name}/>"));
        }

        let mut first = Cursor::new(Vec::new());
        let mut second = Cursor::new(Vec::new());
        archive.write_to(&mut first).unwrap();
        archive.write_to(&mut second).unwrap();
        assert_eq!(first.into_inner(), second.into_inner());
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = OoxmlArchive::from_reader(Cursor::new(b"not a zip".to_vec()));
        assert!(result.is_err());
    }
}
