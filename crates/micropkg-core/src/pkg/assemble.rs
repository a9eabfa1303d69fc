//! Reassembly of archive entries into in-memory file records.
//!
//! An [`ArchiveDecoder`] reports entries as a flat event stream. Chunks of
//! different entries may interleave, so buffers are keyed by [`EntryId`] and
//! only frozen by that entry's own [`ArchiveEvent::EntryEnd`].

use super::error::AnalyzeError;
use bytes::{Bytes, BytesMut};
use std::collections::{HashMap, HashSet};

/// Identity of one entry within a single archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// Kind of an archive entry, as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// One event of a decoded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEvent {
    EntryStart {
        id: EntryId,
        path: String,
        kind: EntryKind,
    },
    Chunk {
        id: EntryId,
        data: Bytes,
    },
    EntryEnd {
        id: EntryId,
    },
}

/// Decodes a raw archive into [`ArchiveEvent`]s, delivered in order to `on_event`.
pub trait ArchiveDecoder: Send + Sync {
    /// Decode `archive`, stopping at the first error returned by either the
    /// decoder or `on_event`.
    ///
    /// # Errors
    /// Returns an extraction error if the archive is corrupt.
    fn decode(
        &self,
        archive: &[u8],
        on_event: &mut dyn FnMut(ArchiveEvent) -> Result<(), AnalyzeError>,
    ) -> Result<(), AnalyzeError>;
}

/// A regular file reconstructed from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub content: Bytes,
}

#[derive(Debug)]
struct PendingFile {
    path: String,
    buf: BytesMut,
}

/// Collects [`ArchiveEvent`]s into completed [`FileRecord`]s.
#[derive(Debug, Default)]
pub struct FileAssembler {
    /// File entries in start order.
    order: Vec<EntryId>,
    pending: HashMap<EntryId, PendingFile>,
    completed: HashMap<EntryId, FileRecord>,
    ignored: HashSet<EntryId>,
}

impl FileAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one decoder event.
    ///
    /// # Errors
    /// Returns an extraction error on a duplicate entry id, or on a chunk or
    /// end event for an entry that is not open.
    pub fn apply(&mut self, event: ArchiveEvent) -> Result<(), AnalyzeError> {
        match event {
            ArchiveEvent::EntryStart { id, path, kind } => self.start(id, path, kind),
            ArchiveEvent::Chunk { id, data } => self.chunk(id, &data),
            ArchiveEvent::EntryEnd { id } => self.end(id),
        }
    }

    fn is_known(&self, id: EntryId) -> bool {
        self.pending.contains_key(&id) || self.completed.contains_key(&id) || self.ignored.contains(&id)
    }

    fn start(&mut self, id: EntryId, path: String, kind: EntryKind) -> Result<(), AnalyzeError> {
        if self.is_known(id) {
            return Err(AnalyzeError::extraction(format!(
                "Duplicate archive entry id {} ({path})",
                id.0
            )));
        }

        if kind == EntryKind::File {
            self.order.push(id);
            self.pending.insert(
                id,
                PendingFile {
                    path,
                    buf: BytesMut::new(),
                },
            );
        } else {
            self.ignored.insert(id);
        }
        Ok(())
    }

    fn chunk(&mut self, id: EntryId, data: &[u8]) -> Result<(), AnalyzeError> {
        if let Some(file) = self.pending.get_mut(&id) {
            file.buf.extend_from_slice(data);
            return Ok(());
        }
        if self.ignored.contains(&id) {
            return Ok(());
        }
        Err(AnalyzeError::extraction(format!(
            "Data chunk for unknown or finished archive entry {}",
            id.0
        )))
    }

    fn end(&mut self, id: EntryId) -> Result<(), AnalyzeError> {
        if let Some(file) = self.pending.remove(&id) {
            self.completed.insert(
                id,
                FileRecord {
                    path: file.path,
                    content: file.buf.freeze(),
                },
            );
            return Ok(());
        }
        if self.ignored.contains(&id) {
            return Ok(());
        }
        Err(AnalyzeError::extraction(format!(
            "End of unknown or finished archive entry {}",
            id.0
        )))
    }

    /// Finish assembly, returning file records in archive order.
    ///
    /// # Errors
    /// Returns an extraction error if any file entry never completed.
    pub fn finish(mut self) -> Result<Vec<FileRecord>, AnalyzeError> {
        if let Some(file) = self.order.iter().find_map(|id| self.pending.get(id)) {
            return Err(AnalyzeError::extraction(format!(
                "Archive ended before entry '{}' completed",
                file.path
            )));
        }

        let mut records = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if let Some(record) = self.completed.remove(id) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Decode `archive` with `decoder` and assemble its regular files.
///
/// # Errors
/// Returns an extraction error if decoding or assembly fails.
pub fn collect_files(
    decoder: &dyn ArchiveDecoder,
    archive: &[u8],
) -> Result<Vec<FileRecord>, AnalyzeError> {
    let mut assembler = FileAssembler::new();
    decoder.decode(archive, &mut |event| assembler.apply(event))?;
    assembler.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::error::FailureKind;

    fn start(id: u64, path: &str, kind: EntryKind) -> ArchiveEvent {
        ArchiveEvent::EntryStart {
            id: EntryId(id),
            path: path.to_string(),
            kind,
        }
    }

    fn chunk(id: u64, data: &'static str) -> ArchiveEvent {
        ArchiveEvent::Chunk {
            id: EntryId(id),
            data: Bytes::from_static(data.as_bytes()),
        }
    }

    fn end(id: u64) -> ArchiveEvent {
        ArchiveEvent::EntryEnd { id: EntryId(id) }
    }

    fn assemble(events: Vec<ArchiveEvent>) -> Result<Vec<FileRecord>, AnalyzeError> {
        let mut assembler = FileAssembler::new();
        for event in events {
            assembler.apply(event)?;
        }
        assembler.finish()
    }

    #[test]
    fn test_sequential_entries() {
        let files = assemble(vec![
            start(0, "package/a.js", EntryKind::File),
            chunk(0, "let a"),
            chunk(0, " = 1;"),
            end(0),
            start(1, "package/b.js", EntryKind::File),
            chunk(1, "let b = 2;"),
            end(1),
        ])
        .unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "package/a.js");
        assert_eq!(&files[0].content[..], b"let a = 1;");
        assert_eq!(&files[1].content[..], b"let b = 2;");
    }

    #[test]
    fn test_interleaved_chunks_stay_with_their_entry() {
        let files = assemble(vec![
            start(0, "package/a.js", EntryKind::File),
            start(1, "package/b.js", EntryKind::File),
            chunk(1, "B1"),
            chunk(0, "A1"),
            chunk(1, "B2"),
            chunk(0, "A2"),
            end(1),
            chunk(0, "A3"),
            end(0),
        ])
        .unwrap();

        assert_eq!(files[0].path, "package/a.js");
        assert_eq!(&files[0].content[..], b"A1A2A3");
        assert_eq!(files[1].path, "package/b.js");
        assert_eq!(&files[1].content[..], b"B1B2");
    }

    #[test]
    fn test_order_is_start_order_not_completion_order() {
        let files = assemble(vec![
            start(0, "package/z.js", EntryKind::File),
            start(1, "package/a.js", EntryKind::File),
            end(1),
            end(0),
        ])
        .unwrap();

        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["package/z.js", "package/a.js"]);
    }

    #[test]
    fn test_non_file_entries_are_skipped() {
        let files = assemble(vec![
            start(0, "package/", EntryKind::Directory),
            end(0),
            start(1, "package/link", EntryKind::Symlink),
            chunk(1, "ignored"),
            end(1),
            start(2, "package/index.js", EntryKind::File),
            end(2),
        ])
        .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "package/index.js");
        assert!(files[0].content.is_empty());
    }

    #[test]
    fn test_unfinished_entry_fails() {
        let err = assemble(vec![
            start(0, "package/a.js", EntryKind::File),
            chunk(0, "partial"),
        ])
        .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Extraction);
        assert!(err.message().contains("package/a.js"));
    }

    #[test]
    fn test_chunk_for_unknown_entry_fails() {
        let err = assemble(vec![chunk(7, "orphan")]).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Extraction);
    }

    #[test]
    fn test_chunk_after_end_fails() {
        let result = assemble(vec![
            start(0, "package/a.js", EntryKind::File),
            end(0),
            chunk(0, "late"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_id_fails() {
        let result = assemble(vec![
            start(0, "package/a.js", EntryKind::File),
            end(0),
            start(0, "package/b.js", EntryKind::File),
        ]);
        assert!(result.is_err());
    }
}
