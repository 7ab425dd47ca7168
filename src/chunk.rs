use crate::error::{FilegoError, Result};
use crate::source::ByteSource;
use serde::Serialize;
use std::io::Read;

/// A contiguous byte range of the source, identified by its zero-based index.
///
/// Holds a view on the source; no bytes are read until [`Chunk::read`] or
/// [`Chunk::reader`] is called.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: u64,
    pub offset: u64,
    pub length: u64,
    source: ByteSource,
}

impl Chunk {
    pub fn new(index: u64, offset: u64, length: u64, source: ByteSource) -> Self {
        Self {
            index,
            offset,
            length,
            source,
        }
    }

    /// End of the chunk's range (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    pub fn reader(&self) -> Result<Box<dyn Read + Send>> {
        self.source.reader(self.offset, self.length)
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.source.read_range(self.offset, self.length)
    }
}

/// Ordered chunks produced by a split.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub chunks: Vec<Chunk>,
    pub file_size: u64,
    pub total_chunks: u64,
}

impl SplitResult {
    pub fn summary(&self) -> SplitSummary {
        SplitSummary {
            file_size: self.file_size,
            total_chunks: self.total_chunks,
        }
    }

    /// Verify the layout invariants for `chunk_size`: contiguous zero-based
    /// indices, full-size chunks except the last, lengths summing to
    /// `file_size`, and `total_chunks == ceil(file_size / chunk_size)`.
    pub fn validate_layout(&self, chunk_size: u64) -> Result<()> {
        if chunk_size == 0 {
            return Err(FilegoError::InvalidChunkSize(chunk_size));
        }
        let expected_total = self.file_size.div_ceil(chunk_size);
        if self.total_chunks != expected_total {
            return Err(FilegoError::InvalidLayout(format!(
                "total_chunks is {}, expected {}",
                self.total_chunks, expected_total
            )));
        }
        if self.chunks.len() as u64 != self.total_chunks {
            return Err(FilegoError::InvalidLayout(format!(
                "{} chunks listed but total_chunks is {}",
                self.chunks.len(),
                self.total_chunks
            )));
        }

        let mut offset = 0u64;
        for (position, chunk) in self.chunks.iter().enumerate() {
            let position = position as u64;
            if chunk.index != position {
                return Err(FilegoError::InvalidLayout(format!(
                    "chunk at position {} has index {}",
                    position, chunk.index
                )));
            }
            if chunk.offset != offset {
                return Err(FilegoError::InvalidLayout(format!(
                    "chunk {} starts at {}, expected {}",
                    chunk.index, chunk.offset, offset
                )));
            }
            let is_last = position + 1 == self.total_chunks;
            let expected_len = if is_last {
                self.file_size - chunk_size * (self.total_chunks - 1)
            } else {
                chunk_size
            };
            if chunk.length != expected_len {
                return Err(FilegoError::InvalidLayout(format!(
                    "chunk {} has length {}, expected {}",
                    chunk.index, chunk.length, expected_len
                )));
            }
            offset += chunk.length;
        }

        if offset != self.file_size {
            return Err(FilegoError::InvalidLayout(format!(
                "chunk lengths sum to {}, file size is {}",
                offset, self.file_size
            )));
        }
        Ok(())
    }
}

/// Size and count of a split, as reported once chunks are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitSummary {
    pub file_size: u64,
    pub total_chunks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Blob;

    fn source(len: usize) -> ByteSource {
        ByteSource::Memory(Blob::from(vec![7u8; len]))
    }

    fn result(file_size: u64, lengths: &[u64]) -> SplitResult {
        let src = source(file_size as usize);
        let mut offset = 0;
        let chunks = lengths
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let chunk = Chunk::new(i as u64, offset, len, src.clone());
                offset += len;
                chunk
            })
            .collect::<Vec<_>>();
        SplitResult {
            total_chunks: chunks.len() as u64,
            chunks,
            file_size,
        }
    }

    #[test]
    fn test_chunk_reads_its_range() {
        let src = ByteSource::Memory(Blob::from((0u8..10).collect::<Vec<u8>>()));
        let chunk = Chunk::new(1, 4, 3, src);
        assert_eq!(chunk.end(), 7);
        assert_eq!(chunk.read().unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn test_chunk_past_end_of_blob_fails() {
        let chunk = Chunk::new(0, 6, 8, source(10));
        assert!(matches!(chunk.read(), Err(crate::error::FilegoError::Io(_))));
        assert!(chunk.reader().is_err());
    }

    #[test]
    fn test_validate_layout_accepts_valid() {
        result(10, &[4, 4, 2]).validate_layout(4).unwrap();
        result(8, &[4, 4]).validate_layout(4).unwrap();
        result(0, &[]).validate_layout(4).unwrap();
    }

    #[test]
    fn test_validate_layout_rejects_short_middle_chunk() {
        let err = result(10, &[4, 2, 4]).validate_layout(4).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidLayout(_)));
    }

    #[test]
    fn test_validate_layout_rejects_wrong_total() {
        let mut bad = result(10, &[4, 4, 2]);
        bad.total_chunks = 4;
        assert!(bad.validate_layout(4).is_err());
    }

    #[test]
    fn test_validate_layout_rejects_reordered_chunks() {
        let mut bad = result(8, &[4, 4]);
        bad.chunks.swap(0, 1);
        assert!(bad.validate_layout(4).is_err());
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_string(&result(10, &[4, 4, 2]).summary()).unwrap();
        assert_eq!(json, r#"{"fileSize":10,"totalChunks":3}"#);
    }
}
