//! Byte sources that can be split into chunks.
//!
//! Every accepted input is normalised into a [`ByteSource`]: a randomly
//! readable byte range with a known total length. In-memory inputs become a
//! [`Blob`], whose slices share the underlying buffer; file paths are read
//! range by range and never loaded whole.

use crate::error::{FilegoError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scheme marker that prefixes an encoded text payload.
pub const DATA_URI_SCHEME: &str = "data:";

const INVALID_INPUT: &str = "file is not a byte buffer, blob, file path or base64 data URI";

/// Standard alphabet, padding optional. Data URIs in the wild often drop the
/// trailing `=`.
const DATA_URI_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Immutable, cheaply cloneable view over a shared byte buffer.
///
/// `slice` returns a new view without copying; bytes are only touched when the
/// view is read.
#[derive(Clone)]
pub struct Blob {
    data: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl Blob {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        let data = data.into();
        let end = data.len();
        Self { data, start: 0, end }
    }

    pub fn len(&self) -> u64 {
        (self.end - self.start) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// View of `[start, end)` relative to this blob, clamped to its bounds.
    pub fn slice(&self, start: u64, end: u64) -> Blob {
        let len = self.len();
        let start = start.min(len) as usize;
        let end = end.clamp(start as u64, len) as usize;
        Blob {
            data: Arc::clone(&self.data),
            start: self.start + start,
            end: self.start + end,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.start..self.end]
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob").field("len", &self.len()).finish()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob::new(data)
    }
}

impl From<&[u8]> for Blob {
    fn from(data: &[u8]) -> Self {
        Blob::new(data)
    }
}

/// A file on disk, read with ranged reads.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: Arc<Path>,
    len: u64,
}

impl FileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(FilegoError::InvalidInput(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        Ok(Self {
            path: Arc::from(path),
            len: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Randomly readable byte source with a known length.
#[derive(Debug, Clone)]
pub enum ByteSource {
    Memory(Blob),
    File(FileSource),
}

impl ByteSource {
    pub fn len(&self) -> u64 {
        match self {
            ByteSource::Memory(blob) => blob.len(),
            ByteSource::File(file) => file.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Streaming reader over `length` bytes starting at `offset`.
    /// Fails with `UnexpectedEof` if the range runs past the end of the source.
    pub fn reader(&self, offset: u64, length: u64) -> Result<Box<dyn Read + Send>> {
        self.check_range(offset, length)?;
        match self {
            ByteSource::Memory(blob) => {
                let view = blob.slice(offset, offset.saturating_add(length));
                Ok(Box::new(Cursor::new(view)))
            }
            ByteSource::File(file) => {
                let mut handle = File::open(&file.path)?;
                handle.seek(SeekFrom::Start(offset))?;
                Ok(Box::new(handle.take(length)))
            }
        }
    }

    /// Materialise `length` bytes starting at `offset`.
    pub fn read_range(&self, offset: u64, length: u64) -> Result<Vec<u8>> {
        let mut reader = self.reader(offset, length)?;
        let mut buf = Vec::with_capacity(length as usize);
        reader.read_to_end(&mut buf)?;
        // a file can shrink between open and read
        if (buf.len() as u64) != length {
            return Err(short_read(offset, length, buf.len() as u64));
        }
        Ok(buf)
    }

    fn check_range(&self, offset: u64, length: u64) -> Result<()> {
        let len = self.len();
        match offset.checked_add(length) {
            Some(end) if end <= len => Ok(()),
            _ => Err(short_read(offset, length, len.saturating_sub(offset))),
        }
    }
}

fn short_read(offset: u64, length: u64, available: u64) -> FilegoError {
    FilegoError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("expected {} bytes at offset {}, read {}", length, offset, available),
    ))
}

/// Input accepted by the splitter.
#[derive(Debug, Clone)]
pub enum SplitInput {
    /// Raw bytes, used directly.
    Bytes(Vec<u8>),
    /// `data:[<meta>],<base64 body>` text payload.
    Encoded(String),
    /// File on disk, read by range.
    Path(PathBuf),
    /// Shared in-memory blob, sliced lazily.
    Blob(Blob),
}

impl SplitInput {
    /// Reject inputs that can never produce a source, before any I/O.
    pub fn validate(&self) -> Result<()> {
        match self {
            SplitInput::Encoded(text) => {
                if text.trim().is_empty() || !text.starts_with(DATA_URI_SCHEME) {
                    return Err(FilegoError::InvalidInput(INVALID_INPUT.into()));
                }
                Ok(())
            }
            SplitInput::Path(path) => {
                if path.as_os_str().is_empty() {
                    return Err(FilegoError::InvalidInput(INVALID_INPUT.into()));
                }
                Ok(())
            }
            SplitInput::Bytes(_) | SplitInput::Blob(_) => Ok(()),
        }
    }

    pub fn into_source(self) -> Result<ByteSource> {
        self.validate()?;
        match self {
            SplitInput::Bytes(bytes) => Ok(ByteSource::Memory(Blob::from(bytes))),
            SplitInput::Encoded(text) => Ok(ByteSource::Memory(Blob::from(decode_data_uri(&text)?))),
            SplitInput::Path(path) => Ok(ByteSource::File(FileSource::open(&path)?)),
            SplitInput::Blob(blob) => Ok(ByteSource::Memory(blob)),
        }
    }
}

impl From<Vec<u8>> for SplitInput {
    fn from(bytes: Vec<u8>) -> Self {
        SplitInput::Bytes(bytes)
    }
}

impl From<&[u8]> for SplitInput {
    fn from(bytes: &[u8]) -> Self {
        SplitInput::Bytes(bytes.to_vec())
    }
}

impl From<Blob> for SplitInput {
    fn from(blob: Blob) -> Self {
        SplitInput::Blob(blob)
    }
}

impl From<PathBuf> for SplitInput {
    fn from(path: PathBuf) -> Self {
        SplitInput::Path(path)
    }
}

impl From<&Path> for SplitInput {
    fn from(path: &Path) -> Self {
        SplitInput::Path(path.to_path_buf())
    }
}

impl From<String> for SplitInput {
    fn from(text: String) -> Self {
        SplitInput::Encoded(text)
    }
}

impl From<&str> for SplitInput {
    fn from(text: &str) -> Self {
        SplitInput::Encoded(text.to_string())
    }
}

/// Decode the base64 body of a `data:` payload.
/// Everything after the first comma is the body. Whitespace inside the body
/// (line wrapping) is ignored and padding is optional.
pub fn decode_data_uri(payload: &str) -> Result<Vec<u8>> {
    let body = payload
        .strip_prefix(DATA_URI_SCHEME)
        .and_then(|rest| rest.split_once(','))
        .map(|(_, body)| body)
        .ok_or_else(|| FilegoError::InvalidInput(INVALID_INPUT.into()))?;

    let body: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    DATA_URI_ENGINE
        .decode(body)
        .map_err(|e| FilegoError::InvalidInput(format!("data URI body is not valid base64: {}", e)))
}
