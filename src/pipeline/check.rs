use crate::chunk::Chunk;
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

/// Why a chunk set failed its integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckFailure {
    /// First expected index with no chunk.
    Missing { index: u64 },
    /// All chunks present, but their sizes do not add up.
    Size { expected: u64, actual: u64 },
}

impl CheckFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            CheckFailure::Missing { .. } => "missing",
            CheckFailure::Size { .. } => "size",
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::Missing { index } => write!(f, "chunk {} is missing", index),
            CheckFailure::Size { expected, actual } => write!(
                f,
                "chunks add up to {} bytes, expected {}",
                actual, expected
            ),
        }
    }
}

/// Outcome of a check. Failing checks are values, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CheckFailure>,
}

impl CheckResult {
    pub fn passed() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(failure: CheckFailure) -> Self {
        Self {
            success: false,
            error: Some(failure),
        }
    }
}

/// Check `total_chunks` chunks against `file_size`.
///
/// `chunk_size` returns the size of chunk `index`, or `None` if it does not
/// exist. The first missing index short-circuits; sizes are only compared
/// once every chunk is present. Content bytes are never inspected.
pub fn verify<E, F>(file_size: u64, total_chunks: u64, mut chunk_size: F) -> Result<CheckResult, E>
where
    F: FnMut(u64) -> Result<Option<u64>, E>,
{
    let mut actual = 0u64;
    for index in 0..total_chunks {
        match chunk_size(index)? {
            Some(size) => actual = actual.saturating_add(size),
            None => return Ok(CheckResult::failed(CheckFailure::Missing { index })),
        }
    }

    if actual != file_size {
        return Ok(CheckResult::failed(CheckFailure::Size {
            expected: file_size,
            actual,
        }));
    }
    Ok(CheckResult::passed())
}

/// Check an in-memory chunk list, e.g. chunks received over a transport.
pub fn check_chunks(file_size: u64, total_chunks: u64, chunks: &[Chunk]) -> CheckResult {
    let sizes: HashMap<u64, u64> = chunks.iter().map(|c| (c.index, c.length)).collect();
    let outcome: Result<CheckResult, Infallible> =
        verify(file_size, total_chunks, |index| Ok(sizes.get(&index).copied()));
    match outcome {
        Ok(result) => result,
        Err(never) => match never {},
    }
}
