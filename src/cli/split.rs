use crate::chunk::SplitSummary;
use crate::error::{FilegoError, Result};
use crate::pipeline::split::{split, DEFAULT_CHUNK_SIZE};
use crate::source::SplitInput;
use crate::store::{prune_artifacts, write_artifacts};
use std::path::Path;
use tracing::info;

/// Options for the split command
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub chunk_size: u64,
    /// Threads writing chunk files concurrently
    pub workers: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Split a file into chunk files named `0`, `1`, ... inside `out_dir`.
///
/// `out_dir` is created if needed. Existing chunk files are overwritten and
/// chunk files beyond the new chunk count are removed.
pub fn split_file(in_path: &Path, out_dir: &Path, options: &SplitOptions) -> Result<SplitSummary> {
    let result = split(SplitInput::from(in_path), options.chunk_size)?;

    std::fs::create_dir_all(out_dir)?;
    let pruned = prune_artifacts(out_dir, result.total_chunks)?;
    write_artifacts(out_dir, &result, options.workers)?;

    info!(
        input = %in_path.display(),
        out_dir = %out_dir.display(),
        file_size = result.file_size,
        total_chunks = result.total_chunks,
        pruned,
        "split complete"
    );
    Ok(result.summary())
}

/// Parse a byte count such as `4096`, `512K` or `1M` (binary multiples).
pub fn parse_byte_size(s: &str) -> Result<u64> {
    let s = s.trim();
    let (digits, multiplier) = match s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        None => (s, 1u64),
        Some((at, _)) => {
            let unit = match s[at..].to_ascii_uppercase().as_str() {
                "B" => 1,
                "K" | "KB" | "KIB" => 1024,
                "M" | "MB" | "MIB" => 1024 * 1024,
                "G" | "GB" | "GIB" => 1024 * 1024 * 1024,
                other => {
                    return Err(FilegoError::InvalidInput(format!("unknown size unit: {}", other)))
                }
            };
            (&s[..at], unit)
        }
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| FilegoError::InvalidInput(format!("invalid size: {}", s)))?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| FilegoError::InvalidInput(format!("size too large: {}", s)))
}
