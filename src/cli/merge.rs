use crate::error::Result;
use crate::pipeline::merge::merge_ordered;
use crate::store::{open_artifact, scan_artifacts};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{info, warn};

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Number of chunks to merge. Defaults to the number of chunk files found.
    pub total_chunks: Option<u64>,
}

/// Concatenate chunk files `0, 1, 2, ...` from `in_dir` into `out_path`.
///
/// Run [`check_dir`](crate::cli::check_dir) first; merge does not verify
/// sizes. Chunks are streamed one at a time. If merging fails after the output
/// was created, it is closed and removed. Returns the number of bytes written.
pub fn merge_dir(in_dir: &Path, out_path: &Path, options: &MergeOptions) -> Result<u64> {
    let total = match options.total_chunks {
        Some(total) => total,
        None => scan_artifacts(in_dir)?.len() as u64,
    };

    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Nothing to clean up if the output could not be created; whatever sits at
    // `out_path` is not ours.
    let file = File::create(out_path).inspect_err(|e| {
        warn!(output = %out_path.display(), "cannot create merge output: {}", e);
    })?;

    let outcome = write_merged(in_dir, file, total);
    match &outcome {
        Ok(written) => info!(
            in_dir = %in_dir.display(),
            output = %out_path.display(),
            total_chunks = total,
            bytes = written,
            "merge complete"
        ),
        Err(e) => {
            warn!(output = %out_path.display(), "merge failed: {}", e);
            if let Err(rm) = fs::remove_file(out_path) {
                warn!(output = %out_path.display(), "could not remove partial output: {}", rm);
            }
        }
    }
    outcome
}

// Takes ownership of the output handle, so it is closed before the caller cleans up.
fn write_merged(in_dir: &Path, file: File, total: u64) -> Result<u64> {
    let mut sink = BufWriter::new(file);
    let written = merge_ordered(total, |index| open_artifact(in_dir, index), &mut sink)?;
    let file = sink.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(written)
}
