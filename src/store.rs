//! Chunk artifacts persisted in a directory.
//!
//! Each chunk is a plain file named by its zero-based decimal index
//! (`0`, `1`, `2`, ...). Any other entry in the directory is ignored.

use crate::chunk::{Chunk, SplitResult};
use crate::error::{FilegoError, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An index-named artifact found in a chunk directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub index: u64,
    pub size: u64,
}

pub fn artifact_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(index.to_string())
}

/// Parse an artifact file name. Only canonical decimal names count, so `007`
/// and `+7` are not artifacts.
pub fn parse_artifact_name(name: &str) -> Option<u64> {
    let index: u64 = name.parse().ok()?;
    (index.to_string() == name).then_some(index)
}

/// Size of artifact `index`, or `None` if it does not exist as a file.
pub fn artifact_size(dir: &Path, index: u64) -> Result<Option<u64>> {
    match fs::metadata(artifact_path(dir, index)) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Open artifact `index` for reading, or `None` if it does not exist.
pub fn open_artifact(dir: &Path, index: u64) -> Result<Option<File>> {
    match File::open(artifact_path(dir, index)) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All artifacts in `dir`, sorted by index.
pub fn scan_artifacts(dir: &Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let Some(index) = entry.file_name().to_str().and_then(parse_artifact_name) else {
            continue;
        };
        let meta = entry.metadata()?;
        if meta.is_file() {
            artifacts.push(Artifact {
                index,
                size: meta.len(),
            });
        }
    }
    artifacts.sort_by_key(|a| a.index);
    Ok(artifacts)
}

/// Remove artifacts with `index >= keep` left over from an earlier split.
/// Returns how many were removed.
pub fn prune_artifacts(dir: &Path, keep: u64) -> Result<usize> {
    let mut removed = 0;
    for artifact in scan_artifacts(dir)? {
        if artifact.index >= keep {
            fs::remove_file(artifact_path(dir, artifact.index))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Write one chunk as an artifact, overwriting any existing file.
pub fn write_artifact(dir: &Path, chunk: &Chunk) -> Result<()> {
    let path = artifact_path(dir, chunk.index);
    let mut reader = chunk.reader()?;
    let mut out = BufWriter::new(File::create(&path)?);
    let written = io::copy(&mut reader, &mut out)?;
    out.flush()?;

    if written != chunk.length {
        return Err(FilegoError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "chunk {}: source yielded {} bytes, expected {}",
                chunk.index, written, chunk.length
            ),
        )));
    }
    debug!(index = chunk.index, bytes = written, path = %path.display(), "wrote chunk");
    Ok(())
}

/// Persist every chunk of `result` into `dir` using a pool of up to
/// `workers` threads. Artifacts have distinct names, so writes are
/// independent; the first error stops the remaining writes.
pub fn write_artifacts(dir: &Path, result: &SplitResult, workers: usize) -> Result<()> {
    if result.chunks.is_empty() {
        return Ok(());
    }
    let workers = workers.clamp(1, result.chunks.len());

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("filego-write-{}", i))
        .build()
        .map_err(|e| FilegoError::Io(io::Error::other(e)))?;

    pool.install(|| {
        result
            .chunks
            .par_iter()
            .try_for_each(|chunk| write_artifact(dir, chunk))
    })
}
