use crate::error::Result;
use crate::store::scan_artifacts;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary of the chunk files held in a directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub dir: PathBuf,
    pub chunk_files: u64,
    pub total_bytes: u64,
    pub highest_index: Option<u64>,
    /// First index in `0..=highest_index` with no chunk file
    pub first_gap: Option<u64>,
}

/// Describe the chunk files in `dir`
pub fn show_info(dir: &Path) -> Result<LocationInfo> {
    let artifacts = scan_artifacts(dir)?;

    let first_gap = artifacts
        .iter()
        .zip(0u64..)
        .find(|(artifact, expected)| artifact.index != *expected)
        .map(|(_, expected)| expected);

    Ok(LocationInfo {
        dir: dir.to_path_buf(),
        chunk_files: artifacts.len() as u64,
        total_bytes: artifacts.iter().map(|a| a.size).sum(),
        highest_index: artifacts.last().map(|a| a.index),
        first_gap,
    })
}

impl fmt::Display for LocationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chunk Directory Information")?;
        writeln!(f, "===========================")?;
        writeln!(f)?;
        writeln!(f, "Directory: {}", self.dir.display())?;
        writeln!(f, "Chunk files: {}", self.chunk_files)?;
        writeln!(f, "Total size: {} ({} bytes)", format_size(self.total_bytes), self.total_bytes)?;
        match self.highest_index {
            Some(index) => writeln!(f, "Highest index: {}", index)?,
            None => writeln!(f, "Highest index: none")?,
        }
        match self.first_gap {
            Some(index) => writeln!(f, "Contiguous: no (chunk {} missing)", index),
            None => writeln!(f, "Contiguous: yes"),
        }
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
