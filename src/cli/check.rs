use crate::error::Result;
use crate::pipeline::check::{verify, CheckResult};
use crate::store::artifact_size;
use std::path::Path;
use tracing::{info, warn};

/// Options for the check command
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Expected size of the original file
    pub file_size: u64,
    /// Expected number of chunk files
    pub total_chunks: u64,
}

/// Check that `in_dir` holds chunk files `0..total_chunks` whose sizes add up
/// to `file_size`. Must pass before the directory is merged.
///
/// A failed check is reported in the returned [`CheckResult`]; only I/O errors
/// other than a missing chunk are returned as `Err`.
pub fn check_dir(in_dir: &Path, options: &CheckOptions) -> Result<CheckResult> {
    let result = verify(options.file_size, options.total_chunks, |index| {
        artifact_size(in_dir, index)
    })?;

    match &result.error {
        None => info!(in_dir = %in_dir.display(), total_chunks = options.total_chunks, "check passed"),
        Some(failure) => warn!(in_dir = %in_dir.display(), kind = failure.kind(), "check failed: {}", failure),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::split::{split_file, SplitOptions};
    use crate::pipeline::check::CheckFailure;
    use crate::store::artifact_path;
    use tempfile::tempdir;

    fn split_fixture(dir: &Path, len: usize, chunk_size: u64) -> (std::path::PathBuf, CheckOptions) {
        let input = dir.join("input.bin");
        let chunks = dir.join("chunks");
        std::fs::write(&input, vec![0x5Au8; len]).unwrap();
        let options = SplitOptions {
            chunk_size,
            ..Default::default()
        };
        let summary = split_file(&input, &chunks, &options).unwrap();
        (
            chunks,
            CheckOptions {
                file_size: summary.file_size,
                total_chunks: summary.total_chunks,
            },
        )
    }

    #[test]
    fn test_check_passes() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 1000, 300);
        assert_eq!(check_dir(&chunks, &expected).unwrap(), CheckResult::passed());
    }

    #[test]
    fn test_check_one_extra_chunk_is_missing() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 1000, 300);
        let options = CheckOptions {
            total_chunks: expected.total_chunks + 1,
            ..expected
        };
        let result = check_dir(&chunks, &options).unwrap();
        assert!(!result.success);
        assert_eq!(result.error, Some(CheckFailure::Missing { index: 4 }));
    }

    #[test]
    fn test_check_size_off_by_one() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 1000, 300);
        let options = CheckOptions {
            file_size: expected.file_size + 1,
            ..expected
        };
        let result = check_dir(&chunks, &options).unwrap();
        assert_eq!(result.error.map(|e| e.kind()), Some("size"));
    }

    #[test]
    fn test_check_deleted_middle_chunk() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 1000, 300);
        std::fs::remove_file(artifact_path(&chunks, 1)).unwrap();
        let result = check_dir(&chunks, &expected).unwrap();
        assert_eq!(result.error, Some(CheckFailure::Missing { index: 1 }));
    }

    #[test]
    fn test_check_ignores_content() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 1000, 300);
        std::fs::write(artifact_path(&chunks, 0), vec![0xFFu8; 300]).unwrap();
        assert!(check_dir(&chunks, &expected).unwrap().success);
    }

    #[test]
    fn test_check_empty_split() {
        let dir = tempdir().unwrap();
        let (chunks, expected) = split_fixture(dir.path(), 0, 300);
        assert_eq!(expected.total_chunks, 0);
        assert!(check_dir(&chunks, &expected).unwrap().success);

        let one_more = CheckOptions {
            total_chunks: 1,
            ..expected
        };
        assert_eq!(
            check_dir(&chunks, &one_more).unwrap().error,
            Some(CheckFailure::Missing { index: 0 })
        );
    }
}
