use crate::chunk::{Chunk, SplitResult};
use crate::error::{FilegoError, Result};
use crate::source::SplitInput;
use tracing::debug;

/// Default chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024;

/// Produces a [`SplitResult`] from an input and a chunk size.
///
/// Any strategy must satisfy the same layout as the fixed-size split;
/// [`split_with`] rejects results that do not.
pub trait SplitStrategy {
    fn split(&self, input: SplitInput, chunk_size: u64) -> Result<SplitResult>;
}

impl<F> SplitStrategy for F
where
    F: Fn(SplitInput, u64) -> Result<SplitResult>,
{
    fn split(&self, input: SplitInput, chunk_size: u64) -> Result<SplitResult> {
        self(input, chunk_size)
    }
}

/// Built-in strategy: consecutive chunks of `chunk_size` bytes, the last one
/// holding the remainder.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedSizeSplit;

impl SplitStrategy for FixedSizeSplit {
    fn split(&self, input: SplitInput, chunk_size: u64) -> Result<SplitResult> {
        let source = input.into_source()?;
        let file_size = source.len();
        let total_chunks = chunk_count(file_size, chunk_size);

        let chunks = (0..total_chunks)
            .map(|index| {
                let (offset, length) = chunk_range(index, chunk_size, file_size);
                Chunk::new(index, offset, length, source.clone())
            })
            .collect();

        debug!(file_size, chunk_size, total_chunks, "computed chunk layout");

        Ok(SplitResult {
            chunks,
            file_size,
            total_chunks,
        })
    }
}

/// Number of chunks needed for `file_size` bytes. Zero bytes need zero chunks.
pub fn chunk_count(file_size: u64, chunk_size: u64) -> u64 {
    file_size.div_ceil(chunk_size)
}

/// `(offset, length)` of chunk `index`.
pub fn chunk_range(index: u64, chunk_size: u64, file_size: u64) -> (u64, u64) {
    let offset = index.saturating_mul(chunk_size).min(file_size);
    let end = offset.saturating_add(chunk_size).min(file_size);
    (offset, end - offset)
}

pub fn validate_chunk_size(chunk_size: u64) -> Result<()> {
    if chunk_size == 0 {
        return Err(FilegoError::InvalidChunkSize(chunk_size));
    }
    Ok(())
}

/// Split `input` into chunks of `chunk_size` bytes.
pub fn split(input: impl Into<SplitInput>, chunk_size: u64) -> Result<SplitResult> {
    split_with(input, chunk_size, &FixedSizeSplit)
}

/// Split `input` with a caller-supplied strategy in place of the built-in one.
/// Errors raised by the strategy are returned as-is.
pub fn split_with<S>(input: impl Into<SplitInput>, chunk_size: u64, strategy: &S) -> Result<SplitResult>
where
    S: SplitStrategy + ?Sized,
{
    let input = input.into();
    input.validate()?;
    validate_chunk_size(chunk_size)?;

    let result = strategy.split(input, chunk_size)?;
    result.validate_layout(chunk_size)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Blob;
    use proptest::prelude::*;
    use std::cell::Cell;

    const MIB: u64 = 1024 * 1024;

    fn lengths(result: &SplitResult) -> Vec<u64> {
        result.chunks.iter().map(|c| c.length).collect()
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 4096), 0);
        assert_eq!(chunk_count(1, 4096), 1);
        assert_eq!(chunk_count(4096, 4096), 1);
        assert_eq!(chunk_count(4097, 4096), 2);
        assert_eq!(chunk_count(10000, 4096), 3);
    }

    #[test]
    fn test_chunk_range_last_chunk_holds_remainder() {
        assert_eq!(chunk_range(0, 4096, 10000), (0, 4096));
        assert_eq!(chunk_range(2, 4096, 10000), (8192, 1808));
        assert_eq!(chunk_range(3, 4096, 10000), (10000, 0));
    }

    #[test]
    fn test_split_empty_file() {
        let result = split(Vec::<u8>::new(), MIB).unwrap();
        assert_eq!(result.file_size, 0);
        assert_eq!(result.total_chunks, 0);
        assert!(result.chunks.is_empty());
    }

    #[test]
    fn test_split_smaller_than_chunk() {
        let result = split(vec![1u8; 50_000], MIB).unwrap();
        assert_eq!(result.total_chunks, 1);
        assert_eq!(lengths(&result), vec![50_000]);
    }

    #[test]
    fn test_split_exact_multiple() {
        let result = split(vec![0u8; 2 * MIB as usize], MIB).unwrap();
        assert_eq!(result.total_chunks, 2);
        assert_eq!(lengths(&result), vec![MIB, MIB]);

        let result = split(vec![0u8; 4 * MIB as usize], MIB).unwrap();
        assert_eq!(result.total_chunks, 4);
        assert!(result.chunks.iter().all(|c| c.length == MIB));
    }

    #[test]
    fn test_split_data_uri() {
        let result = split("data:text/plain;base64,aGVsbG8gd29ybGQ=", 4).unwrap();
        assert_eq!(result.file_size, 11);
        assert_eq!(result.total_chunks, 3);
        assert_eq!(result.chunks[2].read().unwrap(), b"rld");
    }

    #[test]
    fn test_split_blob_chunks_are_views() {
        let blob = Blob::from(b"abcdefghij".to_vec());
        let result = split(blob.slice(2, 9), 3).unwrap();
        assert_eq!(result.file_size, 7);
        let parts: Vec<Vec<u8>> = result.chunks.iter().map(|c| c.read().unwrap()).collect();
        assert_eq!(parts, vec![b"cde".to_vec(), b"fgh".to_vec(), b"i".to_vec()]);
    }

    #[test]
    fn test_split_rejects_zero_chunk_size() {
        let err = split(vec![1u8; 10], 0).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidChunkSize(0)));
    }

    #[test]
    fn test_split_rejects_plain_string() {
        let err = split("not a data uri", 4).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidInput(_)));
        let err = split("   ", 4).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidInput(_)));
    }

    #[test]
    fn test_input_checked_before_chunk_size() {
        let err = split("", 0).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidInput(_)));
    }

    #[test]
    fn test_custom_strategy_replaces_default() {
        let calls = Cell::new(0);
        let strategy = |input: SplitInput, chunk_size: u64| {
            calls.set(calls.get() + 1);
            FixedSizeSplit.split(input, chunk_size)
        };
        let result = split_with(vec![9u8; 10], 4, &strategy).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(lengths(&result), vec![4, 4, 2]);
    }

    #[test]
    fn test_custom_strategy_error_propagates() {
        let strategy = |_: SplitInput, _: u64| -> Result<SplitResult> {
            Err(FilegoError::InvalidInput("refused by strategy".into()))
        };
        let err = split_with(vec![1u8; 4], 2, &strategy).unwrap_err();
        match err {
            FilegoError::InvalidInput(msg) => assert_eq!(msg, "refused by strategy"),
            other => panic!("unexpected error type: {other:?}"),
        }
    }

    #[test]
    fn test_custom_strategy_not_called_on_invalid_chunk_size() {
        let calls = Cell::new(0);
        let strategy = |input: SplitInput, chunk_size: u64| {
            calls.set(calls.get() + 1);
            FixedSizeSplit.split(input, chunk_size)
        };
        assert!(split_with(vec![1u8; 4], 0, &strategy).is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_custom_strategy_with_bad_layout_is_rejected() {
        let strategy = |input: SplitInput, _: u64| FixedSizeSplit.split(input, 3);
        let err = split_with(vec![1u8; 10], 4, &strategy).unwrap_err();
        assert!(matches!(err, FilegoError::InvalidLayout(_)));
    }

    proptest! {
        #[test]
        fn prop_layout_invariants(file_size in 0usize..20_000, chunk_size in 1u64..5_000) {
            let result = split(vec![0u8; file_size], chunk_size).unwrap();
            let file_size = file_size as u64;

            prop_assert_eq!(result.total_chunks, file_size.div_ceil(chunk_size));
            prop_assert_eq!(result.chunks.iter().map(|c| c.length).sum::<u64>(), file_size);
            if let Some((last, rest)) = result.chunks.split_last() {
                prop_assert!(rest.iter().all(|c| c.length == chunk_size));
                prop_assert_eq!(last.length, file_size - chunk_size * (result.total_chunks - 1));
            } else {
                prop_assert_eq!(file_size, 0);
            }
        }

        #[test]
        fn prop_chunks_concatenate_to_source(data in prop::collection::vec(any::<u8>(), 0..4096), chunk_size in 1u64..600) {
            let result = split(data.clone(), chunk_size).unwrap();
            let joined: Vec<u8> = result
                .chunks
                .iter()
                .flat_map(|c| c.read().unwrap())
                .collect();
            prop_assert_eq!(joined, data);
        }
    }
}
