use crate::chunk::Chunk;
use crate::error::{FilegoError, Result};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use tracing::debug;

/// Append chunks `0..total` to `sink` in ascending index order.
///
/// `open` returns a reader for a chunk, or `None` if it does not exist, which
/// fails with [`FilegoError::Incomplete`]. Each reader is drained and dropped
/// before the next one is opened. Returns the number of bytes written.
pub fn merge_ordered<R, W, F>(total: u64, mut open: F, sink: &mut W) -> Result<u64>
where
    R: Read,
    W: Write + ?Sized,
    F: FnMut(u64) -> Result<Option<R>>,
{
    let mut written = 0u64;
    for index in 0..total {
        let mut reader = open(index)?.ok_or(FilegoError::Incomplete { index })?;
        let copied = io::copy(&mut reader, sink)?;
        debug!(index, bytes = copied, "appended chunk");
        written += copied;
    }
    sink.flush()?;
    Ok(written)
}

/// Stream an in-memory chunk list into `sink`. Chunks may arrive in any
/// order and the same index may be delivered more than once; each distinct
/// index is written once. A gap in the indices fails with
/// [`FilegoError::Incomplete`].
pub fn merge_chunks<W: Write + ?Sized>(chunks: &[Chunk], sink: &mut W) -> Result<u64> {
    let by_index: HashMap<u64, &Chunk> = chunks.iter().map(|c| (c.index, c)).collect();
    merge_ordered(
        by_index.len() as u64,
        |index| by_index.get(&index).map(|c| c.reader()).transpose(),
        sink,
    )
}

/// Reassemble an in-memory chunk list into a single buffer.
pub fn merge_to_vec(chunks: &[Chunk]) -> Result<Vec<u8>> {
    let capacity = chunks.iter().map(|c| c.length).sum::<u64>() as usize;
    let mut out = Vec::with_capacity(capacity);
    merge_chunks(chunks, &mut out)?;
    Ok(out)
}
