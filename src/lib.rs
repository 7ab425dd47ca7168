//! Filego - chunked file transfer primitives
//!
//! Split a file into fixed-size chunks, check a set of received chunks for
//! completeness, and merge checked chunks back into the original file. How
//! chunks travel between split and merge is up to the caller.
//!
//! ## Flow
//!
//! ```text
//! Source → Split → (transport) → Check → Merge → Output
//! ```
//!
//! - **Split**: `ceil(file_size / chunk_size)` chunks, all full-size except
//!   possibly the last; persisted as files named `0`, `1`, `2`, ...
//! - **Check**: every index present and sizes add up to the file size.
//!   Content is not hashed.
//! - **Merge**: chunks streamed in ascending index order into one output.
//!
//! ## Example
//!
//! ```no_run
//! use filego::cli::{check_dir, merge_dir, split_file, CheckOptions, MergeOptions, SplitOptions};
//! use std::path::Path;
//!
//! let summary = split_file(
//!     Path::new("video.mp4"),
//!     Path::new("chunks"),
//!     &SplitOptions::default(),
//! ).unwrap();
//!
//! let check = check_dir(
//!     Path::new("chunks"),
//!     &CheckOptions {
//!         file_size: summary.file_size,
//!         total_chunks: summary.total_chunks,
//!     },
//! ).unwrap();
//!
//! if check.success {
//!     merge_dir(Path::new("chunks"), Path::new("video-copy.mp4"), &MergeOptions::default()).unwrap();
//! }
//! ```

pub mod chunk;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;

pub use chunk::{Chunk, SplitResult, SplitSummary};
pub use error::{FilegoError, Result};
pub use pipeline::{split, split_with, CheckFailure, CheckResult, SplitStrategy};
pub use source::{Blob, ByteSource, SplitInput};
