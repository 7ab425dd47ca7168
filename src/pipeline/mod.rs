pub mod check;
pub mod merge;
pub mod split;

pub use check::*;
pub use merge::*;
pub use split::*;
