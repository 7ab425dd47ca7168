pub mod check;
pub mod info;
pub mod merge;
pub mod split;

pub use check::*;
pub use info::*;
pub use merge::*;
pub use split::*;
