//! Tag system

pub mod filter;
pub mod info;

// Re-export main types
pub use filter::pass_own;
pub use info::TagInfo;
