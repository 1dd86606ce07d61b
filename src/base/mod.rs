//! Foundation types shared by the grammar, engine and node layers.
//!
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Location`] - The position stamped on every value node
//!
//! This module has NO dependencies on other crate modules.

mod location;
mod span;

pub use location::Location;
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
