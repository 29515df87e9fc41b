//! Small companions used around the lifecycle and dispatch core.
//!
//! - [`TempDir`] scoped temporary directory (itself shared-only)
//! - [`parse_string`], [`to_string`] one-line text conversions

mod temp_dir;
mod text;

pub use temp_dir::{CreatedDir, TempDir};
pub use text::{parse_string, to_string};
