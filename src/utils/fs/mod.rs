//! File system utilities.
//!
//! All writes that produce user-visible artifacts (compiled scripts, the
//! manifest) go through [`atomic_write`], so readers never observe a partially
//! written file.

pub mod atomic;
pub mod dirs;
pub mod formats;
pub mod metadata;
pub mod paths;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, ensure_parent_dir};
pub use formats::{read_json_file, write_json_file};
pub use metadata::modified_time_if_exists;
pub use paths::{find_upwards, relative_path};
