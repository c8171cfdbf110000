//! # conductor-sync
//!
//! File-tree synchronization for build tasks.
//!
//! - [`fs`] — [`copy_tree`], [`remove_tree`], [`make_dirs`], [`copy_rebased`]
//! - [`writer`] — change-gated atomic writes
//! - [`version`] — [`read_version`] / [`sync_version`]

pub mod error;
pub mod fs;
pub mod version;
pub mod writer;

pub use error::SyncError;
pub use fs::{copy_into, copy_rebased, copy_tree, make_dirs, remove_tree, CopySpec};
pub use version::{
    apply_rules, read_version, sync_version, sync_version_with, ManifestVersion, VersionRule,
    DEFAULT_RULES, UNKNOWN_VERSION,
};
pub use writer::{write_if_changed, WriteResult};
