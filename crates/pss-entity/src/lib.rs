//! Domain records shared by the storage server crates.

pub mod disk;
pub mod fs;
pub mod user;

pub use disk::DiskUsage;
pub use fs::{DirectoryInfo, FileInfo, FsEntry};
pub use user::{AccessCode, Identity, NewUser, User, UserSummary};
