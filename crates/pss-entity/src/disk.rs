//! Volume usage snapshot.

use serde::{Deserialize, Serialize};

/// Total and available bytes on the volume holding the storage root.
///
/// Read fresh for every request; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUsage {
    /// Volume size in bytes.
    pub total_bytes: u64,
    /// Bytes available to the server process.
    pub available_bytes: u64,
}
