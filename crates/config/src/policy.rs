use serde::{Deserialize, Serialize};

/// How scan findings and pre-flight failures are surfaced to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Policy {
    /// Whether a missing scan target is an error. When false, the scan is
    /// skipped with a logged notice and reported as "nothing to scan".
    pub error_file_missing: bool,

    /// Whether a detection is an error. When false, a detection is
    /// reported as a tolerated positive instead.
    pub error_file_virus: bool,

    /// Whether an ambiguous clamdscan failure (exit code 2, or a client
    /// that could not be launched at all) is surfaced as a transport
    /// error. When false, such failures count as a positive for
    /// compatibility with the historical behavior. Daemon mode only.
    pub error_clamscan_client_error: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            error_file_missing: false,
            error_file_virus: true,
            error_clamscan_client_error: false,
        }
    }
}
