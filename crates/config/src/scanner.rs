use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Scanner {
    /// Whether scans go through the clamd daemon. When set, `clamdscan` is
    /// invoked instead of the standalone `clamscan` binary, and the
    /// daemon-only options below (fdpass, stream, config_file, and the
    /// strict client-error policy) take effect.
    pub daemonize: bool,

    /// Pass the file descriptor to clamd instead of a path. Useful when
    /// clamd runs as a different user and cannot read the file itself.
    /// Daemon mode only.
    pub fdpass: bool,

    /// Stream the file contents to clamd over the socket rather than
    /// having it open the file. Daemon mode only.
    pub stream: bool,

    /// Virus database directory handed to the scanner (`--database=`)
    /// and to freshclam (`--datadir=`). When unset, the scanner's
    /// compiled-in default is used.
    pub datadir: Option<PathBuf>,

    /// clamd client configuration file (`--config-file=`). Daemon mode
    /// only.
    pub config_file: Option<PathBuf>,

    /// Path to the `clamscan` binary. A bare command name is resolved via
    /// PATH like any other command.
    pub executable_path_clamscan: PathBuf,

    /// Path to the `clamdscan` binary.
    pub executable_path_clamdscan: PathBuf,

    /// Path to the `freshclam` binary.
    pub executable_path_freshclam: PathBuf,
}

impl Default for Scanner {
    fn default() -> Self {
        Self {
            daemonize: false,
            fdpass: false,
            stream: false,
            datadir: None,
            config_file: None,
            executable_path_clamscan: PathBuf::from("clamscan"),
            executable_path_clamdscan: PathBuf::from("clamdscan"),
            executable_path_freshclam: PathBuf::from("freshclam"),
        }
    }
}
