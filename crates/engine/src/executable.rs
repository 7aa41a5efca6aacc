use crate::error::Error;
use config::Scanner;
use std::path::Path;
use std::str::FromStr;

/// The fixed set of ClamAV executables this crate is allowed to spawn.
/// Anything outside this set is rejected before a process is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable {
    /// `clamscan`, the standalone scanner.
    Scan,
    /// `clamdscan`, the client for a running clamd daemon.
    DaemonScan,
    /// `freshclam`, the virus definition updater.
    Update,
}

impl Executable {
    /// Canonical command name.
    pub fn name(self) -> &'static str {
        match self {
            Executable::Scan => "clamscan",
            Executable::DaemonScan => "clamdscan",
            Executable::Update => "freshclam",
        }
    }

    /// The scan executable for the given configuration: the daemon client
    /// when daemonize is set, the standalone binary otherwise.
    pub fn scanner(scanner: &Scanner) -> Self {
        if scanner.daemonize {
            Executable::DaemonScan
        } else {
            Executable::Scan
        }
    }

    /// The configured filesystem path for this executable.
    pub fn resolve(self, scanner: &Scanner) -> &Path {
        match self {
            Executable::Scan => &scanner.executable_path_clamscan,
            Executable::DaemonScan => &scanner.executable_path_clamdscan,
            Executable::Update => &scanner.executable_path_freshclam,
        }
    }
}

impl FromStr for Executable {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        match name {
            "clamscan" => Ok(Executable::Scan),
            "clamdscan" => Ok(Executable::DaemonScan),
            "freshclam" => Ok(Executable::Update),
            other => Err(Error::NotPermitted(other.to_string())),
        }
    }
}

impl std::fmt::Display for Executable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
