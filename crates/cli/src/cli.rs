use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// clamwrap: a typed front end for the ClamAV command-line scanners
///
/// clamwrap invokes clamscan, clamdscan, or freshclam with a canonical,
/// configuration-driven argument list and translates their exit codes and
/// detection output into clear verdicts.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Path to configuration file.
    ///
    /// If not provided, the default locations are checked. They are
    /// `/etc/clamwrap/config.toml` and `/etc/clamwrap/config.d/*.toml`,
    /// where the latter being a glob pattern. If they don't exist, the
    /// default configuration is used.
    #[arg(short, long, value_parser = validate_file)]
    pub conffile: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Scan a path. Exits 0 when clean or skipped, 1 on a finding, 2 on a
    /// daemon client error.
    Scan { path: PathBuf },

    /// Print the scanner's version line. Doubles as a quick check that
    /// ClamAV works at all.
    Version,

    /// Update the virus definitions via freshclam and pass its exit
    /// status through.
    Update,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
