use crate::error::Error;
use crate::event::{StreamEvent, StreamSource};
use crate::executable::Executable;
use crate::runner::{CommandRunner, RunReport};
use config::Config;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::warn;

/// The detection line clamscan and clamdscan print for an infected file:
/// `<path>: <signature> FOUND`.
static FOUND_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r": ([\w.-]+) FOUND$").expect("detection pattern compiles"));

/// The non-raising outcomes of a scan. Detections that policy treats as
/// errors surface as [`Error::VirusDetected`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    /// The scanner exited with 0: nothing found.
    Clean,

    /// The target does not exist and missing files are not fatal; no
    /// process was spawned.
    Skipped,

    /// The scanner reported a finding (or an ambiguous failure counted as
    /// one) and policy tolerates it. `virus_type` is `None` when no
    /// detection line was seen.
    Positive { virus_type: Option<String> },
}

impl ScanVerdict {
    /// Whether the target can be treated as safe.
    pub fn is_clean(&self) -> bool {
        matches!(self, ScanVerdict::Clean | ScanVerdict::Skipped)
    }
}

/// Scan, version, and definition-update operations over the configured
/// ClamAV executables. Each call is independent; the configuration
/// snapshot is the only shared input.
pub struct Clamav<'a> {
    config: &'a Config,
    runner: CommandRunner<'a>,
}

impl<'a> Clamav<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            runner: CommandRunner::new(config),
        }
    }

    /// Scan a single path.
    ///
    /// Exit code 0 is clean. Exit code 2 and "the client could not be
    /// launched at all" are ambiguous; clamdscan uses 2 for any error
    /// other than a detection. Unless daemon mode is on and
    /// `error_clamscan_client_error` is set, both count as a positive to
    /// keep the historical behavior. Any other nonzero exit is a
    /// detection, raised as [`Error::VirusDetected`] unless
    /// `error_file_virus` is off.
    pub async fn scan(&self, path: impl AsRef<Path>) -> Result<ScanVerdict, Error> {
        let path = path.as_ref();
        if !self.preflight(path)? {
            return Ok(ScanVerdict::Skipped);
        }

        let scanner = &self.config.scanner;
        let mut args = vec![path.display().to_string(), "--no-summary".to_string()];
        if scanner.daemonize {
            if scanner.fdpass {
                args.push("--fdpass".to_string());
            }
            if scanner.stream {
                args.push("--stream".to_string());
            }
        }
        if let Some(datadir) = &scanner.datadir {
            args.push(format!("--database={}", datadir.display()));
        }

        let (events, mut rx) = mpsc::unbounded_channel();
        let run = self
            .runner
            .run(Executable::scanner(scanner), &args, Some(events));
        let capture = async {
            // Last match wins; the whole stream is drained either way.
            let mut virus_type = None;
            while let Some(event) = rx.recv().await {
                if let Some(name) = signature_in(&event) {
                    virus_type = Some(name);
                }
            }
            virus_type
        };
        let (report, virus_type) = tokio::join!(run, capture);
        let report = report?;

        match report.exit_code() {
            Some(0) => Ok(ScanVerdict::Clean),
            None | Some(2) => {
                if scanner.daemonize && self.config.policy.error_clamscan_client_error {
                    Err(Error::ClamscanClient)
                } else {
                    Ok(ScanVerdict::Positive { virus_type })
                }
            }
            Some(_) => {
                if self.config.policy.error_file_virus {
                    Err(Error::VirusDetected {
                        path: path.to_path_buf(),
                        virus_type,
                    })
                } else {
                    Ok(ScanVerdict::Positive { virus_type })
                }
            }
        }
    }

    /// The scanner's version line, as a quick liveness check.
    ///
    /// `Some` only when the process exited successfully and printed at
    /// least one stdout line; that line is returned with trailing
    /// whitespace removed.
    pub async fn version(&self) -> Result<Option<String>, Error> {
        let (events, mut rx) = mpsc::unbounded_channel();
        let args = ["--version".to_string()];
        let run = self.runner.run(
            Executable::scanner(&self.config.scanner),
            &args,
            Some(events),
        );
        let capture = async {
            let mut version = None;
            while let Some(event) = rx.recv().await {
                if event.source == StreamSource::Stdout {
                    version = Some(event.line);
                }
            }
            version
        };
        let (report, version) = tokio::join!(run, capture);
        let report = report?;

        if report.success() {
            Ok(version.map(|line| line.trim_end().to_string()))
        } else {
            Ok(None)
        }
    }

    /// Update the virus definitions via freshclam. No interpretation is
    /// applied; the caller reads the exit status off the report.
    pub async fn update(&self) -> Result<RunReport, Error> {
        let mut args = Vec::new();
        if let Some(datadir) = &self.config.scanner.datadir {
            args.push(format!("--datadir={}", datadir.display()));
        }
        self.runner.run(Executable::Update, &args, None).await
    }

    /// Returns false when the target should be skipped without spawning
    /// anything.
    fn preflight(&self, path: &Path) -> Result<bool, Error> {
        if path.is_file() {
            return Ok(true);
        }
        if self.config.policy.error_file_missing {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        warn!(path = %path.display(), "file not found, nothing to scan");
        Ok(false)
    }
}

/// The signature name in a detection line, if this event is one. Only
/// stdout lines are considered.
fn signature_in(event: &StreamEvent) -> Option<String> {
    if event.source != StreamSource::Stdout {
        return None;
    }
    FOUND_LINE
        .captures(event.line.trim_end())
        .map(|captures| captures[1].to_string())
}
