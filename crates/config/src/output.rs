use serde::{Deserialize, Serialize};

/// How much of the scanner's own output reaches the terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLevel {
    /// Nothing is echoed. The scanner still runs with its normal verbosity;
    /// only the mirroring to stdout/stderr is suppressed.
    #[serde(rename = "off")]
    Off,

    /// The scanner is invoked with `--quiet` and its (reduced) output is
    /// echoed.
    #[serde(rename = "low")]
    Low,

    /// The scanner is invoked with `--verbose` and everything is echoed.
    #[serde(rename = "high")]
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Output {
    /// See [`OutputLevel`] for possible values.
    pub level: OutputLevel,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            level: OutputLevel::Low,
        }
    }
}
