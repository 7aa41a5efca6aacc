use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`{0}` is not a permitted executable")]
    NotPermitted(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Virus detected on {}: {}", path.display(), virus_type.as_deref().unwrap_or("(signature not reported)"))]
    VirusDetected {
        path: PathBuf,
        /// The signature name captured from the scanner's output. `None`
        /// when the scanner exited with a detection code but never printed
        /// a detection line.
        virus_type: Option<String>,
    },

    #[error("Clamscan client error")]
    ClamscanClient,

    #[error("Failed to wait on the scanner process: {0}")]
    Io(#[from] std::io::Error),
}
