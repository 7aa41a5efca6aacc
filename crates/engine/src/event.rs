/// Which pipe of the child process a line arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// One line of scanner output, tagged with its source stream. Events are
/// produced by the drain tasks while the child is alive and delivered to
/// a single consumer over a channel; interleaving between the two streams
/// is unspecified.
#[derive(Debug, Clone)]
pub struct StreamEvent {
    pub source: StreamSource,
    pub line: String,
}
