#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod executable;
pub mod runner;
pub mod scan;

pub use error::Error;
pub use event::{StreamEvent, StreamSource};
pub use executable::Executable;
pub use runner::{CommandRunner, RunReport};
pub use scan::{Clamav, ScanVerdict};
