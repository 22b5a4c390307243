pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod hasher;
pub mod model;
pub mod progress;
pub mod repair;
pub mod scanner;
pub mod verify;

pub use config::{CheckConfig, ErrorPolicy};
pub use engine::{check, CancelToken, Coordinator, RunReport};
pub use error::Error;
pub use fingerprint::Fingerprint;
pub use model::{DirectoryEntry, FileReport, Outcome, Status};
pub use progress::{ProgressReporter, SilentReporter};
pub use verify::Verifier;
