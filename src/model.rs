use crate::error::Error;
use crate::fingerprint::Fingerprint;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// A non-directory entry captured once when the directory is listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub file_name: OsString,
}

impl DirectoryEntry {
    pub fn new(path: PathBuf, file_name: OsString) -> Self {
        Self { path, file_name }
    }

    /// The file name, when it is valid UTF-8.
    pub fn name(&self) -> Option<&str> {
        self.file_name.to_str()
    }

    /// Lossy rendering for report lines only; never used to address the file.
    pub fn display_name(&self) -> String {
        self.file_name.to_string_lossy().into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The name carries no checksum token.
    Skipped,
    Match(Fingerprint),
    Mismatch {
        expected: Fingerprint,
        actual: Fingerprint,
    },
    Repaired {
        expected: Fingerprint,
        actual: Fingerprint,
        new_name: OsString,
    },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Skipped => Status::Skipped,
            Outcome::Match(_) => Status::Ok,
            Outcome::Mismatch { .. } => Status::Mismatch,
            Outcome::Repaired { .. } => Status::Updated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Skipped,
    Ok,
    Mismatch,
    Updated,
    Error,
}

impl Status {
    /// Token printed after the file name; `None` for silent statuses.
    pub fn token(self) -> Option<&'static str> {
        match self {
            Status::Skipped => None,
            Status::Ok => Some("OK"),
            Status::Mismatch => Some("MISMATCH"),
            Status::Updated => Some("UPDATED"),
            Status::Error => Some("ERROR"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().unwrap_or("SKIPPED"))
    }
}

/// The result of one unit of work: an outcome, or the error that stopped it.
#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub outcome: Result<Outcome, Error>,
}

impl FileReport {
    pub fn status(&self) -> Status {
        match &self.outcome {
            Ok(outcome) => outcome.status(),
            Err(_) => Status::Error,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.outcome.as_ref().err()
    }
}
