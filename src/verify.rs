use crate::error::Result;
use crate::fingerprint;
use crate::hasher;
use crate::model::{DirectoryEntry, Outcome};
use crate::repair::Repairer;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, trace};

/// Per-file verification: extract, digest, compare, optionally repair.
#[derive(Debug, Default)]
pub struct Verifier {
    update: bool,
    repairer: Repairer,
}

impl Verifier {
    pub fn new(update: bool) -> Self {
        Self {
            update,
            repairer: Repairer::new(),
        }
    }

    pub fn update(&self) -> bool {
        self.update
    }

    pub fn verify(&self, entry: &DirectoryEntry) -> Result<Outcome> {
        let dir = entry.path.parent().unwrap_or_else(|| Path::new(""));
        self.verify_name(dir, &entry.file_name)
    }

    /// Verify the file called `name` inside `dir`.
    pub fn verify_name(&self, dir: &Path, name: impl AsRef<OsStr>) -> Result<Outcome> {
        let name = name.as_ref();
        let Some(expected) = fingerprint::extract_os(name)? else {
            trace!("No checksum token in {:?}", name);
            return Ok(Outcome::Skipped);
        };

        let actual = hasher::digest(&dir.join(name))?;
        if expected == actual {
            return Ok(Outcome::Match(actual));
        }

        debug!("{:?}: expected {}, computed {}", name, expected, actual);
        if !self.update {
            return Ok(Outcome::Mismatch { expected, actual });
        }

        let new_name = self.repairer.repair(dir, name, expected, actual)?;
        Ok(Outcome::Repaired {
            expected,
            actual,
            new_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fingerprint::Fingerprint;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_verify_match() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("test[8AB2DCE2].txt"), "test1").unwrap();

        let outcome = Verifier::new(false)
            .verify_name(tmp.path(), "test[8AB2DCE2].txt")
            .unwrap();
        assert_eq!(outcome, Outcome::Match(Fingerprint::new(0x8AB2_DCE2)));
    }

    #[test]
    fn test_verify_mismatch_leaves_name() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("test[00000000].txt"), "test2").unwrap();

        let outcome = Verifier::new(false)
            .verify_name(tmp.path(), "test[00000000].txt")
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Mismatch {
                expected: Fingerprint::new(0),
                actual: Fingerprint::new(0x13BB_8D58),
            }
        );
        assert!(tmp.path().join("test[00000000].txt").exists());
    }

    #[test]
    fn test_verify_repair_then_match() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("test[00000000].txt"), "test2").unwrap();
        let verifier = Verifier::new(true);

        let outcome = verifier
            .verify_name(tmp.path(), "test[00000000].txt")
            .unwrap();
        let Outcome::Repaired { new_name, .. } = outcome else {
            panic!("expected a repaired file");
        };
        assert_eq!(new_name, "test[13BB8D58].txt");
        assert!(!tmp.path().join("test[00000000].txt").exists());

        let again = verifier.verify_name(tmp.path(), &new_name).unwrap();
        assert_eq!(again, Outcome::Match(Fingerprint::new(0x13BB_8D58)));
    }

    #[test]
    fn test_verify_skips_without_token() {
        let tmp = tempdir().unwrap();
        let outcome = Verifier::new(true)
            .verify_name(tmp.path(), "notes.txt")
            .unwrap();
        assert_eq!(outcome, Outcome::Skipped);
    }

    #[test]
    fn test_verify_missing_file_is_open_error() {
        let tmp = tempdir().unwrap();
        let err = Verifier::new(false)
            .verify_name(tmp.path(), "gone [00000000].txt")
            .unwrap_err();
        assert!(matches!(err, Error::FileOpen { .. }));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_verify_non_utf8_name_is_checked() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let name = OsStr::from_bytes(b"ep\xff [00000000].txt");
        fs::write(tmp.path().join(name), "test2").unwrap();
        let entry = DirectoryEntry::new(tmp.path().join(name), OsString::from(name));

        let outcome = Verifier::new(false).verify(&entry).unwrap();
        assert_eq!(
            outcome,
            Outcome::Mismatch {
                expected: Fingerprint::new(0),
                actual: Fingerprint::new(0x13BB_8D58),
            }
        );
    }
}
