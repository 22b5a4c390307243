use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Renames files so their embedded token matches the computed checksum.
///
/// Renames are serialized: two workers can never race onto the same target
/// name, and an existing target is never overwritten.
#[derive(Debug, Default)]
pub struct Repairer {
    lock: Mutex<()>,
}

impl Repairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the first occurrence of `old`'s token in `name` with `new`'s
    /// token and rename the file inside `dir`. Returns the new name.
    ///
    /// The old token is matched case-insensitively; everything else in the
    /// name is kept byte-for-byte, including bytes that are not UTF-8.
    pub fn repair(
        &self,
        dir: &Path,
        name: &OsStr,
        old: Fingerprint,
        new: Fingerprint,
    ) -> Result<OsString> {
        let new_name = replace_token(name, old, new)?;
        let from = dir.join(name);
        let to = dir.join(&new_name);

        // Poisoning only means another rename panicked; the guard protects no data.
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if fs::symlink_metadata(&to).is_ok() {
            return Err(Error::Rename {
                from,
                to,
                source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
            });
        }

        fs::rename(&from, &to).map_err(|source| Error::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        debug!("Renamed {:?} to {:?}", name, new_name);

        Ok(new_name)
    }
}

/// Textual substitution of the first `old` token by the `new` token.
pub fn replace_token(name: &OsStr, old: Fingerprint, new: Fingerprint) -> Result<OsString> {
    let old_token = old.token();
    let bytes = name.as_encoded_bytes();
    // ASCII uppercasing keeps byte offsets identical to `bytes`.
    let position = bytes
        .to_ascii_uppercase()
        .windows(old_token.len())
        .position(|window| window == old_token.as_bytes())
        .ok_or_else(|| Error::TokenNotFound {
            name: name.to_string_lossy().into_owned(),
            token: old_token.clone(),
        })?;

    let mut new_name = Vec::with_capacity(bytes.len());
    new_name.extend_from_slice(&bytes[..position]);
    new_name.extend_from_slice(new.token().as_bytes());
    new_name.extend_from_slice(&bytes[position + old_token.len()..]);

    // SAFETY: `new_name` is `name`'s encoded bytes with one ASCII run swapped
    // for another ASCII run of the same length, so every split point is an
    // ASCII boundary and the result is valid encoded OS string data.
    Ok(unsafe { OsString::from_encoded_bytes_unchecked(new_name) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_replace_token_preserves_rest_of_name() {
        let got = replace_token(
            OsStr::new("Show - 01 [1080p][00000000].mkv"),
            Fingerprint::new(0),
            Fingerprint::new(0x0101_0101),
        )
        .unwrap();
        assert_eq!(got, "Show - 01 [1080p][01010101].mkv");
    }

    #[test]
    fn test_replace_token_only_first_occurrence() {
        let got = replace_token(
            OsStr::new("[00000000] copy [00000000].bin"),
            Fingerprint::new(0),
            Fingerprint::new(0xFFFF_FFFF),
        )
        .unwrap();
        assert_eq!(got, "[FFFFFFFF] copy [00000000].bin");
    }

    #[test]
    fn test_replace_token_lowercase() {
        let got = replace_token(
            OsStr::new("ép [abcdef01].txt"),
            Fingerprint::new(0xABCD_EF01),
            Fingerprint::new(0x8AB2_DCE2),
        )
        .unwrap();
        assert_eq!(got, "ép [8AB2DCE2].txt");
    }

    #[test]
    fn test_replace_token_missing() {
        let err = replace_token(
            OsStr::new("plain.txt"),
            Fingerprint::new(1),
            Fingerprint::new(2),
        )
        .unwrap_err();
        assert!(matches!(err, Error::TokenNotFound { .. }));
    }

    #[test]
    fn test_repair_renames_file() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("[00000000].txt"), "").unwrap();

        let new_name = Repairer::new()
            .repair(
                tmp.path(),
                OsStr::new("[00000000].txt"),
                Fingerprint::from_bytes([0, 0, 0, 0]),
                Fingerprint::from_bytes([1, 1, 1, 1]),
            )
            .unwrap();

        assert_eq!(new_name, "[01010101].txt");
        assert!(tmp.path().join("[01010101].txt").exists());
        assert!(!tmp.path().join("[00000000].txt").exists());
    }

    #[test]
    fn test_repair_refuses_collision() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("a [00000000].txt"), "original").unwrap();
        fs::write(tmp.path().join("a [01010101].txt"), "other").unwrap();

        let err = Repairer::new()
            .repair(
                tmp.path(),
                OsStr::new("a [00000000].txt"),
                Fingerprint::new(0),
                Fingerprint::new(0x0101_0101),
            )
            .unwrap_err();

        assert!(matches!(err, Error::Rename { .. }));
        assert_eq!(err.io_kind(), Some(io::ErrorKind::AlreadyExists));
        assert_eq!(
            fs::read_to_string(tmp.path().join("a [00000000].txt")).unwrap(),
            "original"
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("a [01010101].txt")).unwrap(),
            "other"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_repair_non_utf8_name() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let tmp = tempdir().unwrap();
        let name = OsStr::from_bytes(b"ep\xff [00000000].txt");
        fs::write(tmp.path().join(name), "test2").unwrap();

        let new_name = Repairer::new()
            .repair(tmp.path(), name, Fingerprint::new(0), Fingerprint::new(0x13BB_8D58))
            .unwrap();

        assert_eq!(new_name.clone().into_vec(), b"ep\xff [13BB8D58].txt".to_vec());
        assert!(tmp.path().join(&new_name).exists());
        assert!(!tmp.path().join(name).exists());
    }
}
