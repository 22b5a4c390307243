use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crc32fast::Hasher;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::trace;

const READ_BUFFER_LENGTH: usize = 64 * 1024; // 64KB

/// Stream a file's full content through CRC-32/IEEE.
/// No partial digest is returned if the read fails partway.
pub fn digest(file: &Path) -> Result<Fingerprint> {
    let f = File::open(file).map_err(|source| Error::FileOpen {
        path: file.to_path_buf(),
        source,
    })?;

    let fingerprint = digest_reader(f).map_err(|source| Error::FileRead {
        path: file.to_path_buf(),
        source,
    })?;
    trace!("Computed {} for {}", fingerprint, file.display());
    Ok(fingerprint)
}

pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Fingerprint> {
    let mut hasher = Hasher::new();
    let mut buffer = vec![0u8; READ_BUFFER_LENGTH];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }
    Ok(Fingerprint::new(hasher.finalize()))
}
