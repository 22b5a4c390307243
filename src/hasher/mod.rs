pub mod crc;

pub use crc::{digest, digest_reader};
