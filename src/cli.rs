use clap::Parser;
use crccheck::{CheckConfig, ErrorPolicy};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "crccheck")]
#[command(
    about = "Extracts the CRC value from file names and validates the files' integrity",
    long_about = None
)]
pub struct Cli {
    /// Directory to scan for files (defaults to the current directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
    /// Update the hash in the file name if it's a mismatch
    #[arg(short, long)]
    pub update: bool,
    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// Capacity of the pending file queue
    #[arg(long)]
    pub queue: Option<usize>,
    /// Stop at the first file that can't be checked and exit with an error
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Flags given on the command line win over loaded configuration.
    pub fn apply(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(dir) = &self.dir {
            config.dir = Some(dir.clone());
        }
        if self.update {
            config.update = true;
        }
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(queue) = self.queue {
            config.queue_capacity = queue;
        }
        if self.fail_fast {
            config.error_policy = ErrorPolicy::FailFast;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_config() {
        let cli = Cli::try_parse_from(["crccheck"]).unwrap();
        let config = cli.apply(CheckConfig::default().with_update(true));
        assert_eq!(config, CheckConfig::default().with_update(true));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "crccheck",
            "--dir",
            "/tmp/media",
            "--update",
            "-w",
            "4",
            "--queue",
            "8",
            "--fail-fast",
        ])
        .unwrap();
        let config = cli.apply(CheckConfig::default());

        assert_eq!(config.dir, Some(PathBuf::from("/tmp/media")));
        assert!(config.update);
        assert_eq!(config.worker_count(), 4);
        assert_eq!(config.queue_capacity(), 8);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
    }
}
