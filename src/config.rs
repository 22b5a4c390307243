use crate::error::Result;
use config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::env;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

/// Default capacity of the pending-work queue between dispatcher and workers.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// What a per-file error does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Report the error next to the other results; the run still succeeds.
    #[default]
    Continue,
    /// Stop dispatching on the first error, drain in-flight work, fail the run.
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckConfig {
    /// Directory to scan; `None` means the current working directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Rename files whose embedded checksum is stale.
    #[serde(default)]
    pub update: bool,
    /// Worker threads; `None` means available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            dir: None,
            update: false,
            workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            error_policy: ErrorPolicy::default(),
        }
    }
}

impl CheckConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn target_dir(&self) -> io::Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => env::current_dir(),
        }
    }

    pub fn worker_count(&self) -> usize {
        match self.workers {
            Some(n) => n.max(1),
            None => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

/// Load settings from an optional `Config.toml` and `CRCCHECK_*` variables.
pub fn load_configuration() -> Result<CheckConfig> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("CRCCHECK").try_parsing(true))
        .build()?;
    Ok(builder.try_deserialize::<CheckConfig>()?)
}
