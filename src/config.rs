//! Configuration values passed explicitly through the pipeline.

use std::path::PathBuf;

/// Default worker count for both the listing and the processing phase
pub const DEFAULT_THREADS: usize = 10;

/// Default number of prefix levels explored during shard discovery
pub const DEFAULT_SHARD_DEPTH: usize = 4;

/// Knobs of the analysis pipeline itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Worker tasks per phase (listing, then processing)
    pub threads: usize,
    /// Maximum prefix levels explored when discovering shards
    pub shard_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            shard_depth: DEFAULT_SHARD_DEPTH,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    #[must_use]
    pub const fn with_shard_depth(mut self, depth: usize) -> Self {
        self.shard_depth = depth;
        self
    }
}

/// Where and how to write the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub path: Option<PathBuf>,
    /// Explicit format; inferred from the file extension when absent
    pub format: Option<String>,
}

/// Settings for an `analyze` run against S3
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub prefix: String,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    /// Target principal; the caller identity is used when absent
    pub identity: Option<String>,
    pub pipeline: PipelineConfig,
    pub output: OutputSettings,
}

/// Settings for an `analyze-local` run against a directory mirror
#[derive(Debug, Clone)]
pub struct LocalSettings {
    pub root: PathBuf,
    pub prefix: String,
    pub identity: String,
    pub pipeline: PipelineConfig,
    pub output: OutputSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.threads, 10);
        assert_eq!(config.shard_depth, 4);
    }

    #[test]
    fn test_threads_never_zero() {
        assert_eq!(PipelineConfig::default().with_threads(0).threads, 1);
        assert_eq!(PipelineConfig::default().with_threads(32).threads, 32);
    }
}
