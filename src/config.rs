use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Settings shared by every strategy of one batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Size of the thread pool and the process pool.
    pub workers: NonZeroUsize,
    /// Directory the fetched files are written into.
    pub output_dir: PathBuf,
    /// Program launched for each fetch by the process strategy.
    /// `None` means the running executable.
    pub worker_program: Option<PathBuf>,
}

impl BatchConfig {
    pub fn new(workers: NonZeroUsize) -> Self {
        Self {
            workers,
            output_dir: PathBuf::from("."),
            worker_program: None,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_worker_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.worker_program = Some(program.into());
        self
    }

    /// Available parallelism of the host, or one if it cannot be queried.
    pub fn host_parallelism() -> NonZeroUsize {
        std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub(crate) fn resolve_worker_program(&self) -> io::Result<PathBuf> {
        match &self.worker_program {
            Some(program) => Ok(program.clone()),
            None => std::env::current_exe(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig::new(BatchConfig::host_parallelism())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_writes_to_cwd() {
        let config = BatchConfig::default();
        assert_eq!(config.output_dir(), Path::new("."));
        assert!(config.workers.get() >= 1);
    }

    #[test]
    fn test_explicit_worker_program() {
        let config = BatchConfig::new(NonZeroUsize::new(2).unwrap())
            .with_worker_program("/bin/fetch-worker");
        assert_eq!(
            config.resolve_worker_program().unwrap(),
            PathBuf::from("/bin/fetch-worker")
        );
    }
}
