//! Worker Pool
//!
//! Runs per-file extraction either sequentially or across a bounded set of
//! blocking workers. Every input file yields exactly one outcome; a failing
//! or panicking extraction only affects its own file.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};

use crate::analyzer::scanner::ScannedFile;
use crate::constants::pool::MAX_WORKERS;
use crate::types::{ExtractionFailure, ModuleInfo, Result, SkeletonError};

/// Per-file outcome keyed by absolute path
pub type PoolResults = BTreeMap<PathBuf, std::result::Result<ModuleInfo, ExtractionFailure>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// `0` runs on the calling thread; the upper bound is [`MAX_WORKERS`]
    pub fn new(workers: usize) -> Result<Self> {
        if workers > MAX_WORKERS {
            return Err(SkeletonError::Config(format!(
                "Worker count {} exceeds maximum of {}",
                workers, MAX_WORKERS
            )));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Extract every file and collect the outcomes.
    ///
    /// Must not be called from inside a tokio runtime when `workers > 0`;
    /// the pool drives its own runtime for the duration of the call.
    pub fn run<F>(&self, files: Vec<ScannedFile>, extract: F) -> Result<PoolResults>
    where
        F: Fn(&ScannedFile) -> Result<ModuleInfo> + Send + Sync + 'static,
    {
        if self.workers == 0 {
            Ok(self.run_sequential(files, extract))
        } else {
            self.run_parallel(files, Arc::new(extract))
        }
    }

    fn run_sequential<F>(&self, files: Vec<ScannedFile>, extract: F) -> PoolResults
    where
        F: Fn(&ScannedFile) -> Result<ModuleInfo>,
    {
        let mut results = PoolResults::new();
        for file in files {
            let outcome = match catch_unwind(AssertUnwindSafe(|| extract(&file))) {
                Ok(extracted) => extracted.map_err(|e| failure(&file, failure_reason(&e))),
                Err(payload) => Err(failure(&file, panic_reason(payload.as_ref()))),
            };
            record(&mut results, file, outcome);
        }
        results
    }

    fn run_parallel<F>(&self, files: Vec<ScannedFile>, extract: Arc<F>) -> Result<PoolResults>
    where
        F: Fn(&ScannedFile) -> Result<ModuleInfo> + Send + Sync + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .max_blocking_threads(self.workers)
            .enable_all()
            .build()?;

        debug!(
            "Extracting {} files with {} workers",
            files.len(),
            self.workers
        );

        let collected: Vec<_> = runtime.block_on(async {
            futures::stream::iter(files)
                .map(|file| {
                    let extract = Arc::clone(&extract);
                    async move {
                        let task_file = file.clone();
                        let joined =
                            tokio::task::spawn_blocking(move || extract(&task_file)).await;
                        (file, joined)
                    }
                })
                .buffer_unordered(self.workers)
                .collect()
                .await
        });

        let mut results = PoolResults::new();
        for (file, joined) in collected {
            let outcome = match joined {
                Ok(extracted) => extracted.map_err(|e| failure(&file, failure_reason(&e))),
                Err(join_err) if join_err.is_panic() => {
                    let payload = join_err.into_panic();
                    Err(failure(&file, panic_reason(payload.as_ref())))
                }
                Err(join_err) => Err(failure(&file, format!("extraction task failed: {}", join_err))),
            };
            record(&mut results, file, outcome);
        }

        Ok(results)
    }
}

fn record(
    results: &mut PoolResults,
    file: ScannedFile,
    outcome: std::result::Result<ModuleInfo, ExtractionFailure>,
) {
    if let Err(failure) = &outcome {
        warn!("Skipping {}: {}", failure.path, failure.reason);
    }
    results.insert(file.path, outcome);
}

fn failure(file: &ScannedFile, reason: String) -> ExtractionFailure {
    ExtractionFailure {
        source: file.source,
        path: file.relative.clone(),
        reason,
    }
}

/// Reason text for a failed extraction; parse errors already name the file
fn failure_reason(err: &SkeletonError) -> String {
    match err {
        SkeletonError::Parse { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("extractor panicked: {}", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::Language;

    fn files(names: &[&str]) -> Vec<ScannedFile> {
        names
            .iter()
            .map(|name| ScannedFile {
                path: PathBuf::from("/src").join(name),
                source: 0,
                relative: name.to_string(),
            })
            .collect()
    }

    fn flaky(file: &ScannedFile) -> Result<ModuleInfo> {
        match file.relative.as_str() {
            "bad.py" => Err(SkeletonError::parse(&file.relative, "syntax error near line 1")),
            "boom.py" => panic!("exploded on {}", file.relative),
            _ => Ok(ModuleInfo::new(file.relative.clone(), file.source, Language::Python)),
        }
    }

    fn assert_isolated(results: &PoolResults) {
        assert_eq!(results.len(), 4);
        assert!(results[&PathBuf::from("/src/a.py")].is_ok());
        assert!(results[&PathBuf::from("/src/z.py")].is_ok());

        let bad = results[&PathBuf::from("/src/bad.py")].as_ref().unwrap_err();
        assert_eq!(bad.reason, "syntax error near line 1");
        assert_eq!(bad.path, "bad.py");

        let boom = results[&PathBuf::from("/src/boom.py")].as_ref().unwrap_err();
        assert_eq!(boom.reason, "extractor panicked: exploded on boom.py");
    }

    #[test]
    fn test_rejects_too_many_workers() {
        let err = WorkerPool::new(MAX_WORKERS + 1).unwrap_err();
        assert!(err.is_configuration());
        assert!(WorkerPool::new(MAX_WORKERS).is_ok());
    }

    #[test]
    fn test_sequential_isolates_failures() {
        let pool = WorkerPool::new(0).unwrap();
        let results = pool
            .run(files(&["a.py", "bad.py", "boom.py", "z.py"]), flaky)
            .unwrap();
        assert_isolated(&results);
    }

    #[test]
    fn test_parallel_isolates_failures() {
        let pool = WorkerPool::new(3).unwrap();
        let results = pool
            .run(files(&["a.py", "bad.py", "boom.py", "z.py"]), flaky)
            .unwrap();
        assert_isolated(&results);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let names: Vec<String> = (0..40).map(|i| format!("m{:02}.py", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let sequential = WorkerPool::new(0).unwrap().run(files(&refs), flaky).unwrap();
        let parallel = WorkerPool::new(8).unwrap().run(files(&refs), flaky).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_input() {
        let results = WorkerPool::new(2).unwrap().run(Vec::new(), flaky).unwrap();
        assert!(results.is_empty());
    }
}
