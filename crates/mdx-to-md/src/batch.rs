//! Converting many documents at once.

use crate::mdx_to_md;
use crate::options::MdxToMdOptions;
use mdx_to_md_core::MdxError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Options for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to number of CPU cores.
    pub max_threads: Option<usize>,
    /// Whether to continue processing after an error. Defaults to true.
    pub continue_on_error: Option<bool>,
}

/// Result for a single document in a batch.
#[derive(Debug)]
pub struct BatchResult {
    /// Path of the document.
    pub path: PathBuf,
    /// Markdown on success.
    pub result: Result<String, MdxError>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// Total number of documents submitted.
    pub total: u32,
    /// Number of successful conversions.
    pub succeeded: u32,
    /// Number of failed conversions.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Result of batch processing containing all results and statistics.
#[derive(Debug)]
pub struct BatchProcessingResult {
    /// Results in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Convert every document in `paths`.
///
/// Conversions are independent and run in parallel. With
/// `continue_on_error` set to false they run sequentially instead and
/// processing stops after the first failure.
pub fn mdx_to_md_batch<P>(
    paths: &[P],
    options: Option<&MdxToMdOptions>,
    batch: &BatchOptions,
) -> BatchProcessingResult
where
    P: AsRef<Path> + Sync,
{
    let start = Instant::now();
    let continue_on_error = batch.continue_on_error.unwrap_or(true);

    let pool = batch.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
            .ok()
    });

    let total = paths.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process = |path: &P| -> BatchResult {
        let path = path.as_ref();
        let result = mdx_to_md(path, options);
        match &result {
            Ok(_) => succeeded.fetch_add(1, Ordering::Relaxed),
            Err(err) => {
                log::debug!("Converting {} failed: {}", path.display(), err);
                failed.fetch_add(1, Ordering::Relaxed)
            }
        };
        BatchResult {
            path: path.to_path_buf(),
            result,
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        match pool {
            Some(pool) => pool.install(|| paths.par_iter().map(process).collect()),
            None => paths.par_iter().map(process).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let result = process(path);
            let stop = result.result.is_err();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}
