//! Batch execution over many files
//!
//! Files are processed on a rayon pool sized to the requested concurrency.
//! Outcomes are collected from an indexed parallel iterator, so they come
//! back in input order whatever the completion order. Each task opens, reads
//! and drops its own workbook; the compiled rule set is the only thing the
//! tasks share.

use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::document::{Document, FileOutcome};
use crate::error::{panic_message, FileError};
use crate::loader::open_workbook;
use crate::progress::{self, ProgressSender, ProgressSink};
use crate::rules::RuleSet;

/// Batch options
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Worker threads; 0 is treated as 1. Never more workers than files.
    pub concurrency: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            concurrency: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        }
    }
}

/// Applies one compiled rule set to batches of files
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: RuleSet,
    options: ExtractOptions,
}

impl Extractor {
    /// Extractor with default options
    pub fn new(rules: RuleSet) -> Self {
        Self::with_options(rules, ExtractOptions::default())
    }

    pub fn with_options(rules: RuleSet, options: ExtractOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Process every file and return one outcome per file, in input order
    pub fn run<P>(&self, files: &[P]) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
    {
        self.execute(files, &ProgressSender::disabled())
    }

    /// Like [`run`](Self::run), reporting progress to `sink` from a delivery
    /// thread. Every message has been delivered, and `finish` called, by the
    /// time this returns.
    pub fn run_with_progress<P, S>(&self, files: &[P], mut sink: S) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
        S: ProgressSink,
    {
        let (tx, rx) = progress::channel();
        thread::scope(|scope| {
            scope.spawn(move || progress::deliver(rx, &mut sink));
            let outcomes = self.execute(files, &tx);
            // Last sender gone: the delivery loop ends and the scope can join it
            drop(tx);
            outcomes
        })
    }

    /// Process a single file on the calling thread
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        log::debug!("processing {}", path.display());
        match open_workbook(path) {
            Ok(workbook) => FileOutcome::Extracted {
                path: path.to_path_buf(),
                document: Document::build(&self.rules, &workbook),
            },
            Err(error) => {
                log::warn!("{}: {}", path.display(), error);
                FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error,
                }
            }
        }
    }

    fn process_guarded(&self, path: &Path) -> FileOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.process_file(path))).unwrap_or_else(
            |payload| {
                let message = panic_message(payload.as_ref());
                log::error!("{}: task panicked: {}", path.display(), message);
                FileOutcome::Failed {
                    path: path.to_path_buf(),
                    error: FileError::Panicked(message),
                }
            },
        )
    }

    fn execute<P>(&self, files: &[P], progress: &ProgressSender) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
    {
        let total = files.len();
        let workers = worker_count(self.options.concurrency, total);
        let done = AtomicUsize::new(0);
        let task = |path: &P| self.process_reported(path.as_ref(), total, &done, progress);

        match ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => {
                log::debug!("extracting {} files on {} workers", total, workers);
                pool.install(|| files.par_iter().map(task).collect())
            }
            Err(e) => {
                log::warn!("worker pool unavailable ({}), extracting sequentially", e);
                files.iter().map(task).collect()
            }
        }
    }

    fn process_reported(
        &self,
        path: &Path,
        total: usize,
        done: &AtomicUsize,
        progress: &ProgressSender,
    ) -> FileOutcome {
        progress.send(|| format!("started {}", path.display()));

        let outcome = self.process_guarded(path);
        let status = match outcome.error() {
            Some(error) => format!("failed: {}", error),
            None => "done".to_string(),
        };

        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.send(|| format!("[{}/{}] {} {}", finished, total, path.display(), status));
        outcome
    }
}

fn worker_count(requested: usize, files: usize) -> usize {
    let requested = if requested == 0 {
        log::warn!("concurrency 0 requested, using 1 worker");
        1
    } else {
        requested
    };
    requested.min(files).max(1)
}
