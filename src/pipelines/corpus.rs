//! Corpus processing.
//!
//! Runs a [worker](super::worker) on a single file, or on every file of a folder.
//!
//! Folders are processed file by file, either sequentially or concurrently on a pool of
//! `workers` threads. Each file gets its own annotation backend, and its own output file:
//! workers share nothing but the (read-only) label table.
//!
//! Failures are per file: an error (or a panic) while processing a file is logged and
//! counted, and does not prevent other files from being processed.
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    path::{Path, PathBuf},
};

use log::{error, info, warn};
use rayon::prelude::*;

use crate::{error::Error, io::clean_partials, labels::Labels};

use super::{
    worker::{self, MergeOptions, Outcome},
    Pipeline,
};

pub const DEFAULT_WORKERS: usize = 4;

/// Outcome counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    fn add(&mut self, result: &Result<Outcome, Error>) {
        match result {
            Ok(Outcome::Done(_)) => self.done += 1,
            Ok(Outcome::Skipped) => self.skipped += 1,
            Err(_) => self.failed += 1,
        }
    }
}

pub struct MergeCorpus {
    src: PathBuf,
    dst: PathBuf,
    workers: usize,
    options: MergeOptions,
    labels: Labels,
}

impl MergeCorpus {
    pub fn new(
        src: PathBuf,
        dst: PathBuf,
        workers: usize,
        options: MergeOptions,
        labels: Labels,
    ) -> Self {
        Self {
            src,
            dst,
            workers,
            options,
            labels,
        }
    }

    /// list entries of the source folder (not recursive, no filtering),
    /// sorted by path.
    fn input_files(&self) -> Result<Vec<PathBuf>, Error> {
        let mut files = std::fs::read_dir(&self.src)?
            .filter_map(|entry| {
                entry.map_or_else(
                    |e| {
                        error!("error reading source directory: {}", e);
                        None
                    },
                    Some,
                )
            })
            .map(|entry| entry.path())
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Process a file, turning panics into errors.
    fn process(&self, src: &Path) -> Result<Outcome, Error> {
        let result = catch_unwind(AssertUnwindSafe(|| {
            worker::process_file(src, &self.dst, &self.options, &self.labels)
        }))
        .unwrap_or_else(|panic| {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::Custom(format!("worker panicked: {}", msg)))
        });

        if let Err(e) = &result {
            error!("could not process {:?}: {:?}", src, e);
        }
        result
    }
}

impl Pipeline<Summary> for MergeCorpus {
    fn run(&self) -> Result<Summary, Error> {
        if !self.dst.exists() {
            warn!("Destination {:?} does not exist. Creating", self.dst);
            std::fs::create_dir_all(&self.dst)?;
        }

        if !self.dst.is_dir() {
            return Err(Error::Custom(format!(
                "Destination has to be a directory: {:?}",
                self.dst
            )));
        }

        match clean_partials(&self.dst) {
            Ok(0) => (),
            Ok(n) => info!("removed {} stale temporary files from {:?}", n, self.dst),
            Err(e) => warn!("could not look for stale temporary files: {:?}", e),
        }

        let mut summary = Summary::default();

        // single file: synchronous, errors are returned
        if self.src.is_file() {
            let result = worker::process_file(&self.src, &self.dst, &self.options, &self.labels);
            summary.add(&result);
            result?;
            return Ok(summary);
        }

        let files = self.input_files()?;
        info!("{} files to process in {:?}", files.len(), self.src);

        let results: Vec<Result<Outcome, Error>> = if self.workers >= 2 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()?;
            pool.install(|| files.par_iter().map(|src| self.process(src)).collect())
        } else {
            files.iter().map(|src| self.process(src)).collect()
        };

        for result in &results {
            summary.add(result);
        }

        info!(
            "done: {} processed, {} skipped, {} failed",
            summary.done, summary.skipped, summary.failed
        );
        Ok(summary)
    }
}
