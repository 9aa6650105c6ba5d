//! Single file processing.
//!
//! A worker reads one input file and writes its merged counterpart in the destination folder,
//! under the same file name:
//!
//! 1. Lines are sanitized, and blank ones are dropped.
//! 1. Remaining lines are annotated in batches by a backend created for this file only.
//! 1. Each document is merged, serialized and written as soon as it is annotated.
//!
//! An existing output file means that the input has already been processed: the worker then
//! returns immediately. Output files only appear under their final name once complete
//! (see [crate::io::OutputFile]), so an interrupted run can simply be restarted.
use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

use log::{debug, info};

use crate::{
    annotation::{Backend, Pipe},
    error::Error,
    io::{LineReader, OutputFile},
    labels::Labels,
    merge::Merger,
    sanitize::{is_blank, sanitize},
};

pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Per-file processing options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Threads used by the annotation backend.
    pub threads: usize,
    /// Number of lines annotated at once.
    pub batch_size: usize,
    /// Merge trimmed noun chunks after entities.
    pub noun_chunks: bool,
    pub backend: Backend,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            batch_size: DEFAULT_BATCH_SIZE,
            noun_chunks: false,
            backend: Backend::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Lines read from the input, blank ones included.
    pub lines: usize,
    /// Annotated documents (non-blank lines).
    pub documents: usize,
    /// Sentences written.
    pub sentences: usize,
    /// Annotated tokens.
    pub tokens: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Output file already there.
    Skipped,
    Done(FileStats),
}

/// Location of the output file of `src` in `dst`.
pub fn output_path(src: &Path, dst: &Path) -> Result<PathBuf, Error> {
    let name = src
        .file_name()
        .ok_or_else(|| Error::Custom(format!("no file name in {:?}", src)))?;
    Ok(dst.join(name))
}

/// Process a file.
///
/// Errors abort this file only: nothing is left under the output path.
pub fn process_file(
    src: &Path,
    dst: &Path,
    options: &MergeOptions,
    labels: &Labels,
) -> Result<Outcome, Error> {
    let out_path = output_path(src, dst)?;
    if out_path.exists() {
        debug!("{:?} already exists, skipping {:?}", out_path, src);
        return Ok(Outcome::Skipped);
    }

    info!("working on {:?}", src);
    let timer = Instant::now();

    let reader = LineReader::new(src)?;
    let mut out = OutputFile::create(&out_path)?;
    let mut annotator = options.backend.build(options.threads, options.batch_size)?;
    let merger = Merger::new(labels, options.noun_chunks);

    let mut stats = FileStats::default();
    let mut lines = 0;
    let texts = reader
        .inspect(|_| lines += 1)
        .map(|line| line.map(|l| sanitize(&l)))
        .filter(|text| text.as_ref().map_or(true, |t| !is_blank(t)));

    for doc in Pipe::new(annotator.as_mut(), texts, options.batch_size) {
        let doc = doc?;
        stats.documents += 1;
        stats.tokens += doc.len();

        let block = merger.transform(&doc);
        stats.sentences += block.matches('\n').count();
        out.write_all(block.as_bytes())?;
    }
    stats.lines = lines;

    out.persist()?;
    drop(annotator);

    let elapsed = timer.elapsed().as_secs_f64();
    let throughput = if elapsed > 0.0 {
        stats.tokens as f64 / elapsed
    } else {
        0.0
    };
    info!(
        "{:?}: {} documents, {} sentences. tokenized, merged and wrote at {:.2} tok/sec",
        src, stats.documents, stats.sentences, throughput
    );

    Ok(Outcome::Done(stats))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn output_path_keeps_name() {
        assert_eq!(
            output_path(Path::new("/data/in/comments.txt"), Path::new("/data/out")).unwrap(),
            PathBuf::from("/data/out/comments.txt")
        );
        assert!(output_path(Path::new("/"), Path::new("/data/out")).is_err());
    }

    #[test]
    fn process_and_skip() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("in.txt");
        fs::write(&src, "*Hello world.*\n\n   \nSee [this](http://example.com) now\n").unwrap();

        let labels = Labels::default();
        let options = MergeOptions::default();
        let outcome = process_file(&src, dst.path(), &options, &labels).unwrap();
        assert_eq!(
            outcome,
            Outcome::Done(FileStats {
                lines: 4,
                documents: 2,
                sentences: 2,
                tokens: 6,
            })
        );

        let out = fs::read_to_string(dst.path().join("in.txt")).unwrap();
        assert_eq!(out, "Hello|? world|? .|PUNCT\nSee|? this|? now|?\n");

        let outcome = process_file(&src, dst.path(), &options, &labels).unwrap();
        assert_eq!(outcome, Outcome::Skipped);
    }

    #[test]
    fn missing_input() {
        let dst = tempfile::tempdir().unwrap();
        let res = process_file(
            Path::new("/nonexistent/in.txt"),
            dst.path(),
            &MergeOptions::default(),
            &Labels::default(),
        );
        assert!(matches!(res, Err(Error::Io(_))));
        assert!(!dst.path().join("in.txt").exists());
    }
}
