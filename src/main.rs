//! # corpus-merge
//!
//! Prepares raw text corpora (one document per line) for phrase embedding training.
//!
//! Each line is cleaned, annotated, and its entities (and optionally noun chunks) are merged
//! into single tokens. Sentences are then written as `token|tag` sequences:
//!
//! ```text
//! Ada_Lovelace|ENT wrote|VERB the|DET first_program|NOUN in|ADP London|ENT
//! ```
//!
//! ## Getting started
//!
//! ```sh
//! # built-in tokenizer only
//! corpus-merge comments/ merged/
//!
//! # external annotator (see scripts/spacy_annotate.py), merging noun chunks
//! corpus-merge -s -n 8 -t 2 --annotator-cmd python3 \
//!     --annotator-arg scripts/spacy_annotate.py --annotator-arg en_core_web_sm \
//!     comments/ merged/
//! ```
//!
//! Already existing output files are skipped, so an interrupted run can be restarted as is.
use corpus_merge::{
    annotation::Backend,
    error::Error,
    labels::Labels,
    pipelines::{MergeCorpus, MergeOptions, Pipeline},
};
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::CorpusMerge::from_args();
    debug!("cli args\n{:#?}", opt);

    let labels = match &opt.labels {
        Some(path) => Labels::from_path(path)?,
        None => Labels::default(),
    };

    let backend = match opt.annotator_cmd {
        Some(program) => Backend::Command {
            program,
            args: opt.annotator_args,
        },
        None => {
            if opt.noun_chunks {
                warn!("noun chunk merging needs a dependency parse, which the built-in tokenizer does not provide");
            }
            Backend::Rules
        }
    };

    let options = MergeOptions {
        threads: opt.threads,
        batch_size: opt.batch_size,
        noun_chunks: opt.noun_chunks,
        backend,
    };

    let corpus = MergeCorpus::new(opt.src, opt.dst, opt.workers, options, labels);
    let summary = corpus.run()?;

    if summary.failed > 0 {
        error!("{} files could not be processed", summary.failed);
        return Err(Error::Failures(summary.failed));
    }
    Ok(())
}
