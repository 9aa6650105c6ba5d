//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use corpus_merge::pipelines::{DEFAULT_BATCH_SIZE, DEFAULT_THREADS, DEFAULT_WORKERS};
use lazy_static::lazy_static;
use structopt::StructOpt;

lazy_static! {
    static ref WORKERS: String = DEFAULT_WORKERS.to_string();
    static ref THREADS: String = DEFAULT_THREADS.to_string();
    static ref BATCH_SIZE: String = DEFAULT_BATCH_SIZE.to_string();
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "corpus-merge",
    about = "Annotate a text corpus and merge entities/noun chunks into token|tag lines."
)]
/// Merge command and parameters.
///
/// ```sh
/// corpus-merge 0.3.0
///
/// USAGE:
///     corpus-merge [FLAGS] [OPTIONS] <src> <dst>
///
/// FLAGS:
///     -s, --noun-chunks    merge trimmed noun chunks
///
/// OPTIONS:
///     -n, --workers <workers>          number of files processed concurrently [default: 4]
///     -t, --threads <threads>          number of annotation threads per worker [default: 1]
///     -b, --batch-size <batch-size>    number of lines annotated at once [default: 10000]
///     -l, --labels <labels>            JSON entity label table
///         --annotator-cmd <program>    external annotation program
///         --annotator-arg <arg>...     argument passed to the annotation program
///
/// ARGS:
///     <src>    input file, or folder of input files
///     <dst>    output folder
/// ```
pub struct CorpusMerge {
    #[structopt(parse(from_os_str), help = "input file, or folder of input files")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "output folder")]
    pub dst: PathBuf,
    #[structopt(
        short = "n",
        long = "workers",
        default_value = WORKERS.as_str(),
        help = "number of files processed concurrently"
    )]
    pub workers: usize,
    #[structopt(
        short = "t",
        long = "threads",
        default_value = THREADS.as_str(),
        help = "number of annotation threads per worker"
    )]
    pub threads: usize,
    #[structopt(
        short = "b",
        long = "batch-size",
        default_value = BATCH_SIZE.as_str(),
        help = "number of lines annotated at once"
    )]
    pub batch_size: usize,
    #[structopt(short = "s", long = "noun-chunks", help = "merge trimmed noun chunks")]
    pub noun_chunks: bool,
    #[structopt(
        short = "l",
        long = "labels",
        parse(from_os_str),
        help = "JSON entity label table (object mapping entity types to output tags)"
    )]
    pub labels: Option<PathBuf>,
    #[structopt(
        long = "annotator-cmd",
        parse(from_os_str),
        help = "external annotation program. Uses the built-in tokenizer if absent"
    )]
    pub annotator_cmd: Option<PathBuf>,
    #[structopt(
        long = "annotator-arg",
        help = "argument passed to the annotation program (repeatable)",
        number_of_values = 1
    )]
    pub annotator_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opt = CorpusMerge::from_iter(["corpus-merge", "in", "out"]);
        assert_eq!(opt.src, PathBuf::from("in"));
        assert_eq!(opt.workers, DEFAULT_WORKERS);
        assert_eq!(opt.threads, DEFAULT_THREADS);
        assert_eq!(opt.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!opt.noun_chunks);
        assert!(opt.annotator_cmd.is_none());
    }

    #[test]
    fn annotator() {
        let opt = CorpusMerge::from_iter([
            "corpus-merge",
            "-s",
            "-n",
            "1",
            "--annotator-cmd",
            "python3",
            "--annotator-arg",
            "scripts/spacy_annotate.py",
            "--annotator-arg",
            "en_core_web_sm",
            "in",
            "out",
        ]);
        assert!(opt.noun_chunks);
        assert_eq!(opt.workers, 1);
        assert_eq!(opt.annotator_cmd, Some(PathBuf::from("python3")));
        assert_eq!(
            opt.annotator_args,
            vec!["scripts/spacy_annotate.py", "en_core_web_sm"]
        );
    }
}
