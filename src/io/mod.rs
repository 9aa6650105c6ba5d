/*!
# IO utilities

Lossy line reading of input files and crash-safe writing of output files.
!*/
mod lines;
mod output;

pub use lines::LineReader;
pub use output::{clean_partials, OutputFile};
