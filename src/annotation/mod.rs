/*! Annotation

Annotated [Document]s and the backends producing them.

The linguistic analysis (tokenization, tagging, parsing, entity recognition) is done
by a backend implementing [Annotate]:

- [Rules]: built-in tokenizer/sentence splitter, without tagging nor parsing.
- [Command]: an external program (typically wrapping a statistical model) speaking JSON lines.

[Pipe] turns a stream of lines into a lazy, ordered stream of documents.
!*/
mod annotate;
mod command;
mod document;
pub mod lexeme;
mod rules;

use std::path::PathBuf;

pub use annotate::{Annotate, Pipe};
pub use command::{Command, BATCH_SIZE_ENV, THREADS_ENV};
pub use document::{span_text, Document, Entity, Sentence, Span, SpanKind, Token};
pub use rules::Rules;

use crate::error::Error;

/// Which backend to instantiate in each worker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Rules,
    Command { program: PathBuf, args: Vec<String> },
}

impl Backend {
    /// Instantiate the backend.
    pub fn build(&self, threads: usize, batch_size: usize) -> Result<Box<dyn Annotate>, Error> {
        match self {
            Backend::Rules => Ok(Box::new(Rules::new(threads)?)),
            Backend::Command { program, args } => Ok(Box::new(Command::spawn(
                program, args, threads, batch_size,
            )?)),
        }
    }
}
