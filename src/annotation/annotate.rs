//! Annotate trait and batched document stream.
use log::debug;

use crate::error::Error;

use super::Document;

/// Annotation backends turn cleaned lines into [Document]s.
///
/// A backend is expensive to create (model loading, process spawning), so it is
/// created once per input file and fed with batches of lines.
pub trait Annotate {
    /// Annotate a batch of lines.
    ///
    /// Must return exactly one [Document] per line, in the same order.
    fn annotate(&mut self, texts: &[String]) -> Result<Vec<Document>, Error>;
}

/// Lazy stream of [Document]s.
///
/// Pulls at most `batch_size` lines from `texts`, annotates them in one call
/// and yields the resulting documents one by one, in input order.
/// The stream is forward-only and stops at the first error.
pub struct Pipe<'a, I> {
    annotator: &'a mut dyn Annotate,
    texts: I,
    batch_size: usize,
    buffer: std::vec::IntoIter<Document>,
    done: bool,
}

impl<'a, I> Pipe<'a, I>
where
    I: Iterator<Item = Result<String, Error>>,
{
    /// A `batch_size` of 0 is read as 1.
    pub fn new(annotator: &'a mut dyn Annotate, texts: I, batch_size: usize) -> Self {
        Self {
            annotator,
            texts,
            batch_size: batch_size.max(1),
            buffer: Vec::new().into_iter(),
            done: false,
        }
    }

    /// Fill the buffer with the next annotated batch.
    /// Returns `Ok(false)` once the input is exhausted.
    fn next_batch(&mut self) -> Result<bool, Error> {
        let mut batch = Vec::with_capacity(self.batch_size.min(1024));
        for text in self.texts.by_ref().take(self.batch_size) {
            batch.push(text?);
        }

        if batch.is_empty() {
            return Ok(false);
        }

        debug!("annotating batch of {} lines", batch.len());
        let docs = self.annotator.annotate(&batch)?;
        if docs.len() != batch.len() {
            return Err(Error::Annotation(format!(
                "expected {} documents, got {}",
                batch.len(),
                docs.len()
            )));
        }

        self.buffer = docs.into_iter();
        Ok(true)
    }
}

impl<'a, I> Iterator for Pipe<'a, I>
where
    I: Iterator<Item = Result<String, Error>>,
{
    type Item = Result<Document, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(doc) = self.buffer.next() {
                return Some(Ok(doc));
            }
            if self.done {
                return None;
            }
            match self.next_batch() {
                Ok(true) => continue,
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
