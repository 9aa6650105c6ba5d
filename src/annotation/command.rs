//! External annotation process.
//!
//! Spawns a program once and talks to it over JSON lines:
//! each input line is written to the child's stdin as a JSON string, and a batch is
//! terminated by an empty line.
//! The child answers with exactly one JSON [Document] per line on its stdout, in order.
//!
//! The number of threads and the batch size are passed to the child through
//! the `CORPUS_MERGE_THREADS` and `CORPUS_MERGE_BATCH_SIZE` environment variables.
//! Its stderr is inherited.
//!
//! An annotation error leaves the child in an unknown state (possibly blocked on a full pipe):
//! it is killed, and the backend refuses any further batch.
use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, ChildStdout, Stdio},
};

use log::{debug, error, warn};

use crate::error::Error;

use super::{Annotate, Document};

pub const THREADS_ENV: &str = "CORPUS_MERGE_THREADS";
pub const BATCH_SIZE_ENV: &str = "CORPUS_MERGE_BATCH_SIZE";

pub struct Command {
    program: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    failed: bool,
}

impl Command {
    pub fn spawn(
        program: &Path,
        args: &[String],
        threads: usize,
        batch_size: usize,
    ) -> Result<Self, Error> {
        debug!("spawning annotator {:?} {:?}", program, args);
        let mut child = std::process::Command::new(program)
            .args(args)
            .env(THREADS_ENV, threads.to_string())
            .env(BATCH_SIZE_ENV, batch_size.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| Error::Annotation(format!("no stdout for {:?}", program)))?;

        Ok(Self {
            program: program.to_path_buf(),
            child,
            stdin,
            stdout,
            failed: false,
        })
    }

    /// Read `n` documents from the child's stdout.
    fn read_documents(stdout: &mut BufReader<ChildStdout>, n: usize) -> Result<Vec<Document>, Error> {
        let mut docs = Vec::with_capacity(n);
        let mut line = String::new();
        while docs.len() < n {
            line.clear();
            if stdout.read_line(&mut line)? == 0 {
                return Err(Error::Annotation(format!(
                    "annotator closed its output after {} of {} documents",
                    docs.len(),
                    n
                )));
            }
            docs.push(serde_json::from_str(&line)?);
        }
        Ok(docs)
    }
}

fn write_texts(stdin: &mut ChildStdin, texts: &[String]) -> Result<(), Error> {
    let mut w = BufWriter::new(stdin);
    for text in texts {
        serde_json::to_writer(&mut w, text)?;
        w.write_all(b"\n")?;
    }
    // end of batch
    w.write_all(b"\n")?;
    w.flush()?;
    Ok(())
}

impl Annotate for Command {
    fn annotate(&mut self, texts: &[String]) -> Result<Vec<Document>, Error> {
        if self.failed {
            return Err(Error::Annotation(format!(
                "annotator {:?} failed on a previous batch",
                self.program
            )));
        }

        let Self {
            program,
            child,
            stdin,
            stdout,
            failed,
        } = self;
        let stdin = stdin
            .as_mut()
            .ok_or_else(|| Error::Annotation(format!("stdin of {:?} is closed", program)))?;

        // write on another thread so that a child answering before having read
        // the whole batch cannot fill both pipes.
        std::thread::scope(|s| {
            let writer = s.spawn(move || write_texts(stdin, texts));
            let docs = Self::read_documents(stdout, texts.len());

            // the child may still be writing to (or reading from) a full pipe,
            // which would block the writer forever.
            if docs.is_err() {
                *failed = true;
                if let Err(e) = child.kill() {
                    warn!("could not kill annotator {:?}: {:?}", program, e);
                }
            }

            let written = writer
                .join()
                .map_err(|_| Error::Annotation("annotator writer thread panicked".to_string()))?;
            let docs = docs?;
            if written.is_err() {
                *failed = true;
            }
            written?;
            Ok(docs)
        })
    }
}

impl Drop for Command {
    fn drop(&mut self) {
        // closing stdin signals the end of input
        drop(self.stdin.take());
        if self.failed {
            // killing an already exited child is harmless
            let _ = self.child.kill();
        }
        match self.child.wait() {
            Ok(status) if !status.success() && !self.failed => {
                warn!("annotator {:?} exited with {}", self.program, status)
            }
            Ok(_) => (),
            Err(e) => error!("could not wait for annotator {:?}: {:?}", self.program, e),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use super::*;

    /// Shell annotator producing a fixed single-token document per input line.
    fn fake_annotator(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn one_document_per_line() {
        let script = r#"while read -r line; do [ -z "$line" ] && continue; echo '{"sentences":[{"tokens":[{"text":"x","pos":"NOUN"}]}]}'; done"#;
        let mut cmd = Command::spawn(Path::new("sh"), &fake_annotator(script), 1, 10).unwrap();

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let docs = cmd.annotate(&texts).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2].sentences[0].tokens[0].pos, "NOUN");

        // the same process serves the next batch
        let docs = cmd.annotate(&texts[..1]).unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn environment_is_forwarded() {
        let script = r#"read -r line; echo "{\"sentences\":[{\"tokens\":[{\"text\":\"$CORPUS_MERGE_THREADS-$CORPUS_MERGE_BATCH_SIZE\"}]}]}""#;
        let mut cmd = Command::spawn(Path::new("sh"), &fake_annotator(script), 3, 77).unwrap();
        let docs = cmd.annotate(&["hi".to_string()]).unwrap();
        assert_eq!(docs[0].sentences[0].tokens[0].text, "3-77");
    }

    #[test]
    fn early_exit_is_an_error() {
        let script = r#"read -r line; echo '{"sentences":[]}'"#;
        let mut cmd = Command::spawn(Path::new("sh"), &fake_annotator(script), 1, 10).unwrap();
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(cmd.annotate(&texts), Err(Error::Annotation(_))));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let script = r#"while read -r line; do [ -z "$line" ] && continue; echo 'nope'; done"#;
        let mut cmd = Command::spawn(Path::new("sh"), &fake_annotator(script), 1, 10).unwrap();
        assert!(matches!(
            cmd.annotate(&["a".to_string()]),
            Err(Error::Serde(_))
        ));
    }

    #[test]
    fn malformed_document_in_large_batch() {
        // answers garbage first, then keeps writing long lines without reading the batch
        let script = r#"read -r line; echo nope; big=$(printf '%2000s' '' | tr ' ' a); while read -r line; do echo "$big"; done"#;
        let mut cmd = Command::spawn(Path::new("sh"), &fake_annotator(script), 1, 5000).unwrap();
        let texts: Vec<String> = (0..5000)
            .map(|i| format!("line {} {}", i, "x".repeat(100)))
            .collect();

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let first = cmd.annotate(&texts).is_err();
            let next = cmd.annotate(&texts[..1]).is_err();
            tx.send((first, next)).unwrap();
        });
        assert_eq!(rx.recv_timeout(Duration::from_secs(30)), Ok((true, true)));
    }

    #[test]
    fn missing_program() {
        let res = Command::spawn(Path::new("/nonexistent/annotator"), &[], 1, 10);
        assert!(matches!(res, Err(Error::Io(_))));
    }
}
