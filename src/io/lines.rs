/*! Line reading

Input corpora are scraped text and may contain invalid UTF-8.
[LineReader] decodes lines lossily instead of failing on the whole file.
!*/
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::Error;

/// Reader that yields newline separated lines, without their line terminator.
#[derive(Debug)]
pub struct LineReader<T> {
    path: PathBuf,
    br: BufReader<T>,
    buf: Vec<u8>,
}

impl LineReader<File> {
    pub fn new(src: &Path) -> Result<Self, Error> {
        let f = File::open(src)?;
        Ok(Self::from_reader(src, f))
    }
}

impl<T> LineReader<T>
where
    T: Read,
{
    /// Wrap an arbitrary reader. `path` is only used for logging.
    pub fn from_reader(path: &Path, reader: T) -> Self {
        Self {
            path: path.to_path_buf(),
            br: BufReader::new(reader),
            buf: Vec::new(),
        }
    }

    /// Get next line (read until `\n`)
    fn next_line(&mut self) -> Option<Result<String, Error>> {
        self.buf.clear();
        match self.br.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Err(e) => Some(Err(Error::Io(e))),
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                let line = match String::from_utf8(std::mem::take(&mut self.buf)) {
                    Ok(line) => line,
                    Err(e) => {
                        debug!("invalid UTF-8 in {:?}, decoding lossily", self.path);
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                };
                Some(Ok(line))
            }
        }
    }
}

impl<T> Iterator for LineReader<T>
where
    T: Read,
{
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
