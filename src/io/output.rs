/*! Output files

An output file is first written as a hidden temporary file next to its final location,
and renamed when complete. The existence of the final file thus means that it is complete,
and a crashed or killed run never leaves a truncated file behind under the final name.

Temporary files of a killed run stay behind as `.<name>.XXXXXX.partial`, see [clean_partials].
!*/
use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::error::Error;

const PARTIAL_SUFFIX: &str = ".partial";

pub struct OutputFile {
    path: PathBuf,
    writer: BufWriter<NamedTempFile>,
}

impl OutputFile {
    /// Create the temporary file for `path` in the same directory.
    pub fn create(path: &Path) -> Result<Self, Error> {
        let dir = path
            .parent()
            .ok_or_else(|| Error::Custom(format!("no parent directory for {:?}", path)))?;
        let name = path
            .file_name()
            .ok_or_else(|| Error::Custom(format!("no file name in {:?}", path)))?;
        let prefix = format!(".{}.", name.to_string_lossy());

        let tmp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(dir)?;
        debug!("writing {:?} to {:?}", path, tmp.path());

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(tmp),
        })
    }

    /// Flush and move the file to its final location.
    /// Fails if a file already exists there.
    pub fn persist(self) -> Result<(), Error> {
        let tmp = self.writer.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;
        tmp.persist_noclobber(&self.path)?;
        Ok(())
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Final file name of a temporary file name.
fn partial_target(name: &str) -> Option<&str> {
    let inner = name.strip_prefix('.')?.strip_suffix(PARTIAL_SUFFIX)?;
    inner
        .rsplit_once('.')
        .map(|(target, _)| target)
        .filter(|target| !target.is_empty())
}

/// Remove temporary files of interrupted runs whose output has been completed since.
///
/// Others are only reported, since another run may still be writing them.
/// Returns the number of removed files.
pub fn clean_partials(dir: &Path) -> Result<usize, Error> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let target = match path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(partial_target)
        {
            Some(target) => dir.join(target),
            None => continue,
        };

        if target.exists() {
            debug!("removing stale {:?}", path);
            std::fs::remove_file(&path)?;
            removed += 1;
        } else {
            warn!(
                "{:?} is left by an interrupted run (or being written by another one)",
                path
            );
        }
    }
    Ok(removed)
}
