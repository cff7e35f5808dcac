use crate::error::{Result, SynthesisError};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Files produced by one run, written together or not at all.
#[derive(Debug, Default)]
pub struct OutputBatch {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl OutputBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.push((path.into(), contents.into()));
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|(path, _)| path.as_path())
    }

    /// Stage every file as a temp file next to its target, then rename all of
    /// them into place. If staging fails no target is touched; staged temp
    /// files are removed when dropped.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut staged = Vec::with_capacity(self.files.len());
        for (path, contents) in self.files {
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&parent).map_err(|e| SynthesisError::io(e, &parent))?;

            let mut temp = NamedTempFile::new_in(&parent).map_err(|e| SynthesisError::io(e, &path))?;
            temp.write_all(&contents)
                .and_then(|_| temp.as_file().sync_all())
                .map_err(|e| SynthesisError::io(e, &path))?;
            debug!("Staged {} ({} bytes)", path.display(), contents.len());
            staged.push((path, temp));
        }

        let mut written = Vec::with_capacity(staged.len());
        for (path, temp) in staged {
            temp.persist(&path)
                .map_err(|e| SynthesisError::io(e.error, &path))?;
            written.push(path);
        }
        Ok(written)
    }
}
