// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to create scratch directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write scratch file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to keep image at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory in which scratch files are created
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Use `root` for scratch files, creating it if it does not exist
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::CreateDir {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a new file named `<prefix><random><suffix>`
    ///
    /// The file is flushed before returning so it can be read back by path.
    pub fn save(
        &self,
        prefix: &str,
        suffix: &str,
        bytes: &[u8],
    ) -> Result<ScratchFile, StorageError> {
        let mut file = Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.root)?;
        file.write_all(bytes)?;
        file.as_file().sync_all()?;

        debug!("Saved {} bytes to {}", bytes.len(), file.path().display());
        Ok(ScratchFile { file })
    }

    /// Reserve an empty scratch file for writers that need a path
    pub fn reserve(&self, prefix: &str, suffix: &str) -> Result<ScratchFile, StorageError> {
        let file = Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.root)?;
        Ok(ScratchFile { file })
    }
}

/// A scratch image on disk; deleted on drop unless persisted
#[derive(Debug)]
pub struct ScratchFile {
    file: NamedTempFile,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the stored bytes back
    pub fn read(&self) -> Result<Vec<u8>, StorageError> {
        Ok(fs::read(self.file.path())?)
    }

    /// Move the file to `target` so it outlives this handle
    ///
    /// Falls back to copying when a rename is not possible, e.g. when
    /// `target` lives on another filesystem.
    pub fn persist(self, target: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        let target = target.as_ref().to_path_buf();
        match self.file.persist(&target) {
            Ok(_) => Ok(target),
            Err(err) => {
                warn!(
                    "Rename to {} failed ({}), copying instead",
                    target.display(),
                    err.error
                );
                fs::copy(err.file.path(), &target).map_err(|source| StorageError::Persist {
                    path: target.clone(),
                    source,
                })?;
                Ok(target)
            }
        }
    }
}
