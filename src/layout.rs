use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::kind::ImageryKind;
use crate::tile::LocalIndex;

const COMPOSITE_DIR: &str = "composite";

/// On-disk layout of a run:
///
/// ```text
/// {root}/satellite/{col}.{row}.png
/// {root}/elevation/{col}.{row}.png
/// {root}/composite/{kind}.png
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_dir(&self, kind: ImageryKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn tile_path(&self, kind: ImageryKind, local: LocalIndex) -> PathBuf {
        self.tile_dir(kind).join(local.file_name())
    }

    pub fn composite_dir(&self) -> PathBuf {
        self.root.join(COMPOSITE_DIR)
    }

    pub fn composite_path(&self, kind: ImageryKind) -> PathBuf {
        self.composite_dir().join(format!("{}.png", kind.dir_name()))
    }

    /// Creates the directory tree. With `clean` set, an existing tree is
    /// removed first so no tile from an earlier run survives.
    pub async fn prepare(&self, clean: bool) -> Result<()> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("output {} must be a directory", self.root.display()),
            )));
        }

        if clean && self.root.exists() {
            debug!(root = %self.root.display(), "Removing previous output");
            fs::remove_dir_all(&self.root).await?;
        }

        for kind in ImageryKind::ALL.iter() {
            fs::create_dir_all(self.tile_dir(*kind)).await?;
        }
        fs::create_dir_all(self.composite_dir()).await?;

        Ok(())
    }
}
