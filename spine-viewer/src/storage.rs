//! Flat, name-addressed file storage owned by the viewer.
//!
//! Imported files are copied here so the viewer never depends on the location the user
//! picked them from. The directory holds at most one skeleton triplet and one background.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "SpineViewer";
const FILES_DIR: &str = "files";

pub trait Storage {
    /// Names of the regular files currently stored, sorted.
    fn list(&self) -> Result<Vec<String>>;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Writes `bytes` under `name`, replacing any previous content.
    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()>;

    fn remove(&mut self, name: &str) -> Result<()>;

    fn contains(&self, name: &str) -> bool {
        self.list()
            .map(|names| names.iter().any(|n| n == name))
            .unwrap_or(false)
    }
}

/// [`Storage`] backed by a single directory on disk.
#[derive(Clone, Debug)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    /// Opens (and creates if needed) a storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        Ok(Self { root })
    }

    /// Opens the per-user default location, `<data_dir>/SpineViewer/files`.
    pub fn open_default() -> Result<Self> {
        Self::open(default_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for DirStorage {
    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| Error::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.root, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path(name);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::MissingFile {
                name: name.to_string(),
            }),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(name);
        fs::write(&path, bytes).map_err(|e| Error::io(path, e))
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.path(name).is_file()
    }
}

fn default_root() -> PathBuf {
    let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
    path.push(APP_DIR);
    path.push(FILES_DIR);
    path
}
