//! In-memory package trees.
//!
//! A [`Package`] is a named, ordered mapping from [`ArchivePath`] to [`Entry`].
//! Entries are byte payloads or nested packages; directories are implied by
//! paths and never stored.
//!
//! Plain [`Package::add`] refuses to overwrite an existing entry. Updating a
//! descriptor in place goes through [`Package::replace_entry`], which removes
//! the old entry before inserting the new one.

mod filter;
mod path;

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::trace;

pub use filter::Filter;
pub use path::ArchivePath;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchiveError {
    #[error("invalid archive path '{0}'")]
    InvalidPath(String),
    #[error("entry {path} already exists in {package}")]
    EntryExists { package: String, path: ArchivePath },
    #[error("entry {path} in {package} is not a nested package")]
    NotAPackage { package: String, path: ArchivePath },
    #[error("invalid filter pattern '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },
}

/// Content stored at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Asset(Vec<u8>),
    Package(Package),
}

impl Entry {
    pub fn as_asset(&self) -> Option<&[u8]> {
        match self {
            Self::Asset(bytes) => Some(bytes),
            Self::Package(_) => None,
        }
    }

    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Self::Package(package) => Some(package),
            Self::Asset(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    entries: BTreeMap<ArchivePath, Entry>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased extension of the package name (`war` for `app.war`).
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ArchivePath, &Entry)> {
        self.entries.iter()
    }

    pub fn contains(&self, path: &ArchivePath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &ArchivePath) -> Option<&Entry> {
        self.entries.get(path)
    }

    /// Byte payload at `path`, if the entry exists and is not a package.
    pub fn asset(&self, path: &ArchivePath) -> Option<&[u8]> {
        self.get(path).and_then(Entry::as_asset)
    }

    pub fn nested(&self, path: &ArchivePath) -> Option<&Package> {
        self.get(path).and_then(Entry::as_package)
    }

    pub fn nested_mut(&mut self, path: &ArchivePath) -> Result<&mut Package, ArchiveError> {
        match self.entries.get_mut(path) {
            Some(Entry::Package(package)) => Ok(package),
            _ => Err(ArchiveError::NotAPackage {
                package: self.name.clone(),
                path: path.clone(),
            }),
        }
    }

    /// True if any entry lives under directory `dir`.
    pub fn has_entries_under(&self, dir: &str) -> bool {
        self.entries.keys().any(|path| path.is_under(dir))
    }

    /// Insert a new entry. Existing entries are never overwritten.
    pub fn add(&mut self, path: ArchivePath, entry: Entry) -> Result<(), ArchiveError> {
        if self.entries.contains_key(&path) {
            return Err(ArchiveError::EntryExists {
                package: self.name.clone(),
                path,
            });
        }
        self.entries.insert(path, entry);
        Ok(())
    }

    pub fn add_asset(&mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Result<(), ArchiveError> {
        self.add(ArchivePath::new(path)?, Entry::Asset(bytes.into()))
    }

    pub fn delete(&mut self, path: &ArchivePath) -> Option<Entry> {
        self.entries.remove(path)
    }

    /// Delete whatever sits at `path`, then insert `entry`. Returns the
    /// previous entry, if any.
    pub fn replace_entry(&mut self, path: ArchivePath, entry: Entry) -> Option<Entry> {
        let previous = self.delete(&path);
        self.entries.insert(path, entry);
        previous
    }

    /// Entries whose path passes `filter`, in path order.
    pub fn content(&self, filter: &Filter) -> Vec<(&ArchivePath, &Entry)> {
        self.entries
            .iter()
            .filter(|(path, _)| filter.allows(path))
            .collect()
    }

    /// Copy every entry of `other` that passes `filter` into this package.
    ///
    /// Incoming entries win over existing ones at the same path. Returns the
    /// number of entries copied.
    pub fn merge(&mut self, other: &Package, filter: &Filter) -> usize {
        let mut merged = 0;
        for (path, entry) in other.content(filter) {
            if self.entries.insert(path.clone(), entry.clone()).is_some() {
                trace!(package = %self.name, %path, "merge replaced existing entry");
            }
            merged += 1;
        }
        merged
    }

    /// Add `module` at the package root under its own name.
    pub fn add_as_module(&mut self, module: Package) -> Result<ArchivePath, ArchiveError> {
        let path = ArchivePath::new(module.name())?;
        self.add(path.clone(), Entry::Package(module))?;
        Ok(path)
    }

    /// Add each library under `dir`, named after the library.
    pub fn add_as_libraries(
        &mut self,
        dir: &str,
        libraries: impl IntoIterator<Item = Package>,
    ) -> Result<Vec<ArchivePath>, ArchiveError> {
        let mut added = Vec::new();
        for library in libraries {
            let path = ArchivePath::new(&format!("{}/{}", dir, library.name()))?;
            self.add(path.clone(), Entry::Package(library))?;
            added.push(path);
        }
        Ok(added)
    }
}
