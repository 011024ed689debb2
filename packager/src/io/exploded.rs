//! Exploded (unpacked) packages on disk.
//!
//! A package maps to a directory named after it. Directories whose names end
//! in one of [`PACKAGE_EXTENSIONS`] become nested packages; other directories
//! only contribute path segments.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;
use walkdir::WalkDir;

use crate::archive::{ArchivePath, Entry, Package};

pub const PACKAGE_EXTENSIONS: [&str; 4] = ["war", "jar", "ear", "rar"];

/// True if `path` names a nested package directory (`lib/util.jar/`).
pub fn is_package_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                PACKAGE_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
}

/// Load the directory `dir` as a package named after the directory.
pub fn load_package(dir: &Path) -> Result<Package> {
    if !dir.is_dir() {
        bail!("expected package directory {}", dir.display());
    }
    let name = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("package directory has no usable name: {}", dir.display()))?;
    let mut package = Package::new(name);

    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("relativize {}", entry.path().display()))?;
        let path = archive_path(relative)?;

        if entry.file_type().is_dir() {
            if is_package_dir(entry.path()) {
                let nested = load_package(entry.path())?;
                package.add(path, Entry::Package(nested))?;
                walker.skip_current_dir();
            }
            continue;
        }
        let bytes =
            fs::read(entry.path()).with_context(|| format!("read {}", entry.path().display()))?;
        package.add(path, Entry::Asset(bytes))?;
    }

    debug!(package = %package.name(), entries = package.len(), "loaded exploded package");
    Ok(package)
}

/// Write `package` to `parent/<package name>` and return that directory.
///
/// Fails if the target already exists.
pub fn write_package(package: &Package, parent: &Path) -> Result<PathBuf> {
    let target = parent.join(package.name());
    if target.exists() {
        bail!("{} already exists", target.display());
    }
    write_tree(package, &target)?;
    debug!(package = %package.name(), target = %target.display(), "wrote exploded package");
    Ok(target)
}

fn write_tree(package: &Package, target: &Path) -> Result<()> {
    fs::create_dir_all(target).with_context(|| format!("create {}", target.display()))?;
    for (path, entry) in package.entries() {
        let full = path
            .segments()
            .fold(target.to_path_buf(), |acc, segment| acc.join(segment));
        match entry {
            Entry::Asset(bytes) => {
                if let Some(dir) = full.parent() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("create {}", dir.display()))?;
                }
                fs::write(&full, bytes).with_context(|| format!("write {}", full.display()))?;
            }
            Entry::Package(nested) => write_tree(nested, &full)?,
        }
    }
    Ok(())
}

fn archive_path(relative: &Path) -> Result<ArchivePath> {
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    ArchivePath::new(&segments.join("/"))
        .with_context(|| format!("map {} to an archive path", relative.display()))
}
