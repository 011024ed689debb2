//! Structural classification of packages.

use thiserror::Error;

use crate::archive::Package;
use crate::core::layout::Layout;
use crate::core::types::PackageKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("can not handle package {package} of type '{kind}'")]
    UnsupportedPackageType { package: String, kind: String },
    #[error("entry {path} is not a nested package")]
    NotAPackage { path: String },
    #[error("package {package} is a {found} unit, expected {expected}")]
    UnexpectedKind {
        package: String,
        expected: PackageKind,
        found: PackageKind,
    },
}

/// A package tagged with its shape. Composition matches on this exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    Web(Package),
    Library(Package),
    Composite(Package),
}

impl Unit {
    pub fn kind(&self) -> PackageKind {
        match self {
            Self::Web(_) => PackageKind::Web,
            Self::Library(_) => PackageKind::Library,
            Self::Composite(_) => PackageKind::Composite,
        }
    }

    pub fn package(&self) -> &Package {
        match self {
            Self::Web(package) | Self::Library(package) | Self::Composite(package) => package,
        }
    }

    pub fn into_package(self) -> Package {
        match self {
            Self::Web(package) | Self::Library(package) | Self::Composite(package) => package,
        }
    }
}

/// Tag `package` with its shape. See [`classify_kind`].
pub fn classify(package: Package, layout: &Layout) -> Result<Unit, ClassifyError> {
    Ok(match classify_kind(&package, layout)? {
        PackageKind::Web => Unit::Web(package),
        PackageKind::Library => Unit::Library(package),
        PackageKind::Composite => Unit::Composite(package),
    })
}

/// Determine a package's shape from its content.
///
/// - `Composite` if it carries an application descriptor or a top-level
///   entry matching the web-module pattern.
/// - `Web` if anything lives under the web root (`WEB-INF/`).
/// - Otherwise the name's extension decides (`ear`, `war`, `jar`).
/// - A non-empty package without an extension is a flat library.
///
/// Anything else (an unknown extension, or an empty unnamed bundle) is
/// unsupported.
pub fn classify_kind(package: &Package, layout: &Layout) -> Result<PackageKind, ClassifyError> {
    if package.contains(&layout.application_descriptor)
        || package
            .entries()
            .any(|(path, _)| path.is_top_level() && layout.web_module.allows(path))
    {
        return Ok(PackageKind::Composite);
    }
    if package.has_entries_under(layout.web_root()) {
        return Ok(PackageKind::Web);
    }
    match package.extension().as_deref() {
        Some("ear") => Ok(PackageKind::Composite),
        Some("war") => Ok(PackageKind::Web),
        Some("jar") => Ok(PackageKind::Library),
        None if !package.is_empty() => Ok(PackageKind::Library),
        other => Err(ClassifyError::UnsupportedPackageType {
            package: package.name().to_string(),
            kind: other.map_or_else(|| "<none>".to_string(), |ext| format!(".{ext}")),
        }),
    }
}
