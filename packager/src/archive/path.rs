//! Normalized `/`-separated entry paths.

use std::fmt;

use super::ArchiveError;

/// Path of an entry inside a [`Package`](super::Package).
///
/// Stored relative (no leading `/`), with empty segments collapsed. `.` and
/// `..` segments are rejected so a path can never escape its package.
/// [`Display`](fmt::Display) renders the absolute form (`/WEB-INF/web.xml`),
/// which is also the form filters match against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    pub fn new(raw: &str) -> Result<Self, ArchiveError> {
        let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() || segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(ArchiveError::InvalidPath(raw.to_string()));
        }
        Ok(Self(segments.join("/")))
    }

    /// Relative form, e.g. `WEB-INF/web.xml`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute form, e.g. `/WEB-INF/web.xml`.
    pub fn absolute(&self) -> String {
        format!("/{}", self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// True for single-segment paths (entries at the package root).
    pub fn is_top_level(&self) -> bool {
        !self.0.contains('/')
    }

    /// True if this path lives under directory `dir` (segment-wise, so
    /// `WEB-INFX/a` is not under `WEB-INF`).
    pub fn is_under(&self, dir: &str) -> bool {
        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            return true;
        }
        self.0
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = ArchiveError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}
