//! Regex path filters used by content queries and merges.

use regex::Regex;

use super::{ArchiveError, ArchivePath};

/// Selects entries by matching their absolute path (`/a/b.xml`).
///
/// Patterns must match the whole path, so `.*\.war` selects `/app.war` but
/// not `/app.war.bak`.
#[derive(Debug, Clone)]
pub enum Filter {
    All,
    Include(Regex),
    Exclude(Regex),
}

impl Filter {
    pub fn include(pattern: &str) -> Result<Self, ArchiveError> {
        compile(pattern).map(Self::Include)
    }

    pub fn exclude(pattern: &str) -> Result<Self, ArchiveError> {
        compile(pattern).map(Self::Exclude)
    }

    pub fn allows(&self, path: &ArchivePath) -> bool {
        match self {
            Self::All => true,
            Self::Include(regex) => regex.is_match(&path.absolute()),
            Self::Exclude(regex) => !regex.is_match(&path.absolute()),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, ArchiveError> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|err| ArchiveError::InvalidFilter {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
