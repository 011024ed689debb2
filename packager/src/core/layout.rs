//! Compiled form of [`LayoutConfig`].

use crate::archive::{ArchiveError, ArchivePath, Filter};
use crate::core::types::LayoutConfig;

#[derive(Debug, Clone)]
pub struct Layout {
    pub web_descriptor: ArchivePath,
    pub application_descriptor: ArchivePath,
    /// Selects nested web modules inside a composite.
    pub web_module: Filter,
    /// Drops the runner's own descriptor when merging into a unit that has one.
    pub descriptor_exclude: Filter,
    pub web_library_dir: String,
    pub composite_library_dir: String,
    pub runner_archive_name: String,
    pub wrapper_archive_name: String,
}

impl Layout {
    pub fn compile(config: &LayoutConfig) -> Result<Self, ArchiveError> {
        Ok(Self {
            web_descriptor: ArchivePath::new(&config.web_descriptor)?,
            application_descriptor: ArchivePath::new(&config.application_descriptor)?,
            web_module: Filter::include(&config.web_module_pattern)?,
            descriptor_exclude: Filter::exclude(&config.descriptor_exclude_pattern)?,
            web_library_dir: ArchivePath::new(&config.web_library_dir)?.as_str().to_string(),
            composite_library_dir: ArchivePath::new(&config.composite_library_dir)?
                .as_str()
                .to_string(),
            runner_archive_name: config.runner_archive_name.clone(),
            wrapper_archive_name: config.wrapper_archive_name.clone(),
        })
    }

    /// First segment of the web descriptor path (`WEB-INF`). Any entry under
    /// it marks a package as a web unit.
    pub fn web_root(&self) -> &str {
        self.web_descriptor
            .segments()
            .next()
            .unwrap_or(self.web_descriptor.as_str())
    }
}
