//! Runner registration merge for web descriptors.

use tracing::debug;

use crate::core::types::{DescriptorDefaults, RunnerIdentity};
use crate::descriptor::{DescriptorError, ServletRegistration, WebAppDescriptor};

/// Adds the runner servlet to an existing or default `web.xml`.
///
/// The merge is additive: it never looks for an earlier registration of the
/// same servlet, so merging twice yields two entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorMerger {
    identity: RunnerIdentity,
    defaults: DescriptorDefaults,
}

impl DescriptorMerger {
    pub fn new(identity: RunnerIdentity, defaults: DescriptorDefaults) -> Self {
        Self { identity, defaults }
    }

    pub fn registration(&self) -> ServletRegistration {
        ServletRegistration {
            name: self.identity.servlet_name.clone(),
            class: self.identity.servlet_class.clone(),
            url_patterns: vec![self.identity.url_pattern.clone()],
        }
    }

    /// Fresh descriptor holding only the default metadata.
    pub fn default_descriptor(&self) -> WebAppDescriptor {
        WebAppDescriptor::new()
            .with_version(&self.defaults.version)
            .with_display_name(&self.defaults.display_name)
    }

    /// Parse `existing` (or start from the default) and append the runner.
    pub fn merge(&self, existing: Option<&[u8]>) -> Result<WebAppDescriptor, DescriptorError> {
        let mut descriptor = match existing {
            Some(bytes) => WebAppDescriptor::parse(bytes)?,
            None => self.default_descriptor(),
        };
        debug!(
            servlet = %self.identity.servlet_name,
            existing = existing.is_some(),
            "registering runner servlet"
        );
        descriptor.add_servlet(&self.registration());
        Ok(descriptor)
    }
}
