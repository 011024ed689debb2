//! Shared deterministic types for composition.
//!
//! These types define stable contracts between core components and the
//! configuration file. They carry no I/O and are safe to share across threads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural shape of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Single web module with (at most) one `web.xml`.
    Web,
    /// Flat code/resource bundle.
    Library,
    /// Enterprise bundle of nested modules.
    Composite,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Web => "web",
            Self::Library => "library",
            Self::Composite => "composite",
        };
        f.write_str(label)
    }
}

/// Servlet registration injected into every composed deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerIdentity {
    pub servlet_name: String,
    pub servlet_class: String,
    pub url_pattern: String,
}

impl Default for RunnerIdentity {
    fn default() -> Self {
        Self {
            servlet_name: "ArquillianServletRunner".to_string(),
            servlet_class: "org.jboss.arquillian.protocol.servlet.runner.ServletTestRunner"
                .to_string(),
            url_pattern: "/ArquillianServletRunner".to_string(),
        }
    }
}

/// Metadata written into a descriptor created from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorDefaults {
    pub version: String,
    pub display_name: String,
}

impl Default for DescriptorDefaults {
    fn default() -> Self {
        Self {
            version: "2.5".to_string(),
            display_name: "Arquillian Servlet 2.5 Protocol".to_string(),
        }
    }
}

/// Paths, names and patterns that define where things live in a package.
///
/// Patterns are regexes matched against the whole absolute entry path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub web_descriptor: String,
    pub application_descriptor: String,
    pub web_module_pattern: String,
    pub descriptor_exclude_pattern: String,
    pub web_library_dir: String,
    pub composite_library_dir: String,
    pub runner_archive_name: String,
    pub wrapper_archive_name: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            web_descriptor: "WEB-INF/web.xml".to_string(),
            application_descriptor: "META-INF/application.xml".to_string(),
            web_module_pattern: r".*\.war".to_string(),
            descriptor_exclude_pattern: r".*web\.xml.*".to_string(),
            web_library_dir: "WEB-INF/lib".to_string(),
            composite_library_dir: "lib".to_string(),
            runner_archive_name: "arquillian-protocol.war".to_string(),
            wrapper_archive_name: "test.ear".to_string(),
        }
    }
}
