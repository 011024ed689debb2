//! Builder for the runner ("protocol") web package.

use thiserror::Error;
use tracing::debug;

use crate::archive::{ArchiveError, ArchivePath, Entry, Package};
use crate::core::layout::Layout;
use crate::core::merge::DescriptorMerger;
use crate::descriptor::DescriptorError;

/// A file shipped inside the runner package's library directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerArtifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RunnerPackageError {
    #[error("build runner descriptor")]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Build a fresh runner package: the default descriptor with the runner
/// servlet registered, plus each artifact under the web library directory.
pub fn build_runner_package(
    merger: &DescriptorMerger,
    layout: &Layout,
    artifacts: &[RunnerArtifact],
) -> Result<Package, RunnerPackageError> {
    let mut package = Package::new(layout.runner_archive_name.as_str());
    let descriptor = merger.merge(None)?;
    package.add(
        layout.web_descriptor.clone(),
        Entry::Asset(descriptor.to_bytes()?),
    )?;
    for artifact in artifacts {
        let path = ArchivePath::new(&format!("{}/{}", layout.web_library_dir, artifact.name))?;
        package.add(path, Entry::Asset(artifact.bytes.clone()))?;
    }
    debug!(
        package = %package.name(),
        artifacts = artifacts.len(),
        "built runner package"
    );
    Ok(package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DescriptorDefaults, LayoutConfig, RunnerIdentity};
    use crate::descriptor::WebAppDescriptor;

    fn fixtures() -> (DescriptorMerger, Layout) {
        (
            DescriptorMerger::new(RunnerIdentity::default(), DescriptorDefaults::default()),
            Layout::compile(&LayoutConfig::default()).expect("layout"),
        )
    }

    #[test]
    fn runner_package_holds_registered_descriptor() {
        let (merger, layout) = fixtures();
        let package = build_runner_package(&merger, &layout, &[]).expect("build");
        assert_eq!(package.name(), "arquillian-protocol.war");
        assert_eq!(package.len(), 1);
        let bytes = package.asset(&layout.web_descriptor).expect("descriptor");
        let descriptor = WebAppDescriptor::parse(bytes).expect("parse");
        assert_eq!(descriptor.servlets(), vec![merger.registration()]);
        assert_eq!(descriptor.version(), Some("2.5"));
    }

    #[test]
    fn artifacts_land_in_web_library_dir() {
        let (merger, layout) = fixtures();
        let artifacts = vec![RunnerArtifact {
            name: "servlet-runner.jar".to_string(),
            bytes: b"jar".to_vec(),
        }];
        let package = build_runner_package(&merger, &layout, &artifacts).expect("build");
        let path = ArchivePath::new("WEB-INF/lib/servlet-runner.jar").expect("path");
        assert_eq!(package.asset(&path), Some(&b"jar"[..]));
    }

    #[test]
    fn builds_are_deterministic() {
        let (merger, layout) = fixtures();
        let first = build_runner_package(&merger, &layout, &[]).expect("build");
        let second = build_runner_package(&merger, &layout, &[]).expect("build");
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_artifact_names_are_rejected() {
        let (merger, layout) = fixtures();
        let artifact = RunnerArtifact {
            name: "a.jar".to_string(),
            bytes: Vec::new(),
        };
        let err = build_runner_package(&merger, &layout, &[artifact.clone(), artifact])
            .expect_err("duplicate");
        assert!(matches!(
            err,
            RunnerPackageError::Archive(ArchiveError::EntryExists { .. })
        ));
    }
}
