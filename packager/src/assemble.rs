//! Orchestration for `packager compose`.
//!
//! Loads config and exploded packages from disk, runs the composer, and writes
//! the composed package back out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::debug;

use crate::compose::{ComposeError, Composer, Deployment};
use crate::core::classifier::classify_kind;
use crate::core::types::PackageKind;
use crate::io::config::{PackagerConfig, load_config};
use crate::io::exploded::{load_package, write_package};
use crate::processor::Processors;
use crate::protocol::RunnerArtifact;

/// Inputs for one `compose` run.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub application: PathBuf,
    pub auxiliaries: Vec<PathBuf>,
    /// Parent directory of the written package.
    pub output: PathBuf,
    pub config_path: PathBuf,
    /// Replace an existing output package directory.
    pub force: bool,
}

/// What a `compose` run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionSummary {
    pub package: String,
    pub input_kind: PackageKind,
    pub output_kind: PackageKind,
    pub auxiliaries: Vec<String>,
    pub entries: usize,
    pub output: PathBuf,
}

/// Build a composer from config, reading runner artifacts relative to `base_dir`.
pub fn composer_from_config(cfg: &PackagerConfig, base_dir: &Path) -> Result<Composer> {
    let layout = cfg.compile_layout()?;
    let artifacts = load_artifacts(&cfg.runner.artifacts, base_dir)?;
    Ok(
        Composer::new(cfg.runner.identity(), cfg.descriptor.clone(), layout)
            .with_artifacts(artifacts),
    )
}

fn load_artifacts(paths: &[PathBuf], base_dir: &Path) -> Result<Vec<RunnerArtifact>> {
    paths
        .iter()
        .map(|path| {
            let full = if path.is_absolute() {
                path.clone()
            } else {
                base_dir.join(path)
            };
            let name = full
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| anyhow!("runner artifact has no file name: {}", full.display()))?
                .to_string();
            let bytes = fs::read(&full)
                .with_context(|| format!("read runner artifact {}", full.display()))?;
            Ok(RunnerArtifact { name, bytes })
        })
        .collect()
}

pub fn compose_dirs(request: &ComposeRequest) -> Result<CompositionSummary> {
    let cfg = load_config(&request.config_path).context("load config")?;
    let base_dir = request.config_path.parent().unwrap_or_else(|| Path::new("."));
    let composer = composer_from_config(&cfg, base_dir)?;

    let application = load_package(&request.application).context("load application package")?;
    let input_kind =
        classify_kind(&application, composer.layout()).map_err(ComposeError::from)?;
    let auxiliaries = request
        .auxiliaries
        .iter()
        .map(|path| {
            load_package(path).with_context(|| format!("load auxiliary {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    let auxiliary_names = auxiliaries
        .iter()
        .map(|aux| aux.name().to_string())
        .collect();
    debug!(
        application = %application.name(),
        %input_kind,
        auxiliaries = auxiliaries.len(),
        "composing from directories"
    );

    let deployment = Deployment {
        name: application.name().to_string(),
        application,
        auxiliaries,
    };
    let composed = composer
        .compose_deployment(deployment, &Processors::new())
        .context("compose application package")?;
    let output_kind = classify_kind(&composed, composer.layout()).map_err(ComposeError::from)?;

    let target = request.output.join(composed.name());
    if request.force && target.exists() {
        fs::remove_dir_all(&target).with_context(|| format!("remove {}", target.display()))?;
    }
    let output = write_package(&composed, &request.output)?;

    Ok(CompositionSummary {
        package: composed.name().to_string(),
        input_kind,
        output_kind,
        auxiliaries: auxiliary_names,
        entries: composed.len(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Package;

    #[test]
    fn artifacts_resolve_against_config_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("libs")).expect("mkdir");
        fs::write(temp.path().join("libs/runner.jar"), "jar").expect("write");

        let mut cfg = PackagerConfig::default();
        cfg.runner.artifacts.push(PathBuf::from("libs/runner.jar"));
        let artifacts = load_artifacts(&cfg.runner.artifacts, temp.path()).expect("artifacts");
        assert_eq!(
            artifacts,
            vec![RunnerArtifact {
                name: "runner.jar".to_string(),
                bytes: b"jar".to_vec(),
            }]
        );
    }

    #[test]
    fn compose_dirs_writes_promoted_library() {
        let temp = tempfile::tempdir().expect("tempdir");
        let inputs = temp.path().join("in");
        let mut library = Package::new("util.jar");
        library.add_asset("com/acme/Util.class", "u").expect("add");
        let app_dir = write_package(&library, &inputs).expect("write");

        let summary = compose_dirs(&ComposeRequest {
            application: app_dir,
            auxiliaries: Vec::new(),
            output: temp.path().join("out"),
            config_path: temp.path().join("packager.toml"),
            force: false,
        })
        .expect("compose");
        assert_eq!(summary.package, "test.ear");
        assert_eq!(summary.input_kind, PackageKind::Library);
        assert_eq!(summary.output_kind, PackageKind::Composite);
        assert!(summary.output.join("arquillian-protocol.war/WEB-INF/web.xml").is_file());
        assert!(summary.output.join("util.jar/com/acme/Util.class").is_file());
    }
}
