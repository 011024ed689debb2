//! Packager configuration stored in `packager.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::layout::Layout;
use crate::core::types::{DescriptorDefaults, LayoutConfig, RunnerIdentity};

/// Default file name looked up by the CLI.
pub const CONFIG_FILE: &str = "packager.toml";

/// Packager configuration (TOML).
///
/// Every field has a default, so an empty or missing file composes with the
/// stock servlet runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct PackagerConfig {
    pub runner: RunnerConfig,
    pub descriptor: DescriptorDefaults,
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    pub servlet_name: String,
    pub servlet_class: String,
    /// Route the runner servlet is mapped to; must start with `/`.
    pub url_pattern: String,
    /// Files copied into the runner package's library directory. Relative
    /// paths resolve against the config file's directory.
    pub artifacts: Vec<PathBuf>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let identity = RunnerIdentity::default();
        Self {
            servlet_name: identity.servlet_name,
            servlet_class: identity.servlet_class,
            url_pattern: identity.url_pattern,
            artifacts: Vec::new(),
        }
    }
}

impl RunnerConfig {
    pub fn identity(&self) -> RunnerIdentity {
        RunnerIdentity {
            servlet_name: self.servlet_name.clone(),
            servlet_class: self.servlet_class.clone(),
            url_pattern: self.url_pattern.clone(),
        }
    }
}

impl PackagerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.runner.servlet_name.trim().is_empty() {
            return Err(anyhow!("runner.servlet_name must be non-empty"));
        }
        if self.runner.servlet_class.trim().is_empty() {
            return Err(anyhow!("runner.servlet_class must be non-empty"));
        }
        if !self.runner.url_pattern.starts_with('/') {
            return Err(anyhow!(
                "runner.url_pattern must start with '/', got '{}'",
                self.runner.url_pattern
            ));
        }
        if self.descriptor.version.trim().is_empty() {
            return Err(anyhow!("descriptor.version must be non-empty"));
        }
        if !self.layout.runner_archive_name.ends_with(".war") {
            return Err(anyhow!(
                "layout.runner_archive_name must end with .war, got '{}'",
                self.layout.runner_archive_name
            ));
        }
        if self.layout.wrapper_archive_name.trim().is_empty() {
            return Err(anyhow!("layout.wrapper_archive_name must be non-empty"));
        }
        self.compile_layout()?;
        Ok(())
    }

    pub fn compile_layout(&self) -> Result<Layout> {
        Layout::compile(&self.layout).context("compile layout")
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PackagerConfig::default()`.
pub fn load_config(path: &Path) -> Result<PackagerConfig> {
    if !path.exists() {
        let cfg = PackagerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PackagerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PackagerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
