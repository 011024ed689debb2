//! Orchestration for `packager classify`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::compose::ComposeError;
use crate::core::classifier::classify_kind;
use crate::core::types::PackageKind;
use crate::io::config::PackagerConfig;
use crate::io::exploded::load_package;

/// Load an exploded package and report its shape.
pub fn classify_dir(dir: &Path, cfg: &PackagerConfig) -> Result<PackageKind> {
    let layout = cfg.compile_layout()?;
    let package = load_package(dir).with_context(|| format!("load {}", dir.display()))?;
    let kind = classify_kind(&package, &layout).map_err(ComposeError::from)?;
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn classifies_exploded_web_module() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("app.war");
        fs::create_dir_all(dir.join("WEB-INF")).expect("mkdir");
        fs::write(dir.join("WEB-INF/web.xml"), "<web-app/>").expect("write");
        let kind = classify_dir(&dir, &PackagerConfig::default()).expect("classify");
        assert_eq!(kind, PackageKind::Web);
    }

    #[test]
    fn unsupported_shape_surfaces_compose_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("adapter.rar");
        fs::create_dir_all(&dir).expect("mkdir");
        let err = classify_dir(&dir, &PackagerConfig::default()).expect_err("unsupported");
        assert!(err.downcast_ref::<ComposeError>().is_some());
    }
}
