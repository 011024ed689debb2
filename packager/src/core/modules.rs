//! Nested web module lookup inside composite packages.

use crate::archive::{ArchivePath, Entry, Package};
use crate::core::classifier::{ClassifyError, classify_kind};
use crate::core::layout::Layout;
use crate::core::types::PackageKind;

/// Result of searching a composite for web modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSearch {
    None,
    Single(ArchivePath),
    Ambiguous(Vec<ArchivePath>),
}

/// Collect every entry matching the web-module pattern, in path order.
pub fn find_web_modules(composite: &Package, layout: &Layout) -> ModuleSearch {
    let mut matches: Vec<ArchivePath> = composite
        .content(&layout.web_module)
        .into_iter()
        .map(|(path, _)| path.clone())
        .collect();
    match matches.len() {
        0 => ModuleSearch::None,
        1 => ModuleSearch::Single(matches.remove(0)),
        _ => ModuleSearch::Ambiguous(matches),
    }
}

/// Confirm that the entry at `path` is a nested package shaped like a web unit.
pub fn check_web_module(
    composite: &Package,
    path: &ArchivePath,
    layout: &Layout,
) -> Result<(), ClassifyError> {
    let module = match composite.get(path) {
        Some(Entry::Package(module)) => module,
        _ => {
            return Err(ClassifyError::NotAPackage {
                path: path.to_string(),
            });
        }
    };
    match classify_kind(module, layout)? {
        PackageKind::Web => Ok(()),
        found => Err(ClassifyError::UnexpectedKind {
            package: module.name().to_string(),
            expected: PackageKind::Web,
            found,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LayoutConfig;

    fn layout() -> Layout {
        Layout::compile(&LayoutConfig::default()).expect("layout")
    }

    fn path(raw: &str) -> ArchivePath {
        ArchivePath::new(raw).expect("path")
    }

    #[test]
    fn search_counts_matches() {
        let mut ear = Package::new("test.ear");
        ear.add_as_module(Package::new("util.jar")).expect("module");
        assert_eq!(find_web_modules(&ear, &layout()), ModuleSearch::None);

        ear.add_as_module(Package::new("b.war")).expect("module");
        assert_eq!(
            find_web_modules(&ear, &layout()),
            ModuleSearch::Single(path("b.war"))
        );

        ear.add_as_module(Package::new("a.war")).expect("module");
        assert_eq!(
            find_web_modules(&ear, &layout()),
            ModuleSearch::Ambiguous(vec![path("a.war"), path("b.war")])
        );
    }

    #[test]
    fn check_rejects_raw_bytes_and_non_web_modules() {
        let mut ear = Package::new("test.ear");
        ear.add_asset("raw.war", "not a package").expect("add");
        assert_eq!(
            check_web_module(&ear, &path("raw.war"), &layout()),
            Err(ClassifyError::NotAPackage {
                path: "/raw.war".to_string(),
            })
        );

        let mut inner = Package::new("inner.war");
        inner
            .add_asset("META-INF/application.xml", "<application/>")
            .expect("add");
        ear.add_as_module(inner).expect("module");
        assert!(matches!(
            check_web_module(&ear, &path("inner.war"), &layout()),
            Err(ClassifyError::UnexpectedKind {
                found: PackageKind::Composite,
                ..
            })
        ));
    }

    #[test]
    fn check_accepts_web_module() {
        let mut ear = Package::new("test.ear");
        ear.add_as_module(Package::new("app.war")).expect("module");
        assert_eq!(check_web_module(&ear, &path("app.war"), &layout()), Ok(()));
    }
}
