//! Composition of an application package with the runner package.
//!
//! [`Composer::compose`] builds the runner package once, classifies the
//! application and dispatches on its shape:
//!
//! - **web**: merge the runner servlet into the unit's `web.xml` (or take the
//!   runner's descriptor when there is none), copy in the runner entries,
//!   attach auxiliaries under `WEB-INF/lib`, run processors.
//! - **library**: wrap it as the only module of a new composite, then take the
//!   composite route.
//! - **composite**: enrich its single web module in place, or add the runner
//!   as a new module when it has none. Several web modules are an error.
//!   Auxiliaries always attach to the composite.
//!
//! A failure at any step aborts the whole composition; there are no partial
//! results.

use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::archive::{ArchiveError, Entry, Filter, Package};
use crate::core::classifier::{ClassifyError, Unit, classify};
use crate::core::layout::Layout;
use crate::core::merge::DescriptorMerger;
use crate::core::modules::{ModuleSearch, check_web_module, find_web_modules};
use crate::core::types::{DescriptorDefaults, RunnerIdentity};
use crate::descriptor::{ApplicationDescriptor, DescriptorError};
use crate::processor::Processors;
use crate::protocol::{RunnerArtifact, RunnerPackageError, build_runner_package};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Unsupported(#[from] ClassifyError),
    #[error(
        "multiple web modules found in {composite} ({}); can not determine which to enrich",
        .candidates.join(", ")
    )]
    AmbiguousNestedModule {
        composite: String,
        candidates: Vec<String>,
    },
    #[error("can not manipulate nested module {module} in {composite}")]
    IncompatibleNestedModule {
        composite: String,
        module: String,
        #[source]
        source: ClassifyError,
    },
    #[error("descriptor {path} in {package}")]
    Descriptor {
        package: String,
        path: String,
        #[source]
        source: DescriptorError,
    },
    #[error("build runner package")]
    RunnerPackage(#[from] RunnerPackageError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// An application package and the libraries that travel with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub name: String,
    pub application: Package,
    pub auxiliaries: Vec<Package>,
}

#[derive(Debug, Clone)]
pub struct Composer {
    merger: DescriptorMerger,
    layout: Layout,
    artifacts: Vec<RunnerArtifact>,
}

impl Composer {
    pub fn new(identity: RunnerIdentity, defaults: DescriptorDefaults, layout: Layout) -> Self {
        Self {
            merger: DescriptorMerger::new(identity, defaults),
            layout,
            artifacts: Vec::new(),
        }
    }

    /// Ship `artifacts` inside every runner package this composer builds.
    pub fn with_artifacts(mut self, artifacts: Vec<RunnerArtifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn compose_deployment(
        &self,
        deployment: Deployment,
        processors: &Processors,
    ) -> Result<Package, ComposeError> {
        let span = info_span!("deployment", name = %deployment.name);
        let _guard = span.enter();
        self.compose(deployment.application, deployment.auxiliaries, processors)
    }

    pub fn compose(
        &self,
        application: Package,
        auxiliaries: Vec<Package>,
        processors: &Processors,
    ) -> Result<Package, ComposeError> {
        let runner = build_runner_package(&self.merger, &self.layout, &self.artifacts)?;
        let unit = classify(application, &self.layout)?;
        let kind = unit.kind();
        debug!(package = %unit.package().name(), %kind, "classified application package");

        let composed = match unit {
            Unit::Web(mut web) => {
                self.compose_web(&mut web, auxiliaries, &runner, processors)?;
                web
            }
            Unit::Library(library) => {
                let composite = self.promote(library)?;
                self.compose_composite(composite, auxiliaries, runner, processors)?
            }
            Unit::Composite(composite) => {
                self.compose_composite(composite, auxiliaries, runner, processors)?
            }
        };

        info!(
            package = %composed.name(),
            input = %kind,
            entries = composed.len(),
            "composition complete"
        );
        Ok(composed)
    }

    fn compose_web(
        &self,
        web: &mut Package,
        auxiliaries: Vec<Package>,
        runner: &Package,
        processors: &Processors,
    ) -> Result<(), ComposeError> {
        let descriptor_path = &self.layout.web_descriptor;
        let merged = match web.asset(descriptor_path) {
            Some(existing) => Some(
                self.merger
                    .merge(Some(existing))
                    .and_then(|descriptor| descriptor.to_bytes())
                    .map_err(|source| ComposeError::Descriptor {
                        package: web.name().to_string(),
                        path: descriptor_path.to_string(),
                        source,
                    })?,
            ),
            None => None,
        };

        match merged {
            Some(bytes) => {
                web.replace_entry(descriptor_path.clone(), Entry::Asset(bytes));
                let copied = web.merge(runner, &self.layout.descriptor_exclude);
                debug!(package = %web.name(), copied, "merged runner into existing descriptor");
            }
            None => {
                let copied = web.merge(runner, &Filter::All);
                debug!(package = %web.name(), copied, "adopted runner descriptor");
            }
        }

        web.add_as_libraries(&self.layout.web_library_dir, auxiliaries)?;
        processors.run(web);
        Ok(())
    }

    fn promote(&self, library: Package) -> Result<Package, ComposeError> {
        let mut composite = Package::new(self.layout.wrapper_archive_name.as_str());
        let module = composite.add_as_module(library)?;
        debug!(composite = %composite.name(), %module, "wrapped library in composite");
        Ok(composite)
    }

    fn compose_composite(
        &self,
        mut composite: Package,
        auxiliaries: Vec<Package>,
        runner: Package,
        processors: &Processors,
    ) -> Result<Package, ComposeError> {
        match find_web_modules(&composite, &self.layout) {
            ModuleSearch::Single(path) => {
                check_web_module(&composite, &path, &self.layout).map_err(|source| {
                    ComposeError::IncompatibleNestedModule {
                        composite: composite.name().to_string(),
                        module: path.to_string(),
                        source,
                    }
                })?;
                debug!(composite = %composite.name(), module = %path, "enriching nested web module");
                let module = composite.nested_mut(&path)?;
                self.compose_web(module, Vec::new(), &runner, processors)?;
            }
            ModuleSearch::None => self.inject_runner_module(&mut composite, runner, processors)?,
            ModuleSearch::Ambiguous(paths) => {
                return Err(ComposeError::AmbiguousNestedModule {
                    composite: composite.name().to_string(),
                    candidates: paths.iter().map(ToString::to_string).collect(),
                });
            }
        }

        composite.add_as_libraries(&self.layout.composite_library_dir, auxiliaries)?;
        Ok(composite)
    }

    fn inject_runner_module(
        &self,
        composite: &mut Package,
        mut runner: Package,
        processors: &Processors,
    ) -> Result<(), ComposeError> {
        let descriptor_path = &self.layout.web_descriptor;
        let fresh = self
            .merger
            .merge(None)
            .and_then(|descriptor| descriptor.to_bytes())
            .map_err(|source| ComposeError::Descriptor {
                package: runner.name().to_string(),
                path: descriptor_path.to_string(),
                source,
            })?;
        runner.replace_entry(descriptor_path.clone(), Entry::Asset(fresh));
        processors.run(&mut runner);

        let runner_name = runner.name().to_string();
        let module = composite.add_as_module(runner)?;
        debug!(composite = %composite.name(), %module, "added runner as new module");

        let app_path = &self.layout.application_descriptor;
        let Some(existing) = composite.asset(app_path) else {
            return Ok(());
        };
        let updated = ApplicationDescriptor::parse(existing)
            .and_then(|mut descriptor| {
                descriptor.add_web_module(&runner_name, &runner_name);
                descriptor.to_bytes()
            })
            .map_err(|source| ComposeError::Descriptor {
                package: composite.name().to_string(),
                path: app_path.to_string(),
                source,
            })?;
        composite.replace_entry(app_path.clone(), Entry::Asset(updated));
        debug!(composite = %composite.name(), module = %runner_name, "bound runner module");
        Ok(())
    }
}
