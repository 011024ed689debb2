//! Caller-supplied post-processing hooks.

use std::fmt;

use tracing::debug;

use crate::archive::Package;

/// A hook run once over the package that ends up hosting the runner.
pub trait ArchiveProcessor: Send + Sync {
    fn process(&self, package: &mut Package);
}

impl<F> ArchiveProcessor for F
where
    F: Fn(&mut Package) + Send + Sync,
{
    fn process(&self, package: &mut Package) {
        self(package);
    }
}

/// Ordered set of hooks. Runs them in insertion order.
#[derive(Default)]
pub struct Processors {
    hooks: Vec<Box<dyn ArchiveProcessor>>,
}

impl Processors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: impl ArchiveProcessor + 'static) -> Self {
        self.push(hook);
        self
    }

    pub fn push(&mut self, hook: impl ArchiveProcessor + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn run(&self, package: &mut Package) {
        for (index, hook) in self.hooks.iter().enumerate() {
            debug!(index, package = %package.name(), "running archive processor");
            hook.process(package);
        }
    }
}

impl fmt::Debug for Processors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processors")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn hooks_run_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&seen);
        let second = Arc::clone(&seen);
        let processors = Processors::new()
            .with(move |package: &mut Package| {
                first.lock().expect("lock").push(format!("first:{}", package.name()));
            })
            .with(move |package: &mut Package| {
                second.lock().expect("lock").push(format!("second:{}", package.name()));
            });

        let mut package = Package::new("app.war");
        processors.run(&mut package);
        assert_eq!(
            *seen.lock().expect("lock"),
            vec!["first:app.war".to_string(), "second:app.war".to_string()]
        );
    }

    #[test]
    fn hooks_may_mutate_package() {
        let processors = Processors::new().with(|package: &mut Package| {
            package
                .add_asset("META-INF/processed", "yes")
                .expect("add");
        });
        let mut package = Package::new("app.war");
        processors.run(&mut package);
        assert_eq!(package.len(), 1);
        assert_eq!(processors.len(), 1);
    }
}
