//! Deployment descriptors.
//!
//! [`xml`] holds a generic element tree; [`WebAppDescriptor`] and
//! [`ApplicationDescriptor`] are typed views over it for `WEB-INF/web.xml`
//! and `META-INF/application.xml`. Views only touch the elements they manage,
//! so anything else in a parsed document is written back unchanged.

mod application;
mod web;
pub mod xml;

use thiserror::Error;

pub use application::{ApplicationDescriptor, ModuleBinding};
pub use web::{ServletRegistration, WebAppDescriptor};

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("malformed descriptor at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    #[error("descriptor has no root element")]
    MissingRoot,
    #[error("expected root element <{expected}> but found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("serialize descriptor: {0}")]
    Write(String),
}
