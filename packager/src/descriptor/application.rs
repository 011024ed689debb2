//! Typed view over an enterprise `application.xml`.

use super::DescriptorError;
use super::xml::{Document, Element};

const ROOT: &str = "application";

/// A `<module><web>` binding of an archive to a context root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBinding {
    pub web_uri: String,
    pub context_root: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    document: Document,
}

impl ApplicationDescriptor {
    pub fn parse(bytes: &[u8]) -> Result<Self, DescriptorError> {
        let document = Document::parse(bytes)?;
        if document.root.local_name() != ROOT {
            return Err(DescriptorError::UnexpectedRoot {
                expected: ROOT,
                found: document.root.name.clone(),
            });
        }
        Ok(Self { document })
    }

    pub fn display_name(&self) -> Option<String> {
        self.document.root.child_text("display-name")
    }

    /// Web module bindings in document order. Non-web modules are skipped.
    pub fn web_modules(&self) -> Vec<ModuleBinding> {
        self.document
            .root
            .children_named("module")
            .filter_map(|module| module.child("web"))
            .map(|web| ModuleBinding {
                web_uri: web.child_text("web-uri").unwrap_or_default(),
                context_root: web.child_text("context-root").unwrap_or_default(),
            })
            .collect()
    }

    /// Append `<module><web><web-uri/><context-root/></web></module>`.
    pub fn add_web_module(&mut self, web_uri: &str, context_root: &str) {
        let root = &mut self.document.root;
        let mut web = Element::new(root.sibling_name("web"));
        web.push(Element::with_text(root.sibling_name("web-uri"), web_uri));
        web.push(Element::with_text(
            root.sibling_name("context-root"),
            context_root,
        ));
        let mut module = Element::new(root.sibling_name("module"));
        module.push(web);
        root.push(module);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DescriptorError> {
        self.document.to_bytes()
    }
}
