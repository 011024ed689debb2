//! Typed view over a servlet `web.xml`.

use std::collections::HashMap;

use super::DescriptorError;
use super::xml::{Document, Element};

const ROOT: &str = "web-app";
const JAVAEE_NS: &str = "http://java.sun.com/xml/ns/javaee";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// One servlet plus the URL patterns mapped to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServletRegistration {
    pub name: String,
    pub class: String,
    pub url_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppDescriptor {
    document: Document,
}

impl Default for WebAppDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAppDescriptor {
    /// Empty `<web-app>` in the Java EE namespace.
    pub fn new() -> Self {
        let mut root = Element::new(ROOT);
        root.set_attribute("xmlns", JAVAEE_NS);
        root.set_attribute("xmlns:xsi", XSI_NS);
        Self {
            document: Document::new(root),
        }
    }

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

    pub fn with_version(mut self, version: &str) -> Self {
        self.document.root.set_attribute("version", version);
        self
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        let root = &mut self.document.root;
        match root.child_mut("display-name") {
            Some(existing) => existing.set_text(display_name),
            None => {
                let element = Element::with_text(root.sibling_name("display-name"), display_name);
                root.insert(0, element);
            }
        }
        self
    }

    pub fn version(&self) -> Option<&str> {
        self.document.root.attribute("version")
    }

    pub fn display_name(&self) -> Option<String> {
        self.document.root.child_text("display-name")
    }

    /// Servlets in document order with the patterns mapped to them.
    ///
    /// A servlet whose name is unique gets every mapping with that name.
    /// Repeated registrations of one name are paired with that name's
    /// mappings by position: the nth servlet gets the nth mapping.
    pub fn servlets(&self) -> Vec<ServletRegistration> {
        let root = &self.document.root;
        let servlets: Vec<(String, String)> = root
            .children_named("servlet")
            .map(|servlet| {
                (
                    servlet.child_text("servlet-name").unwrap_or_default(),
                    servlet.child_text("servlet-class").unwrap_or_default(),
                )
            })
            .collect();
        let mut mappings: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for mapping in root.children_named("servlet-mapping") {
            let name = mapping.child_text("servlet-name").unwrap_or_default();
            let patterns = mapping.children_named("url-pattern").map(Element::text).collect();
            mappings.entry(name).or_default().push(patterns);
        }
        let mut registrations_per_name: HashMap<&str, usize> = HashMap::new();
        for (name, _) in &servlets {
            *registrations_per_name.entry(name.as_str()).or_default() += 1;
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        servlets
            .iter()
            .map(|(name, class)| {
                let named = mappings.get(name).map(Vec::as_slice).unwrap_or_default();
                let url_patterns = if registrations_per_name[name.as_str()] == 1 {
                    named.concat()
                } else {
                    let index = seen.entry(name.as_str()).or_default();
                    let patterns = named.get(*index).cloned().unwrap_or_default();
                    *index += 1;
                    patterns
                };
                ServletRegistration {
                    name: name.clone(),
                    class: class.clone(),
                    url_patterns,
                }
            })
            .collect()
    }

    /// Append a `<servlet>` and its `<servlet-mapping>`.
    ///
    /// No check is made for an existing servlet with the same name.
    pub fn add_servlet(&mut self, registration: &ServletRegistration) {
        let root = &mut self.document.root;

        let mut servlet = Element::new(root.sibling_name("servlet"));
        servlet.push(Element::with_text(
            root.sibling_name("servlet-name"),
            registration.name.as_str(),
        ));
        servlet.push(Element::with_text(
            root.sibling_name("servlet-class"),
            registration.class.as_str(),
        ));

        let mut mapping = Element::new(root.sibling_name("servlet-mapping"));
        mapping.push(Element::with_text(
            root.sibling_name("servlet-name"),
            registration.name.as_str(),
        ));
        for pattern in &registration.url_patterns {
            mapping.push(Element::with_text(
                root.sibling_name("url-pattern"),
                pattern.as_str(),
            ));
        }

        root.push(servlet);
        root.push(mapping);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DescriptorError> {
        self.document.to_bytes()
    }
}
