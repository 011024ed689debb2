//! Test-only helpers for building packages, descriptors and composers.

use std::sync::{Arc, Mutex};

use crate::archive::{ArchivePath, Package};
use crate::compose::Composer;
use crate::core::layout::Layout;
use crate::core::types::{DescriptorDefaults, LayoutConfig, RunnerIdentity};
use crate::io::exploded::write_package;
use crate::processor::Processors;

/// Composer with the stock runner identity, descriptor defaults and layout.
pub fn composer() -> Composer {
    Composer::new(
        RunnerIdentity::default(),
        DescriptorDefaults::default(),
        layout(),
    )
}

pub fn layout() -> Layout {
    Layout::compile(&LayoutConfig::default()).expect("default layout")
}

pub fn path(raw: &str) -> ArchivePath {
    ArchivePath::new(raw).expect("archive path")
}

/// `web.xml` (version 3.0, display name "shop") with one servlet per
/// `(name, class, pattern)`.
pub fn web_xml(servlets: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (name, class, pattern) in servlets {
        body.push_str(&format!(
            "  <servlet><servlet-name>{name}</servlet-name><servlet-class>{class}</servlet-class></servlet>\n\
             \x20 <servlet-mapping><servlet-name>{name}</servlet-name><url-pattern>{pattern}</url-pattern></servlet-mapping>\n"
        ));
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <web-app xmlns=\"http://java.sun.com/xml/ns/javaee\" version=\"3.0\">\n\
         \x20 <display-name>shop</display-name>\n{body}</web-app>\n"
    )
}

/// `application.xml` with one web module per `(web-uri, context-root)`.
pub fn application_xml(modules: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (uri, context_root) in modules {
        body.push_str(&format!(
            "  <module><web><web-uri>{uri}</web-uri><context-root>{context_root}</context-root></web></module>\n"
        ));
    }
    format!("<?xml version=\"1.0\"?>\n<application version=\"5\">\n{body}</application>\n")
}

/// Web package with a class file and, optionally, a `web.xml`.
pub fn web_package(name: &str, descriptor: Option<&str>) -> Package {
    let mut package = Package::new(name);
    package
        .add_asset("WEB-INF/classes/shop/CartServlet.class", "cart")
        .expect("add class");
    package.add_asset("index.html", "<html/>").expect("add page");
    if let Some(descriptor) = descriptor {
        package
            .add_asset("WEB-INF/web.xml", descriptor)
            .expect("add web.xml");
    }
    package
}

/// Flat library with a single class file.
pub fn library_package(name: &str) -> Package {
    let mut package = Package::new(name);
    package
        .add_asset("shop/Util.class", format!("{name} util"))
        .expect("add class");
    package
}

/// Composite holding `modules` at its root and an optional `application.xml`.
pub fn composite_package(name: &str, modules: Vec<Package>, descriptor: Option<&str>) -> Package {
    let mut package = Package::new(name);
    for module in modules {
        package.add_as_module(module).expect("add module");
    }
    if let Some(descriptor) = descriptor {
        package
            .add_asset("META-INF/application.xml", descriptor)
            .expect("add application.xml");
    }
    package
}

/// Processors that record the name of every package they see.
pub fn recording_processors() -> (Processors, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let processors = Processors::new().with(move |package: &mut Package| {
        sink.lock()
            .expect("processor log")
            .push(package.name().to_string());
    });
    (processors, seen)
}

/// Temp dir holding each package exploded at its root (`<tmp>/app.war/...`).
pub fn exploded(packages: &[Package]) -> tempfile::TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    for package in packages {
        write_package(package, temp.path()).expect("write package");
    }
    temp
}
