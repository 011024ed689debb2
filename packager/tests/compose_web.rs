//! Composition of web and library application packages.
//!
//! Drives `Composer::compose` end to end and inspects the returned package:
//! descriptor content, merged runner entries, attached libraries, and which
//! package the processors saw.

use packager::archive::Entry;
use packager::compose::Deployment;
use packager::core::types::PackageKind;
use packager::descriptor::{ServletRegistration, WebAppDescriptor};
use packager::processor::Processors;
use packager::protocol::RunnerArtifact;
use packager::test_support::{
    composer, library_package, path, recording_processors, web_package, web_xml,
};

fn runner_registration() -> ServletRegistration {
    ServletRegistration {
        name: "ArquillianServletRunner".to_string(),
        class: "org.jboss.arquillian.protocol.servlet.runner.ServletTestRunner".to_string(),
        url_patterns: vec!["/ArquillianServletRunner".to_string()],
    }
}

fn descriptor_of(package: &packager::archive::Package) -> WebAppDescriptor {
    let bytes = package
        .asset(&path("WEB-INF/web.xml"))
        .expect("web.xml present");
    WebAppDescriptor::parse(bytes).expect("parse web.xml")
}

#[test]
fn web_without_descriptor_adopts_runner_descriptor() {
    let (processors, seen) = recording_processors();
    let composed = composer()
        .compose(
            web_package("app.war", None),
            vec![library_package("aux.jar")],
            &processors,
        )
        .expect("compose");

    assert_eq!(composed.name(), "app.war");
    let descriptor = descriptor_of(&composed);
    assert_eq!(descriptor.servlets(), vec![runner_registration()]);
    assert_eq!(descriptor.version(), Some("2.5"));
    assert_eq!(
        descriptor.display_name().as_deref(),
        Some("Arquillian Servlet 2.5 Protocol")
    );

    assert!(composed.contains(&path("index.html")));
    assert!(composed.contains(&path("WEB-INF/classes/shop/CartServlet.class")));
    assert!(matches!(
        composed.get(&path("WEB-INF/lib/aux.jar")),
        Some(Entry::Package(lib)) if lib.name() == "aux.jar"
    ));
    assert_eq!(*seen.lock().expect("lock"), vec!["app.war".to_string()]);
}

#[test]
fn web_with_descriptor_gains_exactly_one_runner_entry() {
    let original = web_xml(&[("cart", "shop.Cart", "/cart/*")]);
    let app = web_package("app.war", Some(&original));
    let original_entries = app.len();

    let composed = composer()
        .compose(app, vec![library_package("aux.jar")], &Processors::new())
        .expect("compose");

    let descriptor = descriptor_of(&composed);
    let servlets = descriptor.servlets();
    assert_eq!(servlets.len(), 2);
    assert_eq!(servlets[0].name, "cart");
    assert_eq!(servlets[0].url_patterns, vec!["/cart/*".to_string()]);
    assert_eq!(servlets[1], runner_registration());
    assert_eq!(descriptor.version(), Some("3.0"));
    assert_eq!(descriptor.display_name().as_deref(), Some("shop"));

    // The runner's own descriptor is dropped; only the auxiliary is new.
    assert_eq!(composed.len(), original_entries + 1);
}

#[test]
fn runner_artifacts_are_merged_into_web_unit() {
    let artifacts = vec![RunnerArtifact {
        name: "servlet-runner.jar".to_string(),
        bytes: b"runner".to_vec(),
    }];
    let original = web_xml(&[]);
    let composed = composer()
        .with_artifacts(artifacts)
        .compose(
            web_package("app.war", Some(&original)),
            Vec::new(),
            &Processors::new(),
        )
        .expect("compose");

    assert_eq!(
        composed.asset(&path("WEB-INF/lib/servlet-runner.jar")),
        Some(&b"runner"[..])
    );
    assert_eq!(descriptor_of(&composed).servlets(), vec![runner_registration()]);
}

/// Composition is not idempotent: composing an already composed package
/// registers the runner a second time.
#[test]
fn recomposition_duplicates_runner_entry() {
    let once = composer()
        .compose(web_package("app.war", None), Vec::new(), &Processors::new())
        .expect("first compose");
    let twice = composer()
        .compose(once, Vec::new(), &Processors::new())
        .expect("second compose");

    let descriptor = descriptor_of(&twice);
    let runners = descriptor
        .servlets()
        .into_iter()
        .filter(|servlet| *servlet == runner_registration())
        .count();
    assert_eq!(runners, 2);

    let root = &descriptor.document().root;
    let named_runner = |element: &packager::descriptor::xml::Element| {
        element.child_text("servlet-name").as_deref() == Some("ArquillianServletRunner")
    };
    assert_eq!(root.children_named("servlet").filter(|e| named_runner(e)).count(), 2);
    assert_eq!(
        root.children_named("servlet-mapping")
            .filter(|e| named_runner(e))
            .count(),
        2
    );
}

#[test]
fn library_is_promoted_to_composite_with_runner_module() {
    let (processors, seen) = recording_processors();
    let composed = composer()
        .compose(
            library_package("util.jar"),
            vec![library_package("aux.jar")],
            &processors,
        )
        .expect("compose");

    assert_eq!(composed.name(), "test.ear");
    let top_level: Vec<String> = composed
        .entries()
        .filter(|(p, _)| p.is_top_level())
        .map(|(p, _)| p.as_str().to_string())
        .collect();
    assert_eq!(top_level, vec!["arquillian-protocol.war", "util.jar"]);

    let library = composed.nested(&path("util.jar")).expect("library module");
    assert_eq!(*library, library_package("util.jar"));

    let runner = composed
        .nested(&path("arquillian-protocol.war"))
        .expect("runner module");
    assert_eq!(descriptor_of(runner).servlets(), vec![runner_registration()]);

    assert!(composed.nested(&path("lib/aux.jar")).is_some());
    assert!(!composed.contains(&path("META-INF/application.xml")));
    assert_eq!(
        *seen.lock().expect("lock"),
        vec!["arquillian-protocol.war".to_string()]
    );

    let layout = packager::test_support::layout();
    assert_eq!(
        packager::core::classifier::classify_kind(&composed, &layout),
        Ok(PackageKind::Composite)
    );
}

#[test]
fn deployment_auxiliaries_land_in_composed_package() {
    let deployment = Deployment {
        name: "shop".to_string(),
        application: web_package("app.war", None),
        auxiliaries: vec![library_package("aux.jar"), library_package("extra.jar")],
    };
    let (processors, seen) = recording_processors();

    let composed = composer()
        .compose_deployment(deployment, &processors)
        .expect("compose");

    assert_eq!(composed.name(), "app.war");
    assert_eq!(
        composed.nested(&path("WEB-INF/lib/aux.jar")),
        Some(&library_package("aux.jar"))
    );
    assert_eq!(
        composed.nested(&path("WEB-INF/lib/extra.jar")),
        Some(&library_package("extra.jar"))
    );
    assert_eq!(*seen.lock().expect("lock"), vec!["app.war".to_string()]);
}
