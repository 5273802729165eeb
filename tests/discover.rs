use std::sync::Arc;

use linkme::distributed_slice;
use pocket::{CATALOG, Catalog, Declaration, Injectable, NotFound, Resolver, TypeKind};

trait Sink: Send + Sync {}

struct Settings;

impl Injectable for Settings {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(|| Settings);
    }
}

struct Mailer {
    settings: Arc<Settings>,
}

impl Injectable for Mailer {
    fn declare(decl: &mut Declaration<Self>) {
        decl.constructor(|settings: Arc<Settings>| Mailer { settings });
    }
}

#[distributed_slice(CATALOG)]
static MAILER: fn(&mut Catalog) = |catalog| {
    catalog.register::<Mailer>();
};

#[distributed_slice(CATALOG)]
static SETTINGS: fn(&mut Catalog) = |catalog| {
    catalog.register::<Settings>().interface::<dyn Sink>();
};

#[test]
fn test_discover_collects_every_registrar() {
    let catalog = Catalog::discover();

    assert_eq!(catalog.len(), 3);
    assert!(catalog.contains::<Mailer>());
    assert!(catalog.contains::<Settings>());
    assert_eq!(
        catalog.iter().filter(|info| info.kind() == TypeKind::Interface).count(),
        1
    );
}

#[test]
fn test_bootstrap_discovered_catalog() {
    let resolver = Resolver::bootstrap(Catalog::discover()).unwrap();

    assert_eq!(resolver.len(), 2);
    let mailer = resolver.get::<Mailer>().unwrap();
    assert!(Arc::ptr_eq(&mailer.settings, &resolver.get::<Settings>().unwrap()));
    assert_eq!(
        resolver.get::<dyn Sink>().err().map(|err| err.reason),
        Some(NotFound::Interface)
    );
}
