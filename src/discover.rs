//! Link-time discovery of injectable types.
//!
//! Crates submit registrars to [`CATALOG`] next to the types they register, and
//! [`Catalog::discover`] runs all of them:
//!
//! ```
//! use pocket::{CATALOG, Catalog, Declaration, Injectable, Resolver};
//!
//! struct Metrics;
//!
//! impl Injectable for Metrics {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.constructor(|| Metrics);
//!     }
//! }
//!
//! #[linkme::distributed_slice(CATALOG)]
//! static METRICS: fn(&mut Catalog) = |catalog| {
//!     catalog.register::<Metrics>();
//! };
//!
//! let resolver = Resolver::bootstrap(Catalog::discover())?;
//! assert!(resolver.contains::<Metrics>());
//! # Ok::<(), pocket::ResolutionError>(())
//! ```
#![allow(unsafe_code)]

use linkme::distributed_slice;

use crate::catalog::Catalog;

/// Registrars collected at link time.
#[distributed_slice]
pub static CATALOG: [fn(&mut Catalog)] = [..];

impl Catalog {
    /// Builds a catalog from every registrar submitted to [`CATALOG`].
    ///
    /// Registrars run in link order, which is unspecified.
    #[must_use]
    pub fn discover() -> Self {
        let mut catalog = Self::new();
        for register in CATALOG {
            register(&mut catalog);
        }
        debug!(registrars = CATALOG.len(), types = catalog.len(), "discovered catalog");

        catalog
    }
}
