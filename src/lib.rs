//! Singleton dependency injection.
//!
//! Types implement [`Injectable`] to declare their constructor and injected
//! fields, a [`Catalog`] gathers them, and [`Resolver::bootstrap`] builds exactly
//! one instance of each, dependencies first. Once bootstrapped, instances are
//! fetched by type with [`Resolver::get`].
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

#[macro_use]
pub(crate) mod macros;

pub mod catalog;
pub mod constructor;
pub mod discover;
pub mod inject;
pub mod resolver;
pub mod store;

pub use pocket_core::{
    BoxError, Edge, Erased, LookupError, NotFound, ResolutionError, Result, TypeKey, error,
};

pub use catalog::{Catalog, Declaration, Injectable, TypeInfo, TypeKind};
pub use discover::CATALOG;
pub use inject::Inject;
pub use resolver::Resolver;
