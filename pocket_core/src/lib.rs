//! Core types for `pocket` library.
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

pub mod erased;
pub mod error;
pub mod key;

pub use erased::Erased;
pub use error::{BoxError, Edge, LookupError, NotFound, ResolutionError, Result};
pub use key::TypeKey;
