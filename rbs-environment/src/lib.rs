//! RBS declaration environment
//!
//! Merges class and module declarations from any number of sources into one
//! namespace graph and checks that the merged result is consistent.
//!
//! ## Components
//!
//! - **Resolver contexts**: immutable lexical nesting used to resolve relative names
//! - **Class entries**: every declaration of one name, with the primary declaration rule
//! - **Environment**: entries keyed by absolute name, plus type parameter and hierarchy validation

#![allow(clippy::uninlined_format_args)]

pub mod ancestry;
pub mod class_entry;
pub mod context;
pub mod environment;
pub mod error;

pub use ancestry::SuperclassGraph;
pub use class_entry::{compatible_type_params, ClassEntry};
pub use context::{ContextModule, ResolverContext};
pub use environment::Environment;
pub use error::{EnvironmentError, EnvironmentResult};

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
