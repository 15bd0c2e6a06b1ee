//! Idempotent, hierarchy-aware class augmentation.
//!
//! The [`augmentor::Augmentor`] turns a plain class declaration into a value object by
//! handing it to a [`synth::Synthesizer`], at most once per class object. Which classes
//! were submitted directly (rather than inheriting an augmented ancestor) is tracked by
//! a [`registry::DeclarationRegistry`] stored in the class namespace and can be queried
//! through [`oracle::is_direct`].

pub mod augmentor;
pub mod magic;
pub mod options;
pub mod oracle;
pub mod registry;
pub mod synth;
#[cfg(any(test, feature = "test-utils"))]
pub mod tests_utils;
pub mod utils;

pub use augmentor::{Augmentor, FailurePolicy};
pub use options::{AugmentationOptions, OptionConflict};
pub use oracle::is_direct;
pub use registry::{DeclarationRegistry, DeclarationState};

pub extern crate augmodel;
