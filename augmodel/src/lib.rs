//! Class object model consumed by the augmentation core.
//!
//! A class is an immutable declaration (name, bases, annotated fields) paired with a
//! mutable namespace of class-level attributes. Attribute lookup walks the C3
//! linearization of the bases, so state attached to an ancestor is visible from every
//! descendant that does not shadow it.

pub mod attr;
pub mod class;
pub mod error;
pub mod field;
pub mod ident;

pub use attr::{AttrRef, BodyAttr, ClassAttr};
pub use class::{ClassBuilder, ClassObject, ClassRef};
pub use error::{ModelError, ModelResult};
pub use field::{DefaultPolicy, FieldDecl};
pub use ident::ClassId;
