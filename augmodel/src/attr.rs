//! Class-level attributes
//!
//! The namespace of a class stores opaque, downcastable values. The model itself only
//! knows about [`BodyAttr`]; other crates attach their own bookkeeping types by
//! implementing [`ClassAttr`].
use std::{fmt::Debug, sync::Arc};

use downcast_rs::{DowncastSync, impl_downcast};

/// Marker trait for anything that can live in a class namespace.
pub trait ClassAttr: DowncastSync + Debug {}
impl_downcast!(sync ClassAttr);

pub type AttrRef = Arc<dyn ClassAttr>;

/// Attributes written directly in a class body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyAttr {
    /// A user-defined method.
    Method,
    /// A plain class constant, kept as source text.
    Value(String),
    /// An explicit `None` assignment (e.g. `__hash__ = None`).
    Null,
}

impl ClassAttr for BodyAttr {}
