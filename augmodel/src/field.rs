//! Field declarations
//!
//! A [`FieldDecl`] is what a class body annotates: a name, a type and an optional default.
//! Declarations are kept in source order and are never reordered by the model.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a field obtains its value when the caller does not provide one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DefaultPolicy {
    /// The caller must always pass a value.
    #[default]
    Required,
    /// A literal default, kept as source text.
    Literal(String),
    /// A zero-argument factory called once per construction.
    Factory(String),
}

impl DefaultPolicy {
    pub fn is_required(&self) -> bool {
        matches!(self, DefaultPolicy::Required)
    }
}

/// An annotated field as written in a class body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldDecl {
    pub name: String,
    pub ty: String,
    pub default: DefaultPolicy,
    /// `None` defers to the class-wide keyword-only setting.
    pub kw_only: Option<bool>,
    /// Whether the field is a parameter of the generated initializer.
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
    /// `None` follows `compare`.
    pub hash: Option<bool>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: DefaultPolicy::Required,
            kw_only: None,
            init: true,
            repr: true,
            compare: true,
            hash: None,
        }
    }

    pub fn with_default(mut self, literal: impl Into<String>) -> Self {
        self.default = DefaultPolicy::Literal(literal.into());
        self
    }

    pub fn with_factory(mut self, factory: impl Into<String>) -> Self {
        self.default = DefaultPolicy::Factory(factory.into());
        self
    }

    pub fn kw_only(mut self, kw_only: bool) -> Self {
        self.kw_only = Some(kw_only);
        self
    }

    pub fn no_init(mut self) -> Self {
        self.init = false;
        self
    }

    pub fn no_repr(mut self) -> Self {
        self.repr = false;
        self
    }

    pub fn no_compare(mut self) -> Self {
        self.compare = false;
        self
    }

    pub fn hashed(mut self, hash: bool) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn has_default(&self) -> bool {
        !self.default.is_required()
    }
}
