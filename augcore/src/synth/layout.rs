use augmodel::{ClassAttr, ClassId, DefaultPolicy, FieldDecl};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// A field after class-wide settings have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedField {
    pub name: String,
    pub ty: String,
    pub default: DefaultPolicy,
    pub kw_only: bool,
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
    pub hash: bool,
    /// Class whose body declared the field.
    pub origin: ClassId,
}

impl ResolvedField {
    pub fn resolve(decl: FieldDecl, origin: ClassId, class_kw_only: bool) -> Self {
        Self {
            kw_only: decl.kw_only.unwrap_or(class_kw_only),
            hash: decl.hash.unwrap_or(decl.compare),
            name: decl.name,
            ty: decl.ty,
            default: decl.default,
            init: decl.init,
            repr: decl.repr,
            compare: decl.compare,
            origin,
        }
    }

    pub fn has_default(&self) -> bool {
        !self.default.is_required()
    }

    /// Whether the field is a positional parameter of the initializer.
    pub fn is_positional(&self) -> bool {
        self.init && !self.kw_only
    }
}

/// Ordered fields of an augmented class, stored under
/// [`FIELDS_ATTR`](crate::magic::FIELDS_ATTR).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldLayout {
    fields: Vec<ResolvedField>,
}

impl ClassAttr for FieldLayout {}

impl FieldLayout {
    pub fn new(fields: Vec<ResolvedField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Method slots filled in by a synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Synthesized {
    #[strum(serialize = "__init__")]
    Init,
    #[strum(serialize = "__repr__")]
    Repr,
    #[strum(serialize = "__eq__")]
    Eq,
    #[strum(serialize = "__lt__")]
    Lt,
    #[strum(serialize = "__le__")]
    Le,
    #[strum(serialize = "__gt__")]
    Gt,
    #[strum(serialize = "__ge__")]
    Ge,
    #[strum(serialize = "__hash__")]
    Hash,
    #[strum(serialize = "__setattr__")]
    SetAttr,
    #[strum(serialize = "__delattr__")]
    DelAttr,
}

impl ClassAttr for Synthesized {}

impl Synthesized {
    pub const ORDERING: [Synthesized; 4] = [
        Synthesized::Lt,
        Synthesized::Le,
        Synthesized::Gt,
        Synthesized::Ge,
    ];

    pub const FROZEN: [Synthesized; 2] = [Synthesized::SetAttr, Synthesized::DelAttr];

    pub fn attr_name(self) -> &'static str {
        self.into()
    }
}

/// Positional field names exposed for structural pattern matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchArgs(pub Vec<String>);

impl ClassAttr for MatchArgs {}

/// Fixed instance slots of a compact-storage class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotNames(pub Vec<String>);

impl ClassAttr for SlotNames {}
