use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum ModelError {
    /// The bases cannot be merged into a single linearization.
    #[error(
        "Cannot create a consistent method resolution order for class `{class}`. The bases `{bases:?}` impose conflicting orderings."
    )]
    InconsistentHierarchy { class: String, bases: Vec<String> },

    /// The same base class was listed more than once.
    #[error("Duplicate base class `{base}` in the declaration of `{class}`.")]
    DuplicateBase { class: String, base: String },

    /// A field was annotated twice in the same class body.
    #[error("Field `{field}` is declared more than once in class `{class}`.")]
    DuplicateField { class: String, field: String },
}

pub type ModelResult<T> = Result<T, ModelError>;
