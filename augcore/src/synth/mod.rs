//! Synthesizer seam
//!
//! The augmentor does not generate behavior itself. It resolves the ordered field list
//! of a class and hands it to a [`Synthesizer`], which returns the augmented class (the
//! same object, or a replacement when the requested layout cannot be retrofitted).
use augmodel::{ClassObject, ClassRef, FieldDecl};
use bitflags::bitflags;
use strum::EnumIs;
use thiserror::Error;

use crate::{magic::FIELDS_ATTR, options::AugmentationOptions};

pub mod hash;
pub mod layout;
pub mod value_object;

pub use layout::{FieldLayout, ResolvedField, Synthesized};
pub use value_object::ValueObjectSynthesizer;

bitflags! {
    /// Optional features a synthesizer may support.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SynthCapabilities: u32 {
        const IMMUTABLE = 1 << 0;
        const COMPACT_STORAGE = 1 << 1;
        const WEAKREF_SLOT = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum SynthesisError {
    #[error(
        "Non-default field `{field}` follows default field `{after}` in class `{class}`. Give it a default or make it keyword-only."
    )]
    NonDefaultAfterDefault {
        class: String,
        field: String,
        after: String,
    },

    #[error("Cannot inherit immutable class `{class}` from mutable value class `{base}`.")]
    FrozenFromMutable { class: String, base: String },

    #[error("Cannot inherit mutable class `{class}` from immutable value class `{base}`.")]
    MutableFromFrozen { class: String, base: String },

    #[error("Cannot overwrite `{method}` already defined in class `{class}`.")]
    MethodAlreadyDefined { class: String, method: String },

    #[error("Class `{class}` already specifies `__slots__`.")]
    SlotsAlreadyDefined { class: String },

    #[error("Cannot overwrite the explicit `__hash__` of class `{class}`.")]
    ExplicitHashConflict { class: String },

    #[error("Synthesis of class `{class}` rejected: {reason}")]
    Rejected { class: String, reason: String },
}

pub trait Synthesizer: Send + Sync {
    fn capabilities(&self) -> SynthCapabilities;

    /// Generate the requested behaviors for `class`.
    ///
    /// `fields` is the full ordered field list: inherited fields first (root-most
    /// ancestor first), then the class's own fields, each group in declaration order.
    ///
    /// A panic is treated like an error: the class is marked as failed before the
    /// unwind leaves [`crate::Augmentor::apply`].
    fn generate(
        &self,
        class: &ClassRef,
        fields: &[ResolvedField],
        options: &AugmentationOptions,
    ) -> Result<ClassRef, SynthesisError>;
}

/// Source of a class's own field declarations.
pub trait FieldIntrospector: Send + Sync {
    fn own_fields(&self, class: &ClassObject) -> Vec<FieldDecl>;
}

/// Reads the fields annotated in the class body.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationIntrospector;

impl FieldIntrospector for AnnotationIntrospector {
    fn own_fields(&self, class: &ClassObject) -> Vec<FieldDecl> {
        class.declared_fields().to_vec()
    }
}

/// Resolve the full field list of `class`.
///
/// Ancestors are visited from the root of the hierarchy down, and every ancestor that
/// owns a [`FieldLayout`] contributes its fields. The class's own declarations come
/// last. Redeclaring an inherited name replaces the field in place, keeping its
/// original position.
pub fn collect_fields(
    class: &ClassObject,
    introspector: &dyn FieldIntrospector,
    options: &AugmentationOptions,
) -> Vec<ResolvedField> {
    let mut fields: Vec<ResolvedField> = Vec::new();

    for ancestor in class.ancestors().iter().rev() {
        if let Some(layout) = ancestor.own_attr_as::<FieldLayout>(FIELDS_ATTR) {
            for field in layout.fields() {
                upsert(&mut fields, field.clone());
            }
        }
    }

    for decl in introspector.own_fields(class) {
        upsert(
            &mut fields,
            ResolvedField::resolve(decl, class.id(), options.keyword_only),
        );
    }

    fields
}

fn upsert(fields: &mut Vec<ResolvedField>, field: ResolvedField) {
    match fields.iter_mut().find(|f| f.name == field.name) {
        Some(slot) => *slot = field,
        None => fields.push(field),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use augmodel::{ClassObject, FieldDecl};

    use super::*;

    fn names(fields: &[ResolvedField]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn only_ancestors_with_a_layout_contribute() {
        let plain = ClassObject::builder("Plain")
            .field(FieldDecl::new("ignored", "int"))
            .build()
            .unwrap();
        let child = ClassObject::builder("Child")
            .base(&plain)
            .field(FieldDecl::new("x", "int"))
            .build()
            .unwrap();

        let fields = collect_fields(&child, &AnnotationIntrospector, &Default::default());
        assert_eq!(names(&fields), ["x"]);
        assert_eq!(fields[0].origin, child.id());
    }

    #[test]
    fn redeclared_field_keeps_its_position() {
        let base = ClassObject::builder("Base").build().unwrap();
        let layout = FieldLayout::new(vec![
            ResolvedField::resolve(FieldDecl::new("a", "int"), base.id(), false),
            ResolvedField::resolve(FieldDecl::new("b", "int"), base.id(), false),
        ]);
        base.set_attr(FIELDS_ATTR, Arc::new(layout));

        let child = ClassObject::builder("Child")
            .base(&base)
            .field(FieldDecl::new("c", "int"))
            .field(FieldDecl::new("a", "str").with_default("''"))
            .build()
            .unwrap();

        let fields = collect_fields(&child, &AnnotationIntrospector, &Default::default());
        assert_eq!(names(&fields), ["a", "b", "c"]);
        assert_eq!(fields[0].ty, "str");
        assert_eq!(fields[0].origin, child.id());
    }

    #[test]
    fn class_wide_keyword_only_applies_to_unmarked_fields() {
        let class = ClassObject::builder("C")
            .field(FieldDecl::new("a", "int"))
            .field(FieldDecl::new("b", "int").kw_only(false))
            .build()
            .unwrap();
        let options = AugmentationOptions::default().with_keyword_only(true);

        let fields = collect_fields(&class, &AnnotationIntrospector, &options);
        assert!(fields[0].kw_only);
        assert!(!fields[1].kw_only);
    }
}
