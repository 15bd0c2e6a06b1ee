//! Direct-declaration queries
//!
//! Callers layering extra behavior on augmented classes use these to tell a class that
//! was submitted itself apart from one that merely inherits an augmented ancestor.
use std::sync::Arc;

use augmodel::ClassObject;

use crate::{
    magic::FIELDS_ATTR,
    registry::{DeclarationRegistry, DeclarationState},
    synth::FieldLayout,
};

/// Whether `class` was itself submitted to the augmentor.
///
/// Defined purely by membership of the class's id in the registry visible from it. A
/// subclass never submitted on its own sees its ancestor's registry, which does not
/// contain it.
pub fn is_direct(class: &ClassObject) -> bool {
    DeclarationRegistry::get_own_or_inherited(class)
        .is_some_and(|resolved| resolved.registry.contains(class.id()))
}

pub fn declaration_state(class: &ClassObject) -> Option<DeclarationState> {
    DeclarationRegistry::get_own_or_inherited(class)
        .and_then(|resolved| resolved.registry.state(class.id()))
}

/// Whether `class` behaves as a value class, directly or through an ancestor.
pub fn is_augmented(class: &ClassObject) -> bool {
    fields(class).is_some()
}

/// The resolved field layout visible from `class`.
pub fn fields(class: &ClassObject) -> Option<Arc<FieldLayout>> {
    class
        .lookup_attr_as::<FieldLayout>(FIELDS_ATTR)
        .map(|(_, layout)| layout)
}

#[cfg(test)]
mod tests {
    use augmodel::ClassObject;

    use super::*;
    use crate::{Augmentor, options::AugmentationOptions, tests_utils::RecordingSynthesizer};

    #[test]
    fn inherited_augmentation_is_not_direct() {
        let augmentor = Augmentor::new(RecordingSynthesizer::default());
        let base = ClassObject::builder("Base").build().unwrap();
        let base = augmentor.apply(&base, &AugmentationOptions::default()).unwrap();
        let derived = ClassObject::builder("Derived").base(&base).build().unwrap();

        assert!(is_direct(&base));
        assert!(!is_direct(&derived));
        assert!(is_augmented(&derived));
        assert_eq!(declaration_state(&base), Some(DeclarationState::Augmented));
        assert_eq!(declaration_state(&derived), None);
    }

    #[test]
    fn untouched_class_reports_nothing() {
        let class = ClassObject::builder("Plain").build().unwrap();
        assert!(!is_direct(&class));
        assert!(!is_augmented(&class));
        assert!(fields(&class).is_none());
    }
}
