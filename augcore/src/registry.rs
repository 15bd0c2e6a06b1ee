//! Declaration registry
//!
//! A [`DeclarationRegistry`] records which classes were submitted to the augmentor
//! directly. It is stored in the class namespace under
//! [`DECLARED_CLASSES_ATTR`](crate::magic::DECLARED_CLASSES_ATTR), so a subclass that was
//! never submitted itself resolves its nearest ancestor's registry through the ordinary
//! attribute walk. That registry does not contain the subclass's id, which is exactly
//! what makes the subclass report as "not directly declared".
//!
//! Entries are never removed. Only their [`DeclarationState`] advances.
use std::{collections::BTreeMap, sync::Arc};

use augmodel::{ClassAttr, ClassId, ClassObject};
use log::{debug, warn};
use parking_lot::RwLock;
use strum::{Display, EnumIs};

use crate::magic::DECLARED_CLASSES_ATTR;

/// Progress of a directly declared class through synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum DeclarationState {
    /// Recorded, synthesis not finished yet.
    Pending,
    /// Synthesis completed.
    Augmented,
    /// The synthesizer rejected the class.
    Failed,
}

#[derive(Debug, Default)]
pub struct DeclarationRegistry {
    entries: RwLock<BTreeMap<ClassId, DeclarationState>>,
}

impl ClassAttr for DeclarationRegistry {}

/// A registry found from some class, together with the class that owns it.
#[derive(Debug, Clone)]
pub struct ResolvedRegistry {
    pub registry: Arc<DeclarationRegistry>,
    pub owner: ClassId,
}

impl ResolvedRegistry {
    /// Whether the registry is bound on `class` itself rather than inherited.
    pub fn is_owned_by(&self, class: &ClassObject) -> bool {
        self.owner == class.id()
    }
}

impl DeclarationRegistry {
    /// Find the registry visible from `class`, walking its method resolution order.
    ///
    /// No distinction is made between a registry bound on `class` and one bound on an
    /// ancestor; use [`ResolvedRegistry::is_owned_by`] for that.
    pub fn get_own_or_inherited(class: &ClassObject) -> Option<ResolvedRegistry> {
        let (owner, attr) = class.lookup_attr(DECLARED_CLASSES_ATTR)?;
        match attr.downcast_arc::<DeclarationRegistry>() {
            Ok(registry) => Some(ResolvedRegistry { registry, owner }),
            Err(_) => {
                warn!(
                    "Attribute `{}` visible from class `{}` is not a declaration registry; ignoring it",
                    DECLARED_CLASSES_ATTR,
                    class.name()
                );
                None
            }
        }
    }

    /// Bind a new, empty registry directly on `class`.
    ///
    /// Every later lookup rooted at `class` or at one of its descendants (that has no
    /// registry of its own) sees the new registry instead of any inherited one.
    pub fn attach_new(class: &ClassObject) -> Arc<DeclarationRegistry> {
        let registry = Arc::new(DeclarationRegistry::default());
        class.set_attr(DECLARED_CLASSES_ATTR, registry.clone());
        debug!(
            "Attached a new declaration registry to class `{}` ({})",
            class.name(),
            class.id()
        );
        registry
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn state(&self, id: ClassId) -> Option<DeclarationState> {
        self.entries.read().get(&id).copied()
    }

    /// Record `id` as [`DeclarationState::Pending`].
    ///
    /// Returns `false` (and leaves the entry untouched) if `id` is already present.
    pub fn record(&self, id: ClassId) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(&id) {
            return false;
        }
        entries.insert(id, DeclarationState::Pending);
        debug!("Recorded direct declaration of {}", id);
        true
    }

    /// Move `id` to `state`, recording it first if needed.
    pub(crate) fn mark(&self, id: ClassId, state: DeclarationState) {
        let previous = self.entries.write().insert(id, state);
        debug!(
            "Declaration of {} moved from {:?} to {}",
            id, previous, state
        );
    }

    pub fn ids(&self) -> Vec<ClassId> {
        self.entries.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use augmodel::{BodyAttr, ClassObject};

    use super::*;

    #[test]
    fn subclass_resolves_ancestor_registry_without_copying() {
        let base = ClassObject::builder("Base").build().unwrap();
        let derived = ClassObject::builder("Derived").base(&base).build().unwrap();
        assert!(DeclarationRegistry::get_own_or_inherited(&derived).is_none());

        let registry = DeclarationRegistry::attach_new(&base);
        let resolved = DeclarationRegistry::get_own_or_inherited(&derived).unwrap();
        assert!(Arc::ptr_eq(&registry, &resolved.registry));
        assert!(!resolved.is_owned_by(&derived));
        assert!(!derived.has_own_attr(DECLARED_CLASSES_ATTR));
    }

    #[test]
    fn attach_new_shadows_the_inherited_registry() {
        let base = ClassObject::builder("Base").build().unwrap();
        let derived = ClassObject::builder("Derived").base(&base).build().unwrap();
        let leaf = ClassObject::builder("Leaf").base(&derived).build().unwrap();

        let inherited = DeclarationRegistry::attach_new(&base);
        inherited.record(base.id());
        let own = DeclarationRegistry::attach_new(&derived);

        let resolved = DeclarationRegistry::get_own_or_inherited(&leaf).unwrap();
        assert!(Arc::ptr_eq(&own, &resolved.registry));
        assert_eq!(resolved.owner, derived.id());
        assert!(!resolved.registry.contains(base.id()));
    }

    #[test]
    fn record_is_a_no_op_for_known_ids() {
        let class = ClassObject::builder("C").build().unwrap();
        let registry = DeclarationRegistry::default();

        assert!(registry.record(class.id()));
        registry.mark(class.id(), DeclarationState::Augmented);
        assert!(!registry.record(class.id()));
        assert_eq!(registry.state(class.id()), Some(DeclarationState::Augmented));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn foreign_attribute_is_not_a_registry() {
        let class = ClassObject::builder("C")
            .attr(DECLARED_CLASSES_ATTR, Arc::new(BodyAttr::Null))
            .build()
            .unwrap();
        assert!(DeclarationRegistry::get_own_or_inherited(&class).is_none());
    }
}
