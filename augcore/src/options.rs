//! Augmentation options
//!
//! [`AugmentationOptions`] selects which behaviors the synthesizer generates. A value is
//! built once (usually from [`Default`] plus a few `with_*` calls, or from the
//! configuration file) and passed by reference to every augmentation; it is never
//! mutated afterwards.
use augmodel::ClassAttr;
use serde::{Deserialize, Serialize};
use strum::EnumIs;
use thiserror::Error;

/// Option combinations rejected before any class state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs, Error)]
pub enum OptionConflict {
    #[error("`hashing` requires `equality`; a hash that ignores equality would break the hash/eq contract")]
    HashingWithoutEquality,

    #[error("`ordering` requires `equality`")]
    OrderingWithoutEquality,

    #[error("`weakref-slot` is only meaningful together with `compact-storage`")]
    WeakrefSlotWithoutCompactStorage,

    #[error("the synthesizer cannot produce immutable classes")]
    ImmutableUnsupported,

    #[error("the synthesizer cannot produce compact-storage layouts")]
    CompactStorageUnsupported,

    #[error("the synthesizer cannot reserve a weak-reference slot")]
    WeakrefSlotUnsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AugmentationOptions {
    /// Synthesize an initializer.
    pub construct: bool,
    /// Synthesize a textual representation.
    pub display: bool,
    /// Synthesize field-wise equality.
    pub equality: bool,
    /// Synthesize rich comparisons.
    pub ordering: bool,
    /// Synthesize a hash even when the class is mutable.
    pub hashing: bool,
    /// Forbid assignment and deletion after construction.
    pub immutable: bool,
    /// Expose positional field order for structural pattern matching.
    pub structural_match: bool,
    /// Make every field keyword-only unless it says otherwise.
    pub keyword_only: bool,
    /// Replace the per-instance attribute map with fixed slots.
    pub compact_storage: bool,
    /// Reserve a slot for weak back-references (needs `compact_storage`).
    pub weakref_slot: bool,
}

impl Default for AugmentationOptions {
    fn default() -> Self {
        Self {
            construct: true,
            display: true,
            equality: true,
            ordering: false,
            hashing: false,
            immutable: false,
            structural_match: true,
            keyword_only: false,
            compact_storage: false,
            weakref_slot: false,
        }
    }
}

impl ClassAttr for AugmentationOptions {}

macro_rules! with_option {
    ($($fn_name:ident => $field:ident),+ $(,)?) => {
        $(
            pub fn $fn_name(self, $field: bool) -> Self {
                Self { $field, ..self }
            }
        )+
    };
}

impl AugmentationOptions {
    with_option! {
        with_construct => construct,
        with_display => display,
        with_equality => equality,
        with_ordering => ordering,
        with_hashing => hashing,
        with_immutable => immutable,
        with_structural_match => structural_match,
        with_keyword_only => keyword_only,
        with_compact_storage => compact_storage,
        with_weakref_slot => weakref_slot,
    }

    /// Check the combination for internal consistency.
    pub fn validate(&self) -> Result<(), OptionConflict> {
        if self.hashing && !self.equality {
            return Err(OptionConflict::HashingWithoutEquality);
        }
        if self.ordering && !self.equality {
            return Err(OptionConflict::OrderingWithoutEquality);
        }
        if self.weakref_slot && !self.compact_storage {
            return Err(OptionConflict::WeakrefSlotWithoutCompactStorage);
        }
        Ok(())
    }
}
