//! Reference synthesizer
//!
//! [`ValueObjectSynthesizer`] checks a class against the value-object rules and records
//! the behaviors it would generate as [`Synthesized`] markers in the class namespace.
//! All checks run before the namespace is touched, so a rejected class is left exactly
//! as it was submitted.
use std::{collections::BTreeSet, sync::Arc};

use augmodel::{BodyAttr, ClassObject, ClassRef};
use log::debug;

use crate::{
    magic::{
        EQ_ATTR, FIELDS_ATTR, HASH_ATTR, MATCH_ARGS_ATTR, PARAMS_ATTR, SLOTS_ATTR, WEAKREF_SLOT,
    },
    options::AugmentationOptions,
    synth::{
        FieldLayout, ResolvedField, SynthCapabilities, Synthesized, SynthesisError, Synthesizer,
        hash::{HashAction, hash_action},
        layout::{MatchArgs, SlotNames},
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValueObjectSynthesizer;

impl Synthesizer for ValueObjectSynthesizer {
    fn capabilities(&self) -> SynthCapabilities {
        SynthCapabilities::all()
    }

    fn generate(
        &self,
        class: &ClassRef,
        fields: &[ResolvedField],
        options: &AugmentationOptions,
    ) -> Result<ClassRef, SynthesisError> {
        check_inheritance(class, options)?;
        if options.construct {
            check_default_order(class, fields)?;
        }

        let hash = hash_action(
            options.hashing,
            options.equality,
            options.immutable,
            has_explicit_hash(class),
        );
        if hash.is_conflict() {
            return Err(SynthesisError::ExplicitHashConflict {
                class: class.name().to_string(),
            });
        }

        let mut overwritten = Vec::new();
        if options.ordering {
            overwritten.extend(Synthesized::ORDERING);
        }
        if options.immutable {
            overwritten.extend(Synthesized::FROZEN);
        }
        if let Some(method) = overwritten
            .iter()
            .find(|method| class.has_own_attr(method.attr_name()))
        {
            return Err(SynthesisError::MethodAlreadyDefined {
                class: class.name().to_string(),
                method: method.attr_name().to_string(),
            });
        }

        if options.compact_storage && class.has_own_attr(SLOTS_ATTR) {
            return Err(SynthesisError::SlotsAlreadyDefined {
                class: class.name().to_string(),
            });
        }

        class.set_attr(FIELDS_ATTR, Arc::new(FieldLayout::new(fields.to_vec())));
        class.set_attr(PARAMS_ATTR, Arc::new(*options));

        if options.construct {
            set_new_method(class, Synthesized::Init);
        }
        if options.display {
            set_new_method(class, Synthesized::Repr);
        }
        if options.equality {
            set_new_method(class, Synthesized::Eq);
        }
        for method in overwritten {
            class.set_attr(method.attr_name(), Arc::new(method));
        }

        match hash {
            HashAction::Add => {
                class.set_attr(HASH_ATTR, Arc::new(Synthesized::Hash));
            }
            HashAction::SetUnhashable => {
                class.set_attr(HASH_ATTR, Arc::new(BodyAttr::Null));
            }
            HashAction::Keep | HashAction::Conflict => {}
        }

        if options.structural_match && !class.has_own_attr(MATCH_ARGS_ATTR) {
            let positional = fields
                .iter()
                .filter(|f| f.is_positional())
                .map(|f| f.name.clone())
                .collect();
            class.set_attr(MATCH_ARGS_ATTR, Arc::new(MatchArgs(positional)));
        }

        debug!(
            "Synthesized value class `{}` with {} field(s), hash policy {}",
            class.name(),
            fields.len(),
            hash
        );

        if options.compact_storage {
            Ok(compact_layout(class, fields, options))
        } else {
            Ok(Arc::clone(class))
        }
    }
}

/// Bind `method` unless the class body already defines that name.
fn set_new_method(class: &ClassObject, method: Synthesized) {
    if !class.has_own_attr(method.attr_name()) {
        class.set_attr(method.attr_name(), Arc::new(method));
    }
}

/// An explicit `__hash__` is one written in the class body, except for the `None` that a
/// body defining `__eq__` implies.
fn has_explicit_hash(class: &ClassObject) -> bool {
    match class.own_attr_as::<BodyAttr>(HASH_ATTR) {
        Some(attr) => !(*attr == BodyAttr::Null && class.has_own_attr(EQ_ATTR)),
        None => class.has_own_attr(HASH_ATTR),
    }
}

/// A mutable class cannot extend an immutable value class, and an immutable class
/// needs at least one immutable value-class ancestor when it has any.
fn check_inheritance(
    class: &ClassObject,
    options: &AugmentationOptions,
) -> Result<(), SynthesisError> {
    let value_bases: Vec<(&ClassRef, bool)> = class
        .ancestors()
        .iter()
        .rev()
        .filter(|ancestor| ancestor.lookup_attr_as::<FieldLayout>(FIELDS_ATTR).is_some())
        .filter_map(|ancestor| {
            ancestor
                .lookup_attr_as::<AugmentationOptions>(PARAMS_ATTR)
                .map(|(_, params)| (ancestor, params.immutable))
        })
        .collect();

    let Some((first, _)) = value_bases.first() else {
        return Ok(());
    };
    let frozen_base = value_bases.iter().find(|(_, frozen)| *frozen);

    match (frozen_base, options.immutable) {
        (Some((base, _)), false) => Err(SynthesisError::MutableFromFrozen {
            class: class.name().to_string(),
            base: base.name().to_string(),
        }),
        (None, true) => Err(SynthesisError::FrozenFromMutable {
            class: class.name().to_string(),
            base: first.name().to_string(),
        }),
        _ => Ok(()),
    }
}

/// A required positional parameter cannot follow one with a default.
fn check_default_order(
    class: &ClassObject,
    fields: &[ResolvedField],
) -> Result<(), SynthesisError> {
    let mut first_default: Option<&ResolvedField> = None;
    for field in fields.iter().filter(|f| f.is_positional()) {
        match (field.has_default(), first_default) {
            (true, None) => first_default = Some(field),
            (false, Some(after)) => {
                return Err(SynthesisError::NonDefaultAfterDefault {
                    class: class.name().to_string(),
                    field: field.name.clone(),
                    after: after.name.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn compact_layout(
    class: &ClassObject,
    fields: &[ResolvedField],
    options: &AugmentationOptions,
) -> ClassRef {
    let inherited: BTreeSet<String> = class
        .ancestors()
        .iter()
        .filter_map(|ancestor| ancestor.own_attr_as::<SlotNames>(SLOTS_ATTR))
        .flat_map(|slots| slots.0.clone())
        .collect();

    let weakref = options.weakref_slot.then(|| WEAKREF_SLOT.to_string());
    let slots: Vec<String> = fields
        .iter()
        .map(|f| f.name.clone())
        .chain(weakref)
        .filter(|name| !inherited.contains(name))
        .collect();

    let replacement = class.clone_with_fresh_identity();
    replacement.set_attr(SLOTS_ATTR, Arc::new(SlotNames(slots)));
    replacement
}
