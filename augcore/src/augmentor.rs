//! Augmentor
//!
//! [`Augmentor::apply`] is the single entry point that turns a class into a value
//! class. It is idempotent per class object: a class whose id is already recorded in
//! the registry visible from it is returned unchanged, so wrappers that re-submit a
//! class they were handed cannot trigger a second synthesis.
//!
//! Example:
//! ```rust
//! # use augcore::{Augmentor, AugmentationOptions, is_direct};
//! # use augcore::synth::ValueObjectSynthesizer;
//! # use augmodel::{ClassObject, FieldDecl};
//! let augmentor = Augmentor::new(ValueObjectSynthesizer);
//! let options = AugmentationOptions::default();
//!
//! let base = ClassObject::builder("Base")
//!     .field(FieldDecl::new("j", "int"))
//!     .build()
//!     .unwrap();
//! let base = augmentor.apply(&base, &options).unwrap();
//! let again = augmentor.apply(&base, &options).unwrap();
//! assert_eq!(base.id(), again.id());
//!
//! let derived = ClassObject::builder("Derived").base(&base).build().unwrap();
//! assert!(is_direct(&base));
//! assert!(!is_direct(&derived));
//! ```
use std::sync::Arc;

use augmodel::{ClassId, ClassObject, ClassRef};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIs};

use crate::{
    options::{AugmentationOptions, OptionConflict},
    oracle,
    registry::{DeclarationRegistry, DeclarationState},
    synth::{AnnotationIntrospector, FieldIntrospector, SynthCapabilities, Synthesizer, collect_fields},
    utils::{
        conf::AugmentConfig,
        error::{CoreError, CoreResult},
    },
};

/// What to do when a class whose synthesis failed is submitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIs, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailurePolicy {
    /// Run the synthesizer again.
    #[default]
    Retry,
    /// Report [`CoreError::PreviouslyFailed`] without calling the synthesizer.
    Poison,
}

/// Marks a declaration as failed if the synthesizer unwinds.
struct FailOnUnwind<'a> {
    registry: &'a DeclarationRegistry,
    id: ClassId,
}

impl Drop for FailOnUnwind<'_> {
    fn drop(&mut self) {
        warn!("Synthesizer panicked while augmenting {}", self.id);
        self.registry.mark(self.id, DeclarationState::Failed);
    }
}

pub struct Augmentor {
    synthesizer: Box<dyn Synthesizer>,
    introspector: Box<dyn FieldIntrospector>,
    failure_policy: FailurePolicy,
    defaults: AugmentationOptions,
}

impl Augmentor {
    pub fn new(synthesizer: impl Synthesizer + 'static) -> Self {
        Self {
            synthesizer: Box::new(synthesizer),
            introspector: Box::new(AnnotationIntrospector),
            failure_policy: FailurePolicy::default(),
            defaults: AugmentationOptions::default(),
        }
    }

    pub fn from_config(synthesizer: impl Synthesizer + 'static, config: &AugmentConfig) -> Self {
        Self::new(synthesizer)
            .with_defaults(config.defaults)
            .with_failure_policy(config.failure_policy)
    }

    pub fn with_introspector(mut self, introspector: impl FieldIntrospector + 'static) -> Self {
        self.introspector = Box::new(introspector);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_defaults(mut self, defaults: AugmentationOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn synthesizer(&self) -> &dyn Synthesizer {
        self.synthesizer.as_ref()
    }

    pub fn defaults(&self) -> &AugmentationOptions {
        &self.defaults
    }

    /// Augment `class` with the behaviors selected by `options`.
    ///
    /// Returns the augmented class, which is `class` itself unless the synthesizer had to
    /// build a replacement. Submitting a class that was already augmented returns it
    /// unchanged without calling the synthesizer.
    ///
    /// # Errors
    /// - [`CoreError::InvalidOptionCombination`] when `options` are inconsistent or ask
    ///   for something the synthesizer cannot do. Nothing is recorded in that case.
    /// - [`CoreError::Synthesis`] when the synthesizer rejects the class. The class is
    ///   recorded as failed; see [`FailurePolicy`] for what a later call does.
    /// - [`CoreError::PreviouslyFailed`] under [`FailurePolicy::Poison`].
    pub fn apply(&self, class: &ClassRef, options: &AugmentationOptions) -> CoreResult<ClassRef> {
        options.validate()?;
        self.check_capabilities(options)?;

        let id = class.id();
        let registry = match DeclarationRegistry::get_own_or_inherited(class) {
            None => DeclarationRegistry::attach_new(class),
            Some(resolved) => match resolved.registry.state(id) {
                Some(DeclarationState::Augmented) | Some(DeclarationState::Pending) => {
                    debug!(
                        "Class `{}` ({}) is already declared; nothing to do",
                        class.name(),
                        id
                    );
                    return Ok(Arc::clone(class));
                }
                Some(DeclarationState::Failed) => match self.failure_policy {
                    FailurePolicy::Retry => {
                        info!(
                            "Retrying augmentation of class `{}` ({}) after an earlier failure",
                            class.name(),
                            id
                        );
                        resolved.registry
                    }
                    FailurePolicy::Poison => {
                        return Err(CoreError::PreviouslyFailed {
                            class: class.name().to_string(),
                            id,
                        });
                    }
                },
                None if resolved.is_owned_by(class) => resolved.registry,
                None => DeclarationRegistry::attach_new(class),
            },
        };

        let fields = collect_fields(class, self.introspector.as_ref(), options);
        registry.record(id);

        let guard = FailOnUnwind {
            registry: &registry,
            id,
        };
        let outcome = self.synthesizer.generate(class, &fields, options);
        std::mem::forget(guard);

        match outcome {
            Ok(result) => {
                registry.mark(id, DeclarationState::Augmented);
                if result.id() != id {
                    Self::record_replacement(class, &result);
                }
                Ok(result)
            }
            Err(err) => {
                registry.mark(id, DeclarationState::Failed);
                warn!(
                    "Augmentation of class `{}` ({}) failed: {}",
                    class.name(),
                    id,
                    err
                );
                Err(err.into())
            }
        }
    }

    /// [`Self::apply`] with the configured default options.
    pub fn apply_defaults(&self, class: &ClassRef) -> CoreResult<ClassRef> {
        self.apply(class, &self.defaults)
    }

    /// Bind `options` once and reuse them for many classes.
    pub fn decorator(
        &self,
        options: AugmentationOptions,
    ) -> impl Fn(&ClassRef) -> CoreResult<ClassRef> + '_ {
        move |class| self.apply(class, &options)
    }

    /// See [`oracle::is_direct`].
    pub fn is_direct(&self, class: &ClassObject) -> bool {
        oracle::is_direct(class)
    }

    fn check_capabilities(&self, options: &AugmentationOptions) -> Result<(), OptionConflict> {
        let capabilities = self.synthesizer.capabilities();
        let required = [
            (
                options.immutable,
                SynthCapabilities::IMMUTABLE,
                OptionConflict::ImmutableUnsupported,
            ),
            (
                options.compact_storage,
                SynthCapabilities::COMPACT_STORAGE,
                OptionConflict::CompactStorageUnsupported,
            ),
            (
                options.weakref_slot,
                SynthCapabilities::WEAKREF_SLOT,
                OptionConflict::WeakrefSlotUnsupported,
            ),
        ];

        for (requested, capability, conflict) in required {
            if requested && !capabilities.contains(capability) {
                return Err(conflict);
            }
        }
        Ok(())
    }

    /// Make a replacement class object answer as directly declared, so that submitting
    /// it again is a no-op like for any augmented class.
    fn record_replacement(original: &ClassObject, replacement: &ClassObject) {
        let registry = match DeclarationRegistry::get_own_or_inherited(replacement) {
            Some(resolved) if resolved.is_owned_by(replacement) => resolved.registry,
            _ => DeclarationRegistry::attach_new(replacement),
        };
        registry.mark(replacement.id(), DeclarationState::Augmented);
        info!(
            "Class `{}` ({}) was replaced by {} during synthesis",
            original.name(),
            original.id(),
            replacement.id()
        );
    }
}
