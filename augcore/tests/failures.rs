use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use augcore::{
    AugmentationOptions, Augmentor, DeclarationState, FailurePolicy, OptionConflict, is_direct,
    oracle::declaration_state,
    synth::{
        ResolvedField, SynthCapabilities, SynthesisError, Synthesizer, ValueObjectSynthesizer,
    },
    tests_utils::{FailingSynthesizer, RecordingSynthesizer, class_with_fields},
    utils::error::CoreError,
};
use augmodel::{ClassObject, ClassRef, FieldDecl};

#[test]
fn invalid_options_do_not_register_the_class() {
    let synth = RecordingSynthesizer::default();
    let augmentor = Augmentor::new(synth.clone());
    let class = class_with_fields("C", &[], &["a"]);

    let err = augmentor
        .apply(
            &class,
            &AugmentationOptions::default()
                .with_hashing(true)
                .with_equality(false),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::InvalidOptionCombination(OptionConflict::HashingWithoutEquality)
    ));
    assert!(!is_direct(&class));
    assert!(synth.calls().is_empty());

    // Corrected options go through.
    augmentor
        .apply(&class, &AugmentationOptions::default().with_hashing(true))
        .unwrap();
    assert!(is_direct(&class));
}

#[test]
fn synthesis_errors_propagate_unchanged() {
    let augmentor = Augmentor::new(ValueObjectSynthesizer);
    let class = ClassObject::builder("Broken")
        .field(FieldDecl::new("a", "int").with_default("0"))
        .field(FieldDecl::new("b", "int"))
        .build()
        .unwrap();

    let err = augmentor
        .apply(&class, &AugmentationOptions::default())
        .unwrap_err();
    match err {
        CoreError::Synthesis(SynthesisError::NonDefaultAfterDefault { field, after, .. }) => {
            assert_eq!(field, "b");
            assert_eq!(after, "a");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(declaration_state(&class), Some(DeclarationState::Failed));
}

#[test]
fn failed_synthesis_is_retried_not_reported_as_success() {
    let synth = FailingSynthesizer::failing_times(1);
    let augmentor = Augmentor::new(synth.clone());
    let class = class_with_fields("Flaky", &[], &["a"]);
    let options = AugmentationOptions::default();

    assert!(augmentor.apply(&class, &options).is_err());
    assert!(augmentor.apply(&class, &options).is_ok());
    assert_eq!(synth.attempts(), 2);
    assert_eq!(synth.successes(), 1);
    assert_eq!(declaration_state(&class), Some(DeclarationState::Augmented));

    // Once augmented, further calls no longer reach the synthesizer.
    augmentor.apply(&class, &options).unwrap();
    assert_eq!(synth.attempts(), 2);
}

#[test]
fn poisoned_class_stays_failed() {
    let synth = FailingSynthesizer::failing_times(1);
    let augmentor = Augmentor::new(synth.clone()).with_failure_policy(FailurePolicy::Poison);
    let class = class_with_fields("Flaky", &[], &["a"]);
    let options = AugmentationOptions::default();

    assert!(augmentor.apply(&class, &options).is_err());
    for _ in 0..2 {
        assert!(matches!(
            augmentor.apply(&class, &options),
            Err(CoreError::PreviouslyFailed { .. })
        ));
    }
    assert_eq!(synth.attempts(), 1);
}

#[test]
fn field_order_is_unchecked_without_an_initializer() {
    let augmentor = Augmentor::new(ValueObjectSynthesizer);
    let class = ClassObject::builder("NoInit")
        .field(FieldDecl::new("a", "int").with_default("0"))
        .field(FieldDecl::new("b", "int"))
        .build()
        .unwrap();

    augmentor
        .apply(&class, &AugmentationOptions::default().with_construct(false))
        .unwrap();
    assert_eq!(declaration_state(&class), Some(DeclarationState::Augmented));
}

/// Panics on its first call, then records normally.
#[derive(Clone, Default)]
struct PanicOnceSynthesizer {
    panicked: Arc<AtomicBool>,
    inner: RecordingSynthesizer,
}

impl Synthesizer for PanicOnceSynthesizer {
    fn capabilities(&self) -> SynthCapabilities {
        SynthCapabilities::all()
    }

    fn generate(
        &self,
        class: &ClassRef,
        fields: &[ResolvedField],
        options: &AugmentationOptions,
    ) -> Result<ClassRef, SynthesisError> {
        if !self.panicked.swap(true, Ordering::AcqRel) {
            panic!("synthesizer blew up");
        }
        self.inner.generate(class, fields, options)
    }
}

#[test]
fn panicking_synthesis_is_recorded_as_failed() {
    let synth = PanicOnceSynthesizer::default();
    let augmentor = Augmentor::new(synth.clone());
    let class = class_with_fields("Fragile", &[], &["a"]);
    let options = AugmentationOptions::default();

    let unwound = catch_unwind(AssertUnwindSafe(|| augmentor.apply(&class, &options)));
    assert!(unwound.is_err());
    assert_eq!(declaration_state(&class), Some(DeclarationState::Failed));

    augmentor.apply(&class, &options).unwrap();
    assert_eq!(synth.inner.calls().len(), 1);
    assert_eq!(declaration_state(&class), Some(DeclarationState::Augmented));
}
