//! Helpers for exercising the augmentor without the reference synthesizer.
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use augmodel::{ClassId, ClassObject, ClassRef, FieldDecl};
use parking_lot::Mutex;

use crate::{
    magic::FIELDS_ATTR,
    options::AugmentationOptions,
    synth::{FieldLayout, ResolvedField, SynthCapabilities, SynthesisError, Synthesizer},
};

/// One call observed by [`RecordingSynthesizer`].
#[derive(Debug, Clone)]
pub struct SynthCall {
    pub class: ClassId,
    pub class_name: String,
    pub fields: Vec<String>,
    pub options: AugmentationOptions,
}

/// Records every call and installs the received field list as the class layout.
#[derive(Debug, Clone)]
pub struct RecordingSynthesizer {
    calls: Arc<Mutex<Vec<SynthCall>>>,
    capabilities: SynthCapabilities,
}

impl Default for RecordingSynthesizer {
    fn default() -> Self {
        Self::with_capabilities(SynthCapabilities::all())
    }
}

impl RecordingSynthesizer {
    pub fn with_capabilities(capabilities: SynthCapabilities) -> Self {
        Self {
            calls: Default::default(),
            capabilities,
        }
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, class: ClassId) -> usize {
        self.calls.lock().iter().filter(|c| c.class == class).count()
    }
}

impl Synthesizer for RecordingSynthesizer {
    fn capabilities(&self) -> SynthCapabilities {
        self.capabilities
    }

    fn generate(
        &self,
        class: &ClassRef,
        fields: &[ResolvedField],
        options: &AugmentationOptions,
    ) -> Result<ClassRef, SynthesisError> {
        self.calls.lock().push(SynthCall {
            class: class.id(),
            class_name: class.name().to_string(),
            fields: fields.iter().map(|f| f.name.clone()).collect(),
            options: *options,
        });
        class.set_attr(FIELDS_ATTR, Arc::new(FieldLayout::new(fields.to_vec())));
        Ok(Arc::clone(class))
    }
}

/// Rejects the first `failures` calls, then behaves like [`RecordingSynthesizer`].
#[derive(Debug, Clone)]
pub struct FailingSynthesizer {
    remaining_failures: Arc<AtomicUsize>,
    attempts: Arc<AtomicUsize>,
    inner: RecordingSynthesizer,
}

impl FailingSynthesizer {
    pub fn failing_times(failures: usize) -> Self {
        Self {
            remaining_failures: Arc::new(AtomicUsize::new(failures)),
            attempts: Default::default(),
            inner: RecordingSynthesizer::default(),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Acquire)
    }

    pub fn successes(&self) -> usize {
        self.inner.calls().len()
    }
}

impl Synthesizer for FailingSynthesizer {
    fn capabilities(&self) -> SynthCapabilities {
        SynthCapabilities::all()
    }

    fn generate(
        &self,
        class: &ClassRef,
        fields: &[ResolvedField],
        options: &AugmentationOptions,
    ) -> Result<ClassRef, SynthesisError> {
        self.attempts.fetch_add(1, Ordering::AcqRel);
        let failing = self
            .remaining_failures
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SynthesisError::Rejected {
                class: class.name().to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.inner.generate(class, fields, options)
    }
}

/// Build a class named `name` deriving from `bases` with required `int` fields.
pub fn class_with_fields(name: &str, bases: &[&ClassRef], fields: &[&str]) -> ClassRef {
    let mut builder = ClassObject::builder(name);
    for base in bases {
        builder = builder.base(base);
    }
    builder
        .fields(fields.iter().map(|f| FieldDecl::new(*f, "int")))
        .build()
        .expect("test class should be well-formed")
}
