//! Class objects
//!
//! A [`ClassObject`] owns its declaration and a namespace of class-level attributes.
//! Classes are shared through [`ClassRef`] handles; a subclass keeps strong references to
//! its bases, never the other way round.
//!
//! Example:
//! ```rust
//! # use augmodel::{ClassObject, FieldDecl};
//! let base = ClassObject::builder("Base")
//!     .field(FieldDecl::new("j", "int"))
//!     .build()
//!     .unwrap();
//! let derived = ClassObject::builder("Derived").base(&base).build().unwrap();
//! assert!(derived.is_subclass_of(&base));
//! assert_eq!(derived.mro().map(|c| c.name()).collect::<Vec<_>>(), ["Derived", "Base"]);
//! ```
use std::{collections::BTreeMap, collections::VecDeque, fmt, sync::Arc};

use log::debug;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::{
    attr::{AttrRef, BodyAttr, ClassAttr},
    error::{ModelError, ModelResult},
    field::FieldDecl,
    ident::ClassId,
};

pub type ClassRef = Arc<ClassObject>;

pub struct ClassObject {
    id: ClassId,
    name: String,
    bases: SmallVec<ClassRef, 2>,
    /// Linearized ancestors, excluding the class itself.
    ancestors: Vec<ClassRef>,
    fields: Vec<FieldDecl>,
    namespace: RwLock<BTreeMap<String, AttrRef>>,
}

impl fmt::Debug for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "bases",
                &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field(
                "fields",
                &self.fields.iter().map(|f| &f.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for ClassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class '{}'>", self.name)
    }
}

impl ClassObject {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bases: SmallVec::new(),
            fields: Vec::new(),
            namespace: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[ClassRef] {
        &self.bases
    }

    pub fn ancestors(&self) -> &[ClassRef] {
        &self.ancestors
    }

    /// The method resolution order: the class itself, then its linearized ancestors.
    pub fn mro(&self) -> impl Iterator<Item = &ClassObject> {
        std::iter::once(self).chain(self.ancestors.iter().map(|c| c.as_ref()))
    }

    /// Fields annotated in this class body, in declaration order. Inherited fields are
    /// not included.
    pub fn declared_fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn is_subclass_of(&self, other: &ClassObject) -> bool {
        self.mro().any(|c| c.id == other.id)
    }

    pub fn own_attr(&self, name: &str) -> Option<AttrRef> {
        self.namespace.read().get(name).cloned()
    }

    pub fn own_attr_as<T: ClassAttr>(&self, name: &str) -> Option<Arc<T>> {
        self.own_attr(name)
            .and_then(|attr| attr.downcast_arc::<T>().ok())
    }

    pub fn has_own_attr(&self, name: &str) -> bool {
        self.namespace.read().contains_key(name)
    }

    pub fn own_attr_names(&self) -> Vec<String> {
        self.namespace.read().keys().cloned().collect()
    }

    /// Bind `value` directly on this class, shadowing any inherited attribute of the same
    /// name. Returns the previously bound own value.
    pub fn set_attr(&self, name: impl Into<String>, value: AttrRef) -> Option<AttrRef> {
        self.namespace.write().insert(name.into(), value)
    }

    /// Resolve `name` along the method resolution order.
    ///
    /// Returns the id of the class that owns the binding together with the bound value.
    /// The first class in the order that binds `name` wins, whatever the type of the value.
    pub fn lookup_attr(&self, name: &str) -> Option<(ClassId, AttrRef)> {
        self.mro()
            .find_map(|class| class.own_attr(name).map(|attr| (class.id, attr)))
    }

    pub fn lookup_attr_as<T: ClassAttr>(&self, name: &str) -> Option<(ClassId, Arc<T>)> {
        let (owner, attr) = self.lookup_attr(name)?;
        attr.downcast_arc::<T>().ok().map(|value| (owner, value))
    }

    /// Build a replacement class object sharing this one's declaration.
    ///
    /// The replacement gets a new [`ClassId`]; its namespace starts as a copy of this
    /// class's namespace, so attribute handles (not their contents) are shared.
    pub fn clone_with_fresh_identity(&self) -> ClassRef {
        let namespace = self.namespace.read().clone();
        let replacement = ClassObject {
            id: ClassId::fresh(),
            name: self.name.clone(),
            bases: self.bases.clone(),
            ancestors: self.ancestors.clone(),
            fields: self.fields.clone(),
            namespace: RwLock::new(namespace),
        };
        debug!(
            "Class `{}` ({}) replaced by a new class object {}",
            self.name, self.id, replacement.id
        );
        Arc::new(replacement)
    }
}

/// Incremental description of a class body.
pub struct ClassBuilder {
    name: String,
    bases: SmallVec<ClassRef, 2>,
    fields: Vec<FieldDecl>,
    namespace: BTreeMap<String, AttrRef>,
}

impl ClassBuilder {
    pub fn base(mut self, base: &ClassRef) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDecl>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Declare a user-written method in the class body.
    pub fn method(self, name: impl Into<String>) -> Self {
        self.attr(name, Arc::new(BodyAttr::Method))
    }

    pub fn constant(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attr(name, Arc::new(BodyAttr::Value(value.into())))
    }

    /// Assign `None` to `name` in the class body.
    pub fn null(self, name: impl Into<String>) -> Self {
        self.attr(name, Arc::new(BodyAttr::Null))
    }

    pub fn attr(mut self, name: impl Into<String>, value: AttrRef) -> Self {
        self.namespace.insert(name.into(), value);
        self
    }

    pub fn build(self) -> ModelResult<ClassRef> {
        for (i, base) in self.bases.iter().enumerate() {
            if self.bases.iter().take(i).any(|b| b.id() == base.id()) {
                return Err(ModelError::DuplicateBase {
                    class: self.name,
                    base: base.name().to_string(),
                });
            }
        }

        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(ModelError::DuplicateField {
                    class: self.name,
                    field: field.name.clone(),
                });
            }
        }

        let ancestors = linearize(&self.name, &self.bases)?;
        let class = ClassObject {
            id: ClassId::fresh(),
            name: self.name,
            bases: self.bases,
            ancestors,
            fields: self.fields,
            namespace: RwLock::new(self.namespace),
        };
        debug!("Defined class `{}` as {}", class.name, class.id);
        Ok(Arc::new(class))
    }
}

/// C3 linearization of `bases`.
fn linearize(name: &str, bases: &[ClassRef]) -> ModelResult<Vec<ClassRef>> {
    let mut sequences: Vec<VecDeque<ClassRef>> = bases
        .iter()
        .map(|base| {
            std::iter::once(Arc::clone(base))
                .chain(base.ancestors.iter().cloned())
                .collect()
        })
        .collect();
    sequences.push(bases.iter().cloned().collect());

    let mut order = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(order);
        }

        // A head is eligible when it appears in no tail.
        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|c| c.id() == head.id()))
            })
            .cloned();

        let Some(candidate) = candidate else {
            return Err(ModelError::InconsistentHierarchy {
                class: name.to_string(),
                bases: bases.iter().map(|b| b.name().to_string()).collect(),
            });
        };

        for seq in sequences.iter_mut() {
            if seq.front().map(|c| c.id()) == Some(candidate.id()) {
                seq.pop_front();
            }
        }
        order.push(candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(class: &ClassObject) -> Vec<&str> {
        class.mro().map(|c| c.name()).collect()
    }

    #[test]
    fn diamond_follows_c3_order() {
        let o = ClassObject::builder("O").build().unwrap();
        let a = ClassObject::builder("A").base(&o).build().unwrap();
        let b = ClassObject::builder("B").base(&o).build().unwrap();
        let c = ClassObject::builder("C").base(&a).base(&b).build().unwrap();
        assert_eq!(names(&c), ["C", "A", "B", "O"]);
    }

    #[test]
    fn conflicting_orders_are_rejected() {
        let x = ClassObject::builder("X").build().unwrap();
        let y = ClassObject::builder("Y").build().unwrap();
        let a = ClassObject::builder("A").base(&x).base(&y).build().unwrap();
        let b = ClassObject::builder("B").base(&y).base(&x).build().unwrap();
        let err = ClassObject::builder("Z").base(&a).base(&b).build().unwrap_err();
        assert!(err.is_inconsistent_hierarchy());
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let x = ClassObject::builder("X").build().unwrap();
        let err = ClassObject::builder("Y").base(&x).base(&x).build().unwrap_err();
        assert!(err.is_duplicate_base());

        let err = ClassObject::builder("Y")
            .field(FieldDecl::new("a", "int"))
            .field(FieldDecl::new("a", "str"))
            .build()
            .unwrap_err();
        assert!(err.is_duplicate_field());
    }

    #[test]
    fn lookup_reports_the_owning_class() {
        let base = ClassObject::builder("Base")
            .constant("greeting", "'hi'")
            .build()
            .unwrap();
        let derived = ClassObject::builder("Derived").base(&base).build().unwrap();

        let (owner, value) = derived.lookup_attr_as::<BodyAttr>("greeting").unwrap();
        assert_eq!(owner, base.id());
        assert_eq!(*value, BodyAttr::Value("'hi'".into()));
        assert!(!derived.has_own_attr("greeting"));

        derived.set_attr("greeting", Arc::new(BodyAttr::Null));
        let (owner, _) = derived.lookup_attr("greeting").unwrap();
        assert_eq!(owner, derived.id());
    }

    #[test]
    fn replacement_shares_attribute_handles() {
        let class = ClassObject::builder("Point")
            .field(FieldDecl::new("x", "int"))
            .method("__str__")
            .build()
            .unwrap();
        let replacement = class.clone_with_fresh_identity();

        assert_ne!(class.id(), replacement.id());
        assert_eq!(replacement.name(), "Point");
        assert_eq!(replacement.declared_fields(), class.declared_fields());
        assert!(Arc::ptr_eq(
            &class.own_attr("__str__").unwrap(),
            &replacement.own_attr("__str__").unwrap()
        ));

        // Later bindings are independent.
        replacement.set_attr("__slots__", Arc::new(BodyAttr::Null));
        assert!(!class.has_own_attr("__slots__"));
    }
}
