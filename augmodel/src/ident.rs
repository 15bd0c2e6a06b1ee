use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stable reference to a class object.
///
/// Every [`crate::ClassObject`] receives a fresh identifier at construction. Two distinct
/// class objects never share one, including a replacement produced by
/// [`crate::ClassObject::clone_with_fresh_identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassId(Uuid);

impl ClassId {
    pub(crate) fn fresh() -> Self {
        ClassId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0.simple())
    }
}
