//! Hash policy
//!
//! Whether a value class gets a hash depends on four inputs: the `hashing` and
//! `equality` options, immutability, and whether the class body already set
//! `__hash__`. A mutable class with field equality must not keep the identity hash it
//! would otherwise inherit, so it becomes unhashable.
use strum::{Display, EnumIs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum HashAction {
    /// Leave `__hash__` as it is.
    Keep,
    /// Set `__hash__` to `None`.
    SetUnhashable,
    /// Install a field-based hash.
    Add,
    /// Refuse: the caller asked for a hash but the class defines its own.
    Conflict,
}

pub fn hash_action(hashing: bool, equality: bool, immutable: bool, explicit_hash: bool) -> HashAction {
    match (hashing, equality, immutable, explicit_hash) {
        (false, false, _, _) => HashAction::Keep,
        (false, true, false, false) => HashAction::SetUnhashable,
        (false, true, false, true) => HashAction::Keep,
        (false, true, true, false) => HashAction::Add,
        (false, true, true, true) => HashAction::Keep,
        (true, false, _, _) => HashAction::Add,
        (true, true, _, false) => HashAction::Add,
        (true, true, _, true) => HashAction::Conflict,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutable_value_class_becomes_unhashable() {
        assert_eq!(hash_action(false, true, false, false), HashAction::SetUnhashable);
        assert_eq!(hash_action(false, true, false, true), HashAction::Keep);
    }

    #[test]
    fn immutable_value_class_gets_a_hash() {
        assert!(hash_action(false, true, true, false).is_add());
        assert!(hash_action(false, true, true, true).is_keep());
    }

    #[test]
    fn forced_hash_conflicts_with_explicit_one() {
        assert!(hash_action(true, true, false, false).is_add());
        assert!(hash_action(true, true, true, true).is_conflict());
        assert!(hash_action(false, false, true, false).is_keep());
    }
}
