//! Stable element identities.
//!
//! An [`Id`] is a 64-bit hash of the enclosing scope's identity together with a
//! [`Key`]: a debug label, an optional integer disambiguator for siblings
//! declared in a loop, and an optional call-site line so that structurally
//! identical calls on different lines do not collide.

use core::panic::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(pub u64);

impl Id {
    /// Identity of the implicit container every frame's top-level elements live in.
    pub fn root() -> Id {
        hash_key(0, &Key::new(ROOT_LABEL))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

pub(crate) const ROOT_LABEL: &str = "Ply__RootContainer";

/// What a builder call is keyed by, before it is combined with its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key<'a> {
    pub label: &'a str,
    pub index: Option<u32>,
    pub line: Option<u32>,
}

impl<'a> Key<'a> {
    pub const fn new(label: &'a str) -> Self {
        Self {
            label,
            index: None,
            line: None,
        }
    }

    /// A key for the `index`-th sibling produced from a collection.
    pub const fn indexed(label: &'a str, index: u32) -> Self {
        Self {
            label,
            index: Some(index),
            line: None,
        }
    }

    /// Attaches the caller's source line.
    #[track_caller]
    pub fn here(mut self) -> Self {
        self.line = Some(Location::caller().line());
        self
    }

    pub const fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(label: &'a str) -> Self {
        Key::new(label)
    }
}

impl<'a> From<(&'a str, u32)> for Key<'a> {
    fn from((label, index): (&'a str, u32)) -> Self {
        Key::indexed(label, index)
    }
}

#[inline]
fn mix(mut hash: u64, byte: u8) -> u64 {
    hash = hash.wrapping_add(byte as u64);
    hash = hash.wrapping_add(hash << 10);
    hash ^= hash >> 6;
    hash
}

#[inline]
fn mix_u32(hash: u64, value: u32) -> u64 {
    value.to_le_bytes().into_iter().fold(hash, mix)
}

#[inline]
fn mix_optional(hash: u64, value: Option<u32>) -> u64 {
    match value {
        Some(value) => mix_u32(mix(hash, 1), value),
        None => mix(hash, 0),
    }
}

/// Hashes `key` into the scope identified by `seed`.
pub fn hash_key(seed: u64, key: &Key<'_>) -> Id {
    let mut hash = seed.to_le_bytes().into_iter().fold(0xcbf2_9ce4_8422_2325, mix);
    hash = key.label.bytes().fold(hash, mix);
    // Separator keeps ("ab", Some(1)) apart from ("ab\u{1}", None).
    hash = mix(hash, 0xFF);
    hash = mix_optional(hash, key.index);
    hash = mix_optional(hash, key.line);

    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    Id(hash.wrapping_add(1))
}

/// The stack of scope identities active while a frame is being built.
///
/// Each entry already folds in everything beneath it, so the current identity
/// is just the top.
#[derive(Debug, Clone)]
pub(crate) struct IdStack {
    segments: Vec<Id>,
}

impl IdStack {
    pub(crate) fn new(root: Id) -> Self {
        Self {
            segments: vec![root],
        }
    }

    pub(crate) fn current(&self) -> Id {
        self.segments.last().copied().unwrap_or_default()
    }

    /// Identity a key would get in the current scope.
    pub(crate) fn resolve(&self, key: &Key<'_>) -> Id {
        hash_key(self.current().0, key)
    }

    pub(crate) fn push(&mut self, id: Id) {
        self.segments.push(id);
    }

    /// Pops one scope. The root is never popped.
    pub(crate) fn pop(&mut self) {
        if self.segments.len() > 1 {
            self.segments.pop();
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_scope_is_stable() {
        let a = hash_key(7, &Key::new("button"));
        let b = hash_key(7, &Key::new("button"));
        assert_eq!(a, b);
    }

    #[test]
    fn every_key_part_disambiguates() {
        let base = hash_key(7, &Key::new("row"));
        assert_ne!(base, hash_key(8, &Key::new("row")));
        assert_ne!(base, hash_key(7, &Key::new("rows")));
        assert_ne!(base, hash_key(7, &Key::indexed("row", 0)));
        assert_ne!(hash_key(7, &Key::indexed("row", 0)), hash_key(7, &Key::indexed("row", 1)));
        assert_ne!(base, hash_key(7, &Key::new("row").with_line(12)));
        assert_ne!(
            hash_key(7, &Key::new("row").with_line(12)),
            hash_key(7, &Key::indexed("row", 12))
        );
    }

    #[test]
    fn here_captures_distinct_lines() {
        let first = Key::new("a").here();
        let second = Key::new("a").here();
        assert_ne!(first.line, second.line);
    }

    #[test]
    fn stack_folds_scopes() {
        let mut stack = IdStack::new(Id::root());
        let top_level = stack.resolve(&Key::new("item"));
        let group = stack.resolve(&Key::new("group"));
        stack.push(group);
        let nested = stack.resolve(&Key::new("item"));
        assert_ne!(top_level, nested);
        assert_eq!(nested, hash_key(group.0, &Key::new("item")));
        stack.pop();
        stack.pop();
        assert_eq!(stack.current(), Id::root());
        assert_eq!(stack.depth(), 1);
    }
}
