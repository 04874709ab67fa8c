//! Hierarchy queries over descriptor base chains.
//!
//! The hierarchy graph is a forest: every descriptor points at exactly one
//! base, roots point at nothing. All queries walk that chain upward and
//! compare descriptors by identity, so two registries that happen to use the
//! same name never alias each other's types.
//!
//! Chains are short (root to leaf is rarely more than a few dozen levels) and
//! descriptors are immutable, so none of these functions locks or allocates.

use super::descriptor::TypeDescriptor;
use std::iter::FusedIterator;

/// Iterator from a descriptor up to its root, inclusive of both ends.
///
/// Created by [`base_chain`]. Cloning the iterator restarts the walk from the
/// clone's current position.
#[derive(Debug, Clone)]
pub struct BaseChain<'a> {
    next: Option<&'a TypeDescriptor>,
}

impl<'a> Iterator for BaseChain<'a> {
    type Item = &'a TypeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.base();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (1, None),
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for BaseChain<'_> {}

/// Returns the chain `[descriptor, base, base's base, ..., root]`.
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{Class, TimeoutException, hierarchy::base_chain};
///
/// let names: Vec<&str> = base_chain(TimeoutException::reflection_descriptor())
///     .map(|d| d.name())
///     .collect();
///
/// assert_eq!(
///     names,
///     ["System.TimeoutException", "System.SystemException", "System.Exception"]
/// );
/// ```
#[must_use]
pub fn base_chain(descriptor: &TypeDescriptor) -> BaseChain<'_> {
    BaseChain {
        next: Some(descriptor),
    }
}

/// Returns `true` if `ancestor` appears in `base_chain(descriptor)`.
///
/// The relation is reflexive. An unrelated type, including one from another
/// forest, simply yields `false`.
#[must_use]
pub fn is_subtype_of(descriptor: &TypeDescriptor, ancestor: &TypeDescriptor) -> bool {
    base_chain(descriptor).any(|d| std::ptr::eq(d, ancestor))
}

/// Returns the qualified name exactly as registered.
#[must_use]
pub fn display_name(descriptor: &TypeDescriptor) -> &str {
    descriptor.name()
}

/// Number of strict ancestors of `descriptor`.
#[must_use]
pub fn depth(descriptor: &TypeDescriptor) -> usize {
    base_chain(descriptor).count() - 1
}

/// Returns the root of the tree containing `descriptor`.
#[must_use]
pub fn root_of(descriptor: &TypeDescriptor) -> &TypeDescriptor {
    base_chain(descriptor).last().unwrap_or(descriptor)
}

/// Returns the nearest type that both `a` and `b` derive from, or `None`
/// if they live in different trees.
#[must_use]
pub fn common_base<'a>(a: &'a TypeDescriptor, b: &TypeDescriptor) -> Option<&'a TypeDescriptor> {
    base_chain(a).find(|candidate| is_subtype_of(b, candidate))
}
