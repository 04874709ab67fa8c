// Shared fixtures for the integration tests.
//
// Tests in one binary share the global registry, so anything registered
// there gets a unique name.

#![allow(dead_code)]

use reflex::runtime::{TypeDefinition, TypeDescriptor, TypeRegistry};
use reflex::RootPolicy;
use std::sync::atomic::{AtomicUsize, Ordering};

static NAME_ID: AtomicUsize = AtomicUsize::new(0);

/// Returns `Prefix_<n>` with a process-unique `n`.
pub fn unique_name(prefix: &str) -> String {
    let id = NAME_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

/// Registry that accepts any root, for tests that build their own forests.
pub fn open_registry() -> TypeRegistry {
    TypeRegistry::with_policy(RootPolicy::Any)
}

/// Defines `names[0]` as a root and every following name as a subtype of
/// the previous one. Returns the descriptors root first.
pub fn define_chain(registry: &TypeRegistry, names: &[&str]) -> Vec<&'static TypeDescriptor> {
    let mut chain: Vec<&'static TypeDescriptor> = Vec::with_capacity(names.len());
    for name in names {
        let definition = TypeDefinition::new(*name).maybe_base(chain.last().copied());
        chain.push(registry.define_class_type(definition).expect("failed to define chain"));
    }
    chain
}
