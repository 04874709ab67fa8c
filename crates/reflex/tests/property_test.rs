//! Property-based tests for the descriptor forest.
//!
//! Random forests are described by a parent list: entry `i` is either `None`
//! (a root) or `Some(j)` with `j < i`, which keeps every generated graph
//! acyclic. Each case builds its forest in a fresh registry.
//!
//! Run with: `cargo test --test property_test`

mod common;

use common::open_registry;
use proptest::prelude::*;
use reflex::runtime::{TypeDefinition, TypeDescriptor, TypeRegistry, base_chain, is_subtype_of};
use reflex::Error;

fn parents() -> impl Strategy<Value = Vec<Option<usize>>> {
    (1usize..24).prop_flat_map(|len| {
        (0..len)
            .map(|i| {
                if i == 0 {
                    Just(None).boxed()
                } else {
                    prop_oneof![1 => Just(None), 4 => (0..i).prop_map(Some)].boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn build(registry: &TypeRegistry, parents: &[Option<usize>]) -> Vec<&'static TypeDescriptor> {
    let mut nodes: Vec<&'static TypeDescriptor> = Vec::with_capacity(parents.len());
    for (i, parent) in parents.iter().enumerate() {
        let definition = TypeDefinition::new(format!("Prop.T{i}"))
            .maybe_base(parent.map(|p| nodes[p]));
        nodes.push(registry.define_class_type(definition).unwrap());
    }
    nodes
}

/// Depth computed from the parent list alone.
fn expected_depth(parents: &[Option<usize>], mut i: usize) -> usize {
    let mut depth = 0;
    while let Some(p) = parents[i] {
        depth += 1;
        i = p;
    }
    depth
}

proptest! {
    #[test]
    fn subtype_is_reflexive(parents in parents()) {
        let registry = open_registry();
        for d in build(&registry, &parents) {
            prop_assert!(is_subtype_of(d, d));
        }
    }

    #[test]
    fn base_is_strict_ancestor(parents in parents()) {
        let registry = open_registry();
        let nodes = build(&registry, &parents);
        for d in &nodes {
            if let Some(base) = d.base() {
                prop_assert!(is_subtype_of(d, base));
                prop_assert!(!is_subtype_of(base, d));
            }
        }
    }

    #[test]
    fn chain_ends_at_root_with_depth_plus_one_entries(parents in parents()) {
        let registry = open_registry();
        let nodes = build(&registry, &parents);
        for (i, d) in nodes.iter().enumerate() {
            let chain: Vec<_> = base_chain(d).collect();
            prop_assert_eq!(chain.len(), expected_depth(&parents, i) + 1);
            prop_assert!(std::ptr::eq(chain[0], *d));
            prop_assert!(chain.last().unwrap().is_root());
        }
    }

    #[test]
    fn subtype_matches_parent_list(parents in parents()) {
        let registry = open_registry();
        let nodes = build(&registry, &parents);
        for i in 0..nodes.len() {
            let mut ancestors = vec![i];
            let mut cur = i;
            while let Some(p) = parents[cur] {
                ancestors.push(p);
                cur = p;
            }
            for j in 0..nodes.len() {
                prop_assert_eq!(is_subtype_of(nodes[i], nodes[j]), ancestors.contains(&j));
            }
        }
    }

    #[test]
    fn identical_redefinition_is_idempotent(parents in parents()) {
        let registry = open_registry();
        let first = build(&registry, &parents);
        let second = build(&registry, &parents);
        prop_assert_eq!(registry.len(), parents.len());
        for (a, b) in first.iter().zip(&second) {
            prop_assert!(std::ptr::eq(*a, *b));
        }
    }

    #[test]
    fn rebasing_fails_with_duplicate(parents in parents()) {
        let registry = open_registry();
        let nodes = build(&registry, &parents);
        let outsider = registry
            .define_class_type(TypeDefinition::new("Prop.Outsider"))
            .unwrap();

        for d in &nodes {
            let result = registry.define_class_type(TypeDefinition::new(d.name()).base(outsider));
            let is_duplicate = matches!(result, Err(Error::DuplicateType { .. }));
            prop_assert!(is_duplicate);
        }
    }
}
