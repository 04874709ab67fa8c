//! Hierarchy and registry tests
//!
//! Tests for the descriptor forest built through a registry:
//! - The Exception / SystemException / TimeoutException scenario
//! - Reflexivity and antisymmetry of subtype queries
//! - Base chain shape
//! - Idempotent and conflicting redefinition
//!
//! Run with: `cargo test --test hierarchy_test`

mod common;

use common::{define_chain, open_registry};
use reflex::Error;
use reflex::runtime::{
    FieldDescriptor, TypeDefinition, TypeRegistry, base_chain, common_base, display_name,
    is_subtype_of,
};

// ============================================================================
// Exception Scenario
// ============================================================================

#[test]
fn test_exception_scenario() {
    let registry = TypeRegistry::new();
    let exception = registry
        .define_class_type(TypeDefinition::new("System.Exception"))
        .unwrap();
    let system = registry
        .define_class_type(TypeDefinition::new("System.SystemException").base(exception))
        .unwrap();
    let timeout = registry
        .define_class_type(TypeDefinition::new("System.TimeoutException").base(system))
        .unwrap();

    assert!(is_subtype_of(timeout, exception));
    assert!(!is_subtype_of(exception, timeout));
    assert_eq!(display_name(timeout), "System.TimeoutException");

    let chain: Vec<_> = base_chain(timeout).collect();
    assert_eq!(chain, vec![timeout, system, exception]);
}

#[test]
fn test_unrelated_root_is_not_an_error() {
    let registry = TypeRegistry::new();
    let chain = define_chain(&registry, &["System.Exception", "System.SystemException"]);
    let (exception, system) = (chain[0], chain[1]);
    let object = registry
        .define_class_type(TypeDefinition::new("System.Object"))
        .unwrap();

    assert!(!is_subtype_of(system, object));
    assert!(!is_subtype_of(object, exception));
    assert_eq!(common_base(system, object), None);
}

// ============================================================================
// Subtype Properties
// ============================================================================

#[test]
fn test_reflexive_and_antisymmetric() {
    let registry = open_registry();
    let chain = define_chain(&registry, &["Test.A", "Test.B", "Test.C", "Test.D"]);

    for (i, d) in chain.iter().enumerate() {
        assert!(is_subtype_of(d, d), "{d} should be a subtype of itself");

        for ancestor in &chain[..i] {
            assert!(is_subtype_of(d, ancestor));
            assert!(!is_subtype_of(ancestor, d));
        }
    }
}

#[test]
fn test_chain_length_is_depth_plus_one() {
    let registry = open_registry();
    let chain = define_chain(&registry, &["Deep.L0", "Deep.L1", "Deep.L2", "Deep.L3", "Deep.L4"]);

    for (depth, d) in chain.iter().enumerate() {
        assert_eq!(d.depth(), depth);
        assert_eq!(base_chain(d).count(), depth + 1);
        assert!(base_chain(d).last().unwrap().is_root());
    }
}

// ============================================================================
// Redefinition
// ============================================================================

#[test]
fn test_redefinition_with_same_shape_returns_same_descriptor() {
    let registry = TypeRegistry::new();
    let root = registry
        .define_class_type(TypeDefinition::new("System.Exception"))
        .unwrap();
    let again = registry
        .define_class_type(TypeDefinition::new("System.Exception"))
        .unwrap();
    assert!(std::ptr::eq(root, again));

    let definition = || {
        TypeDefinition::new("App.ParseException")
            .base(root)
            .fields([
                FieldDescriptor::new("line", "System.Int32"),
                FieldDescriptor::new("column", "System.Int32"),
            ])
    };
    let first = registry.define_class_type(definition()).unwrap();
    let second = registry.define_class_type(definition()).unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(registry.len(), 2);
    assert_eq!(first.fields().len(), 2);
}

#[test]
fn test_redefinition_with_different_base_fails() {
    let registry = TypeRegistry::new();
    let chain = define_chain(&registry, &["System.Exception", "System.SystemException"]);
    let (exception, system) = (chain[0], chain[1]);
    registry
        .define_class_type(TypeDefinition::new("System.TimeoutException").base(system))
        .unwrap();

    let err = registry
        .define_class_type(TypeDefinition::new("System.TimeoutException").base(exception))
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateType { ref name, .. } if name == "System.TimeoutException"));
    assert_eq!(
        registry.lookup("System.TimeoutException").unwrap().base(),
        Some(system)
    );
}

#[test]
fn test_invalid_names_rejected() {
    let registry = open_registry();
    for bad in ["", "System..Exception", "Trailing.", "With Space"] {
        assert!(matches!(
            registry.define_class_type(TypeDefinition::new(bad)),
            Err(Error::InvalidTypeName { .. })
        ));
    }
    assert!(registry.is_empty());
}
