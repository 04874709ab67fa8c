//! Type registry: the name table behind `define_class_type`.
//!
//! A [`TypeRegistry`] maps qualified names to descriptors and is the only
//! place descriptors are created. Definition is an atomic insert-if-absent:
//! the name check and the insertion happen under one write lock, so two
//! threads defining the same class always end up with the same descriptor.
//!
//! # Redefinition
//!
//! Module code may be evaluated more than once. Defining a name again with
//! the same base and fields returns the descriptor that is already
//! registered. A different base fails with [`Error::DuplicateType`], a
//! different field list under the same base with [`Error::DuplicateFields`].
//!
//! # Thread Safety
//!
//! The name table is guarded by a `parking_lot::RwLock`. Descriptors
//! themselves are immutable, so callers holding one never need the lock.

use super::descriptor::{
    Constructor, FieldDescriptor, TypeDefinition, TypeDescriptor, format_fields,
};
use super::descriptor_arena;
use crate::config::{RootPolicy, RuntimeConfig};
use crate::error::{Error, Result};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use reflex_log::{debug, trace, warn};
use reflex_mem::MetaArena;

/// Name table of registered descriptors.
///
/// Most code uses the process-wide registry through
/// [`global_registry`](super::global_registry) and
/// [`define_class_type`]. Separate registries are useful for isolated module
/// loaders and tests; their descriptors still live in the shared descriptor
/// arena and remain valid for the whole program.
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{TypeDefinition, TypeRegistry};
///
/// let registry = TypeRegistry::new();
/// let exception = registry.define_class_type(TypeDefinition::new("System.Exception")).unwrap();
/// let system = registry
///     .define_class_type(TypeDefinition::new("System.SystemException").base(exception))
///     .unwrap();
///
/// assert_eq!(registry.lookup("System.SystemException"), Some(system));
/// assert!(system.is_subtype_of(exception));
/// ```
pub struct TypeRegistry {
    arena: &'static MetaArena<TypeDescriptor>,
    types: RwLock<FxHashMap<String, &'static TypeDescriptor>>,
    root_policy: RootPolicy,
}

impl TypeRegistry {
    /// Creates an empty registry with the default root policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(RootPolicy::default())
    }

    /// Creates an empty registry with the given root policy.
    #[must_use]
    pub fn with_policy(root_policy: RootPolicy) -> Self {
        Self::build(root_policy, 64)
    }

    /// Creates an empty registry configured from `config`.
    #[must_use]
    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self::build(config.root_policy.clone(), config.registry_capacity)
    }

    fn build(root_policy: RootPolicy, capacity: usize) -> Self {
        let mut types = FxHashMap::default();
        types.reserve(capacity);
        TypeRegistry {
            arena: descriptor_arena(),
            types: RwLock::new(types),
            root_policy,
        }
    }

    /// Returns the root policy this registry enforces.
    #[must_use]
    pub fn root_policy(&self) -> &RootPolicy {
        &self.root_policy
    }

    /// Defines a class type and returns its descriptor.
    ///
    /// If the name is already registered with the same base (by identity)
    /// and the same fields, the existing descriptor is returned and nothing
    /// is inserted.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTypeName`] if the name is empty, contains
    ///   whitespace or control characters, or has an empty dotted segment
    /// - [`Error::UndesignatedRoot`] if no base is given and the root policy
    ///   does not allow this name as a root
    /// - [`Error::DuplicateType`] if the name is registered with a different
    ///   base
    /// - [`Error::DuplicateFields`] if the name is registered with the same
    ///   base but a different field list
    pub fn define_class_type(&self, definition: TypeDefinition) -> Result<&'static TypeDescriptor> {
        validate_name(&definition.name)?;

        if definition.base.is_none() && !self.root_policy.allows(&definition.name) {
            warn!("rejected root type `{}`: not a designated root", definition.name);
            return Err(Error::UndesignatedRoot {
                name: definition.name,
            });
        }

        let mut types = self.types.write();

        if let Some(&existing) = types.get(definition.name.as_str()) {
            if existing.has_shape(definition.base, &definition.fields) {
                trace!("`{}` already defined with the same shape", existing.name());
                return Ok(existing);
            }

            if existing.has_base(definition.base) {
                let requested_fields = format_fields(&definition.fields);
                warn!(
                    "conflicting definition of `{}`: registered fields ({}), requested fields ({})",
                    existing.name(),
                    existing.field_list(),
                    requested_fields
                );
                return Err(Error::DuplicateFields {
                    name: definition.name,
                    existing_fields: existing.field_list(),
                    requested_fields,
                });
            }

            let requested_base = definition.base.map_or("<none>", TypeDescriptor::name);
            warn!(
                "conflicting definition of `{}`: registered base {}, requested base {}",
                existing.name(),
                existing.base_name(),
                requested_base
            );
            return Err(Error::DuplicateType {
                name: definition.name.clone(),
                existing_base: existing.base_name().to_string(),
                requested_base: requested_base.to_string(),
            });
        }

        let descriptor: &'static TypeDescriptor =
            self.arena.alloc(TypeDescriptor::from_definition(definition));
        types.insert(descriptor.name().to_string(), descriptor);

        debug!(
            "registered `{}` (base {}, {} fields)",
            descriptor.name(),
            descriptor.base_name(),
            descriptor.fields().len()
        );
        Ok(descriptor)
    }

    /// Returns the descriptor registered under `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.types.read().get(name).copied()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Returns every registered descriptor, sorted by name.
    #[must_use]
    pub fn all_types(&self) -> Vec<&'static TypeDescriptor> {
        let mut all: Vec<_> = self.types.read().values().copied().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Returns the registered types whose direct base is `descriptor`,
    /// sorted by name.
    #[must_use]
    pub fn subtypes_of(&self, descriptor: &TypeDescriptor) -> Vec<&'static TypeDescriptor> {
        let mut direct: Vec<_> = self
            .types
            .read()
            .values()
            .copied()
            .filter(|d| d.base().is_some_and(|base| std::ptr::eq(base, descriptor)))
            .collect();
        direct.sort_by(|a, b| a.name().cmp(b.name()));
        direct
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .field("root_policy", &self.root_policy)
            .finish()
    }
}

/// Defines a class type in the process-wide registry.
///
/// This is the entry point generated code calls at class-definition time.
///
/// # Errors
///
/// See [`TypeRegistry::define_class_type`].
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{Class, define_class_type};
/// use reflex::Exception;
///
/// let base = Exception::reflection_descriptor();
/// let io = define_class_type("Docs.IOException", Vec::new(), None, Some(base)).unwrap();
///
/// assert!(io.is_subtype_of(base));
/// ```
pub fn define_class_type(
    name: &str,
    fields: Vec<FieldDescriptor>,
    constructor: Option<Constructor>,
    base: Option<&'static TypeDescriptor>,
) -> Result<&'static TypeDescriptor> {
    let mut definition = TypeDefinition::new(name).fields(fields).maybe_base(base);
    if let Some(constructor) = constructor {
        definition = definition.constructor(constructor);
    }
    super::global_registry().define_class_type(definition)
}

/// Checks that `name` is a usable qualified name.
fn validate_name(name: &str) -> Result<()> {
    let malformed = name.is_empty()
        || name.chars().any(|c| c.is_whitespace() || c.is_control())
        || name.split('.').any(str::is_empty);

    if malformed {
        return Err(Error::InvalidTypeName {
            name: name.to_string(),
        });
    }
    Ok(())
}
