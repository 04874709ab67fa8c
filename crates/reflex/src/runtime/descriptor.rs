//! Type descriptors: the runtime record of one compiled class.
//!
//! A [`TypeDescriptor`] carries everything generated code needs to reason
//! about a class at run time:
//! - its qualified name (`System.TimeoutException`)
//! - the fields it declares on top of its base
//! - a constructor handle producing instances of exactly this type
//! - a reference to its direct base descriptor (`None` for roots)
//!
//! # Architecture
//!
//! Descriptors are created only by a [`TypeRegistry`](super::TypeRegistry),
//! allocated in the process-wide descriptor arena and never freed, so they
//! are handed out as `&'static TypeDescriptor`. They are immutable once
//! created. Two descriptors are equal only if they are the same record:
//! equality and hashing use the address, never the name.

use super::hierarchy::{self, BaseChain};
use super::instance::Instance;
use crate::error::{Error, Result};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Constructor handle stored in a descriptor.
///
/// Invoking it must yield an instance whose [`Instance::descriptor`] is the
/// descriptor that stores the handle.
pub type Constructor = fn() -> Result<Box<dyn Instance>>;

/// A field declared by a class in addition to its base's fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    name: String,
    type_name: String,
}

impl FieldDescriptor {
    /// Creates a field named `name` of the type called `type_name`.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldDescriptor {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the qualified name of the field's type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}

/// Joins `fields` as `name: Type, name: Type`.
pub(crate) fn format_fields(fields: &[FieldDescriptor]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input to [`TypeRegistry::define_class_type`](super::TypeRegistry::define_class_type).
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{FieldDescriptor, TypeDefinition, TypeRegistry};
/// use reflex::config::RootPolicy;
///
/// let registry = TypeRegistry::with_policy(RootPolicy::Any);
/// let shape = registry.define_class_type(TypeDefinition::new("Geometry.Shape")).unwrap();
/// let circle = registry
///     .define_class_type(
///         TypeDefinition::new("Geometry.Circle")
///             .base(shape)
///             .field(FieldDescriptor::new("radius", "System.Double")),
///     )
///     .unwrap();
///
/// assert_eq!(circle.fields()[0].name(), "radius");
/// assert!(circle.is_subtype_of(shape));
/// ```
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) base: Option<&'static TypeDescriptor>,
}

impl TypeDefinition {
    /// Starts a definition for the type called `name`, with no base, no
    /// fields and no constructor.
    pub fn new(name: impl Into<String>) -> Self {
        TypeDefinition {
            name: name.into(),
            fields: Vec::new(),
            constructor: None,
            base: None,
        }
    }

    /// Sets the direct base type.
    #[must_use]
    pub fn base(mut self, base: &'static TypeDescriptor) -> Self {
        self.base = Some(base);
        self
    }

    /// Sets or clears the direct base type.
    #[must_use]
    pub fn maybe_base(mut self, base: Option<&'static TypeDescriptor>) -> Self {
        self.base = base;
        self
    }

    /// Appends a declared field.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends declared fields in order.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Sets the constructor handle.
    #[must_use]
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Returns the qualified name being defined.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable runtime description of one class.
///
/// # Thread Safety
///
/// Descriptors are `Send + Sync` and never change after registration, so
/// queries over them need no locking.
pub struct TypeDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
    constructor: Option<Constructor>,
    base: Option<&'static TypeDescriptor>,
}

impl TypeDescriptor {
    pub(crate) fn from_definition(definition: TypeDefinition) -> Self {
        TypeDescriptor {
            name: definition.name,
            fields: definition.fields,
            constructor: definition.constructor,
            base: definition.base,
        }
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields declared by this type (not its bases), in
    /// declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the constructor handle, if one was registered.
    #[must_use]
    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    /// Returns the direct base descriptor, or `None` for a root.
    #[must_use]
    pub fn base(&self) -> Option<&'static TypeDescriptor> {
        self.base
    }

    /// Returns `true` if this type has no base.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.base.is_none()
    }

    /// Number of strict ancestors (zero for a root).
    #[must_use]
    pub fn depth(&self) -> usize {
        hierarchy::depth(self)
    }

    /// Iterates from this type up to its root, starting with `self`.
    #[must_use]
    pub fn base_chain(&self) -> BaseChain<'_> {
        hierarchy::base_chain(self)
    }

    /// Returns `true` if `ancestor` is this type or one of its bases.
    #[must_use]
    pub fn is_subtype_of(&self, ancestor: &TypeDescriptor) -> bool {
        hierarchy::is_subtype_of(self, ancestor)
    }

    /// Creates a new instance of exactly this type.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConstructible`] if no constructor was registered
    /// - [`Error::ConstructorMismatch`] if the constructor produced an
    ///   instance of another type
    /// - any error raised by the constructor itself, unchanged
    pub fn construct(&self) -> Result<Box<dyn Instance>> {
        let constructor = self.constructor.ok_or_else(|| Error::NotConstructible {
            name: self.name.clone(),
        })?;

        let instance = constructor()?;
        if !std::ptr::eq(instance.descriptor(), self) {
            return Err(Error::ConstructorMismatch {
                expected: self.name.clone(),
                got: instance.descriptor().name.clone(),
            });
        }
        Ok(instance)
    }

    /// Returns `true` if a redefinition with `base` and `fields` describes the
    /// same type. Constructors are not compared: re-evaluating a module
    /// yields a fresh handle for the same class.
    pub(crate) fn has_shape(
        &self,
        base: Option<&'static TypeDescriptor>,
        fields: &[FieldDescriptor],
    ) -> bool {
        self.has_base(base) && self.fields == fields
    }

    /// Returns `true` if `base` is this descriptor's base, by identity.
    pub(crate) fn has_base(&self, base: Option<&'static TypeDescriptor>) -> bool {
        match (self.base, base) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }

    /// Declared fields as `name: Type` pairs; used in diagnostics.
    pub(crate) fn field_list(&self) -> String {
        format_fields(&self.fields)
    }

    /// Name of the base type, or `<none>`; used in diagnostics.
    pub(crate) fn base_name(&self) -> &str {
        self.base.map_or("<none>", |base| base.name())
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("base", &self.base.map(TypeDescriptor::name))
            .field("fields", &self.fields)
            .field("constructible", &self.constructor.is_some())
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leak(definition: TypeDefinition) -> &'static TypeDescriptor {
        Box::leak(Box::new(TypeDescriptor::from_definition(definition)))
    }

    #[test]
    fn test_accessors() {
        let root = leak(TypeDefinition::new("Test.Root"));
        let child = leak(
            TypeDefinition::new("Test.Child")
                .base(root)
                .field(FieldDescriptor::new("code", "System.Int32")),
        );

        assert_eq!(child.name(), "Test.Child");
        assert_eq!(child.base(), Some(root));
        assert_eq!(child.fields(), &[FieldDescriptor::new("code", "System.Int32")]);
        assert!(child.constructor().is_none());
        assert!(root.is_root());
        assert!(!child.is_root());
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_equality_is_identity() {
        let a = leak(TypeDefinition::new("Test.Same"));
        let b = leak(TypeDefinition::new("Test.Same"));

        assert_eq!(a, a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_has_shape() {
        let root = leak(TypeDefinition::new("Test.ShapeRoot"));
        let other = leak(TypeDefinition::new("Test.OtherRoot"));
        let field = FieldDescriptor::new("x", "System.Int32");
        let child = leak(TypeDefinition::new("Test.Shaped").base(root).field(field.clone()));

        assert!(child.has_shape(Some(root), std::slice::from_ref(&field)));
        assert!(!child.has_shape(Some(other), std::slice::from_ref(&field)));
        assert!(!child.has_shape(None, std::slice::from_ref(&field)));
        assert!(!child.has_shape(Some(root), &[]));
    }

    #[test]
    fn test_construct_without_constructor() {
        let root = leak(TypeDefinition::new("Test.Abstract"));
        let err = root.construct().unwrap_err();
        assert_eq!(
            err,
            Error::NotConstructible {
                name: "Test.Abstract".into()
            }
        );
    }

    #[test]
    fn test_display_and_debug() {
        let root = leak(TypeDefinition::new("Test.Shown"));
        let child = leak(TypeDefinition::new("Test.ShownChild").base(root));

        assert_eq!(child.to_string(), "Test.ShownChild");
        assert_eq!(child.base_name(), "Test.Shown");
        assert_eq!(root.base_name(), "<none>");

        let debug = format!("{child:?}");
        assert!(debug.contains("Test.ShownChild"));
        assert!(debug.contains("constructible: false"));
    }
}
