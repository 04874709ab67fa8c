//! Typed runtime instances.
//!
//! Every value produced by a descriptor's constructor implements
//! [`Instance`] and reports the descriptor of its exact runtime class.
//! Concrete classes additionally implement [`Class`], which ties the Rust
//! type to its pre-registered descriptor and its construction behavior.

use super::descriptor::TypeDescriptor;
use crate::error::Result;
use reflex_log::error;
use std::any::Any;
use std::fmt;

/// A value that knows its exact runtime type.
pub trait Instance: Any + fmt::Debug + Send + Sync {
    /// Descriptor of this value's exact class (never one of its bases).
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// Upcast used by [`downcast`].
    fn as_any(&self) -> &dyn Any;
}

/// A concrete class with a registered descriptor.
pub trait Class: Instance + Sized {
    /// Returns this class's descriptor, registering it on first use.
    ///
    /// # Errors
    ///
    /// Returns the registry error if the descriptor (or one of its bases)
    /// could not be registered, for example because the name was already
    /// taken by an incompatible definition.
    fn try_reflection_descriptor() -> Result<&'static TypeDescriptor>;

    /// Builds a new instance. Construction runs the base class's
    /// construction first and then stamps this class's descriptor.
    ///
    /// # Errors
    ///
    /// Propagates failures of base construction unchanged.
    fn construct() -> Result<Self>;

    /// Returns this class's descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor cannot be registered. That only happens when
    /// another definition already claimed the class's name, which is a
    /// startup-time fatal condition; use
    /// [`try_reflection_descriptor`](Class::try_reflection_descriptor) to
    /// handle it instead.
    fn reflection_descriptor() -> &'static TypeDescriptor {
        match Self::try_reflection_descriptor() {
            Ok(descriptor) => descriptor,
            Err(err) => {
                error!("cannot register built-in class descriptor: {err}");
                panic!("cannot register built-in class descriptor: {err}");
            }
        }
    }
}

/// Constructs a `T`.
///
/// # Errors
///
/// See [`Class::construct`].
pub fn construct<T: Class>() -> Result<T> {
    T::construct()
}

/// Type-erased constructor for `T`, usable as a descriptor's
/// [`Constructor`](super::Constructor) handle.
///
/// # Errors
///
/// See [`Class::construct`].
pub fn boxed_constructor<T: Class>() -> Result<Box<dyn Instance>> {
    Ok(Box::new(T::construct()?))
}

/// Returns `instance` as a `T` if its exact runtime class is `T`.
///
/// Instances of subclasses of `T` are not returned; use
/// [`TypeDescriptor::is_subtype_of`] for that question.
#[must_use]
pub fn downcast<T: Class>(instance: &dyn Instance) -> Option<&T> {
    let expected = T::try_reflection_descriptor().ok()?;
    if !std::ptr::eq(instance.descriptor(), expected) {
        return None;
    }
    instance.as_any().downcast_ref::<T>()
}
