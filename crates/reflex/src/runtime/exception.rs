//! Exception classes.
//!
//! [`Exception`] is the root of the exception hierarchy (`System.Exception`)
//! and carries the payload every exception shares: an optional message and
//! an optional inner exception. Subclasses are declared with [`exception_class!`],
//! which wraps the direct base and stamps the subclass descriptor after the
//! base has been constructed:
//!
//! ```text
//! TimeoutException::construct()
//!   -> SystemException::construct()
//!        -> Exception::construct()        stamps System.Exception
//!      stamps System.SystemException
//!   stamps System.TimeoutException
//! ```
//!
//! The descriptor of each class is registered in the global registry the
//! first time it is needed, or up front when the runtime is initialized
//! with [`InitPolicy::Eager`](crate::config::InitPolicy::Eager).
//!
//! [`exception_class!`]: crate::exception_class

use super::descriptor::TypeDescriptor;
use super::instance::{Class, Instance, boxed_constructor};
use super::registry::define_class_type;
use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

/// Behavior shared by every exception class.
pub trait Throwable: Instance {
    /// Root payload of this exception.
    fn exception(&self) -> &Exception;

    /// Mutable root payload of this exception.
    fn exception_mut(&mut self) -> &mut Exception;

    /// This exception as a standard error.
    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static);

    /// Message, if one was set.
    fn message(&self) -> Option<&str> {
        self.exception().message()
    }

    /// The exception that caused this one, if any.
    fn inner_exception(&self) -> Option<&dyn Throwable> {
        self.exception().inner_exception()
    }

    /// Sets the message.
    #[must_use]
    fn with_message(mut self, message: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.exception_mut().message = Some(message.into());
        self
    }

    /// Chains `inner` as the exception that caused this one.
    #[must_use]
    fn with_inner_exception<C: Throwable>(mut self, inner: C) -> Self
    where
        Self: Sized,
    {
        self.exception_mut().inner = Some(Box::new(inner));
        self
    }
}

/// Root exception class, `System.Exception`.
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{Class, Exception, Instance, Throwable};
///
/// let err = Exception::construct().unwrap().with_message("disk full");
/// assert_eq!(err.descriptor().name(), "System.Exception");
/// assert_eq!(err.to_string(), "System.Exception: disk full");
/// ```
pub struct Exception {
    message: Option<String>,
    inner: Option<Box<dyn Throwable>>,
    descriptor: &'static TypeDescriptor,
}

impl Exception {
    /// Qualified name of the root exception type.
    pub const QUALIFIED_NAME: &'static str = "System.Exception";

    /// Message, if one was set.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The exception that caused this one, if any.
    #[must_use]
    pub fn inner_exception(&self) -> Option<&dyn Throwable> {
        self.inner.as_deref()
    }

    /// Records the exact class of the exception being constructed.
    ///
    /// Only construction code generated by [`exception_class!`] calls this,
    /// once per class layer, base first.
    ///
    /// [`exception_class!`]: crate::exception_class
    #[doc(hidden)]
    pub fn stamp_descriptor(&mut self, descriptor: &'static TypeDescriptor) {
        self.descriptor = descriptor;
    }
}

impl Instance for Exception {
    fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Class for Exception {
    fn try_reflection_descriptor() -> Result<&'static TypeDescriptor> {
        static DESCRIPTOR: OnceLock<Result<&'static TypeDescriptor>> = OnceLock::new();
        DESCRIPTOR
            .get_or_init(|| {
                define_class_type(
                    Exception::QUALIFIED_NAME,
                    Vec::new(),
                    Some(boxed_constructor::<Exception>),
                    None,
                )
            })
            .clone()
    }

    fn construct() -> Result<Self> {
        Ok(Exception {
            message: None,
            inner: None,
            descriptor: Self::try_reflection_descriptor()?,
        })
    }
}

impl Throwable for Exception {
    fn exception(&self) -> &Exception {
        self
    }

    fn exception_mut(&mut self) -> &mut Exception {
        self
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("type", &self.descriptor.name())
            .field("message", &self.message)
            .field("inner", &self.inner)
            .finish()
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.descriptor.name()),
            None => f.write_str(self.descriptor.name()),
        }
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .as_deref()
            .map(|inner| inner.as_error() as &(dyn std::error::Error + 'static))
    }
}

/// Declares an exception class deriving from an existing one.
///
/// The generated type wraps its direct base, dereferences to it, and
/// implements [`Class`], [`Instance`], [`Throwable`], `Display` and
/// `std::error::Error`. Its descriptor is defined in the global registry on
/// first use, with the base's descriptor as base type and no extra fields.
///
/// # Example
///
/// ```rust
/// use reflex::exception_class;
/// use reflex::runtime::{Class, Instance, SystemException};
///
/// exception_class! {
///     /// Raised when a file is missing.
///     pub struct FileNotFoundException: SystemException = "Docs.FileNotFoundException";
/// }
///
/// let err = FileNotFoundException::construct().unwrap();
/// assert!(err.descriptor().is_subtype_of(SystemException::reflection_descriptor()));
/// ```
#[macro_export]
macro_rules! exception_class {
    ($(
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $base:ty = $qualified:literal;
    )*) => {$(
        $(#[$meta])*
        #[derive(Debug)]
        $vis struct $name {
            base: $base,
        }

        impl $name {
            /// Qualified name this class is registered under.
            pub const QUALIFIED_NAME: &'static str = $qualified;
        }

        impl $crate::runtime::Class for $name {
            fn try_reflection_descriptor()
                -> $crate::Result<&'static $crate::runtime::TypeDescriptor>
            {
                static DESCRIPTOR: ::std::sync::OnceLock<
                    $crate::Result<&'static $crate::runtime::TypeDescriptor>,
                > = ::std::sync::OnceLock::new();
                DESCRIPTOR
                    .get_or_init(|| {
                        let base =
                            <$base as $crate::runtime::Class>::try_reflection_descriptor()?;
                        $crate::runtime::define_class_type(
                            $qualified,
                            ::std::vec::Vec::new(),
                            ::std::option::Option::Some(
                                $crate::runtime::boxed_constructor::<$name>,
                            ),
                            ::std::option::Option::Some(base),
                        )
                    })
                    .clone()
            }

            fn construct() -> $crate::Result<Self> {
                let mut base = <$base as $crate::runtime::Class>::construct()?;
                let descriptor =
                    <$name as $crate::runtime::Class>::try_reflection_descriptor()?;
                $crate::runtime::Throwable::exception_mut(&mut base).stamp_descriptor(descriptor);
                ::std::result::Result::Ok($name { base })
            }
        }

        impl $crate::runtime::Instance for $name {
            fn descriptor(&self) -> &'static $crate::runtime::TypeDescriptor {
                $crate::runtime::Instance::descriptor(&self.base)
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::runtime::Throwable for $name {
            fn exception(&self) -> &$crate::runtime::Exception {
                $crate::runtime::Throwable::exception(&self.base)
            }

            fn exception_mut(&mut self) -> &mut $crate::runtime::Exception {
                $crate::runtime::Throwable::exception_mut(&mut self.base)
            }

            fn as_error(&self) -> &(dyn ::std::error::Error + Send + Sync + 'static) {
                self
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $base;

            fn deref(&self) -> &$base {
                &self.base
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt($crate::runtime::Throwable::exception(self), f)
            }
        }

        impl ::std::error::Error for $name {
            fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                ::std::error::Error::source($crate::runtime::Throwable::exception(self))
            }
        }
    )*};
}

crate::exception_class! {
    /// `System.SystemException`: base of exceptions raised by the runtime.
    pub struct SystemException: Exception = "System.SystemException";

    /// `System.TimeoutException`: an operation ran out of time.
    pub struct TimeoutException: SystemException = "System.TimeoutException";
}
