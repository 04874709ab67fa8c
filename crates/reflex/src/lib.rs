//! `Reflex`: runtime type reflection for compiled class hierarchies
//!
//! `Reflex` gives code compiled from a class-based language the type
//! information its host cannot provide. Every compiled class gets an
//! immutable descriptor with its qualified name, declared fields,
//! constructor and base type, and generated code uses those descriptors to
//! answer the questions the source language's own reflection would:
//!
//! - **Type identity** - which exact class is this value?
//! - **Subtype checks** - does this class derive from that one?
//! - **Catch dispatch** - which `catch` clause handles this thrown value?
//!
//! # Architecture
//!
//! - **Descriptors**: allocated once in a process-wide arena, compared by
//!   identity, never freed
//! - **Registry**: qualified name to descriptor, atomic insert-if-absent
//! - **Classes**: `Exception` and the classes declared with
//!   [`exception_class!`] stamp their exact descriptor on construction
//!
//! # Example
//!
//! ```rust
//! use reflex::runtime::{Class, Exception, Instance, TimeoutException, base_chain};
//!
//! let err = TimeoutException::construct().unwrap();
//!
//! assert_eq!(err.descriptor().name(), "System.TimeoutException");
//! assert!(err.descriptor().is_subtype_of(Exception::reflection_descriptor()));
//! assert_eq!(base_chain(err.descriptor()).count(), 3);
//! ```

pub mod config;
pub mod error;
pub mod runtime;

// Re-export commonly used types
pub use config::{InitPolicy, RootPolicy, RuntimeConfig};
pub use error::{Error, Result};
pub use runtime::{
    Class, Exception, Instance, SystemException, Throwable, TimeoutException,
    TypeDescriptor, TypeRegistry, define_class_type, global_registry,
    initialize, is_subtype_of,
};
