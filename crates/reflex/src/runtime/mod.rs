//! `Reflex` runtime module.
//!
//! This module provides the type-reflection runtime:
//!
//! - Type descriptors and their process-wide storage
//! - The type registry and `define_class_type`
//! - Hierarchy queries and catch-clause dispatch
//! - The built-in exception classes
//!
//! # Architecture
//!
//! - [`descriptor`]: `TypeDescriptor`, `FieldDescriptor`, `TypeDefinition`
//! - [`registry`]: name table, atomic insert-if-absent definition
//! - [`hierarchy`]: base chains and subtype queries
//! - [`catch`]: catch-clause dispatch
//! - [`instance`]: the `Instance` and `Class` traits
//! - [`exception`]: `Exception`, `SystemException`, `TimeoutException`
//!
//! # Lifecycle
//!
//! Descriptors are allocated in one process-wide arena and are never freed.
//! The global registry is created on first use, or by [`initialize`] with an
//! explicit [`RuntimeConfig`]. Definitions are expected to happen during
//! start-up; after that the registry is read-mostly.

pub mod catch;
pub mod descriptor;
pub mod exception;
pub mod hierarchy;
pub mod instance;
pub mod registry;

pub use catch::{catch_matches, dispatch_catch};
pub use descriptor::{Constructor, FieldDescriptor, TypeDefinition, TypeDescriptor};
pub use exception::{Exception, SystemException, Throwable, TimeoutException};
pub use hierarchy::{BaseChain, base_chain, common_base, display_name, is_subtype_of};
pub use instance::{Class, Instance, boxed_constructor, construct, downcast};
pub use registry::{TypeRegistry, define_class_type};

use crate::config::{InitPolicy, RuntimeConfig};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use reflex_log::{info, warn};
use reflex_mem::MetaArena;
use reflex_mem::arena::MAX_CHUNK_ITEMS;
use std::sync::OnceLock;

static DESCRIPTOR_ARENA: OnceLock<MetaArena<TypeDescriptor>> = OnceLock::new();

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

static INITIALIZED: OnceLock<RuntimeConfig> = OnceLock::new();

/// Serializes calls to [`initialize`].
static INIT_LOCK: Mutex<()> = parking_lot::const_mutex(());

/// Returns the arena every descriptor is allocated in.
pub(crate) fn descriptor_arena() -> &'static MetaArena<TypeDescriptor> {
    DESCRIPTOR_ARENA.get_or_init(|| MetaArena::with_chunk_size(RuntimeConfig::default().arena_chunk_size))
}

/// Returns the process-wide type registry.
///
/// Created with [`RuntimeConfig::default`] on first use unless
/// [`initialize`] ran first.
#[must_use]
pub fn global_registry() -> &'static TypeRegistry {
    GLOBAL_REGISTRY.get_or_init(|| TypeRegistry::with_config(&RuntimeConfig::default()))
}

/// Initializes the runtime with `config`.
///
/// Applies the log level, sizes the descriptor arena and creates the global
/// registry with the configured root policy. With [`InitPolicy::Eager`] the
/// built-in exception descriptors are registered before this returns.
///
/// The arena and the registry are created on first use. If either already
/// exists, its settings must match `config`; nothing is changed otherwise.
///
/// # Errors
///
/// - [`Error::AlreadyInitialized`] on every call after a successful one
/// - [`Error::RegistryInUse`] if the arena or the registry was used before
///   this call with a different chunk size or root policy
/// - any registry error raised while registering built-in descriptors
///   eagerly
pub fn initialize(config: RuntimeConfig) -> Result<()> {
    let _guard = INIT_LOCK.lock();
    if INITIALIZED.get().is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let arena =
        DESCRIPTOR_ARENA.get_or_init(|| MetaArena::with_chunk_size(config.arena_chunk_size));
    if arena.chunk_size() != config.arena_chunk_size.clamp(1, MAX_CHUNK_ITEMS) {
        warn!(
            "descriptor arena already in use with chunk size {}; requested {}",
            arena.chunk_size(),
            config.arena_chunk_size
        );
        return Err(Error::RegistryInUse {
            setting: "arena_chunk_size",
        });
    }

    let registry = GLOBAL_REGISTRY.get_or_init(|| TypeRegistry::with_config(&config));
    if registry.root_policy() != &config.root_policy {
        warn!(
            "global registry already in use with root policy {:?}; requested {:?}",
            registry.root_policy(),
            config.root_policy
        );
        return Err(Error::RegistryInUse {
            setting: "root_policy",
        });
    }

    reflex_log::set_level(config.log_level);

    if config.init_policy == InitPolicy::Eager {
        Exception::try_reflection_descriptor()?;
        SystemException::try_reflection_descriptor()?;
        TimeoutException::try_reflection_descriptor()?;
    }

    info!(
        "runtime initialized ({:?}, {} types registered)",
        config.init_policy,
        registry.len()
    );
    if INITIALIZED.set(config).is_err() {
        return Err(Error::AlreadyInitialized);
    }
    Ok(())
}

/// Returns the configuration passed to [`initialize`], if it ran.
#[must_use]
pub fn runtime_config() -> Option<&'static RuntimeConfig> {
    INITIALIZED.get()
}
