//! `Reflex` memory management infrastructure
//!
//! This crate provides the storage primitive behind runtime metadata:
//!
//! - **Metadata arena**: append-only, typed storage whose references stay
//!   valid for as long as the arena lives (forever, for the global ones)
//!

pub mod arena;

pub use arena::{ArenaStats, MetaArena};
