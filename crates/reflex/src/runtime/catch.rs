//! Catch-clause dispatch.
//!
//! A `try` block compiled to the host becomes a single handler that receives
//! whatever was thrown and must pick the first `catch` clause whose declared
//! type the thrown value is an instance of. That decision is a subtype query
//! on the thrown value's exact descriptor.

use super::descriptor::TypeDescriptor;
use super::hierarchy::is_subtype_of;
use super::instance::Instance;

/// Returns `true` if a clause catching `handler` accepts `thrown`.
#[must_use]
pub fn catch_matches<T>(thrown: &T, handler: &TypeDescriptor) -> bool
where
    T: Instance + ?Sized,
{
    is_subtype_of(thrown.descriptor(), handler)
}

/// Picks the clause that handles `thrown`.
///
/// `handlers` lists the declared catch types in source order. Returns the
/// index of the first one that `thrown` is an instance of, or `None` if the
/// value must propagate.
///
/// # Example
///
/// ```rust
/// use reflex::runtime::{Class, Exception, SystemException, TimeoutException, dispatch_catch};
///
/// let thrown = TimeoutException::construct().unwrap();
/// let clauses = [
///     Exception::reflection_descriptor(),
///     TimeoutException::reflection_descriptor(),
/// ];
///
/// // The first matching clause wins, even if a later one is more specific
/// assert_eq!(dispatch_catch(&thrown, &clauses), Some(0));
///
/// let system = SystemException::construct().unwrap();
/// assert_eq!(dispatch_catch(&system, &clauses[1..]), None);
/// ```
#[must_use]
pub fn dispatch_catch<T>(thrown: &T, handlers: &[&TypeDescriptor]) -> Option<usize>
where
    T: Instance + ?Sized,
{
    let thrown_type = thrown.descriptor();
    handlers
        .iter()
        .position(|handler| is_subtype_of(thrown_type, handler))
}
