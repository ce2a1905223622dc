//! The process-wide ambient container instance.
//!
//! The ambient instance exists for facade-style call sites that cannot
//! receive a container by handle. Pass the container explicitly wherever
//! possible; its lifecycle is: unset at process start, installed during
//! application bootstrap (lazily by [`global`] or explicitly by
//! [`set_global`]), replaced only explicitly.

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

/// Returns the ambient container, creating and installing an empty one on
/// first access.
pub fn global() -> Arc<Container> {
  if let Some(container) = GLOBAL_CONTAINER.read().as_ref() {
    return container.clone();
  }

  let mut slot = GLOBAL_CONTAINER.write();
  slot
    .get_or_insert_with(|| Arc::new(Container::new()))
    .clone()
}

/// Replaces the ambient container, returning the previous one. Passing
/// `None` clears it, so the next [`global`] call starts fresh; test
/// harnesses use this to reset ambient state between runs.
pub fn set_global(container: Option<Arc<Container>>) -> Option<Arc<Container>> {
  std::mem::replace(&mut *GLOBAL_CONTAINER.write(), container)
}
