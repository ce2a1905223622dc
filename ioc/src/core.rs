//! Core data structures shared across the container.

use crate::container::Container;
use crate::error::ContainerError;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// An opaque constructed value owned by the container.
///
/// Services are stored and passed around type-erased; use [`downcast`] to
/// recover the concrete type on the consuming side.
pub type Service = Arc<dyn Any + Send + Sync>;

/// A factory recipe body. Receives the container and the explicit
/// parameters in their original insertion order.
pub type FactoryFn =
  Arc<dyn Fn(&Container, Vec<Service>) -> Result<Service, ContainerError> + Send + Sync>;

/// A resolving callback, fired with the freshly built service and the
/// container after construction but before the value is returned.
pub type ResolvingCallback = Arc<dyn Fn(&Service, &Container) + Send + Sync>;

/// Wraps a value into a [`Service`].
pub fn service<T: Any + Send + Sync>(value: T) -> Service {
  Arc::new(value)
}

/// Recovers the concrete type of a [`Service`].
///
/// Returns `None` if the service does not hold a `T`.
pub fn downcast<T: Any + Send + Sync>(service: &Service) -> Option<Arc<T>> {
  Arc::clone(service).downcast::<T>().ok()
}

/// What to construct when an abstract identifier is resolved.
#[derive(Clone)]
pub enum Recipe {
  /// Build the abstract identifier itself as a concrete type.
  SelfBound,
  /// Build the named concrete type through the type registry.
  Type(String),
  /// Invoke a factory directly, bypassing the type registry.
  Factory(FactoryFn),
}

impl Recipe {
  /// A factory recipe from a closure over the container and the ordered
  /// explicit parameters.
  pub fn factory<F>(f: F) -> Self
  where
    F: Fn(&Container, Vec<Service>) -> Result<Service, ContainerError> + Send + Sync + 'static,
  {
    Recipe::Factory(Arc::new(f))
  }

  /// A factory recipe that ignores explicit parameters and cannot fail.
  /// The produced value is wrapped into a [`Service`] automatically.
  pub fn provider<T, F>(f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Container) -> T + Send + Sync + 'static,
  {
    Recipe::Factory(Arc::new(move |container, _| Ok(service(f(container)))))
  }
}

impl From<&str> for Recipe {
  fn from(concrete: &str) -> Self {
    Recipe::Type(concrete.to_owned())
  }
}

impl From<String> for Recipe {
  fn from(concrete: String) -> Self {
    Recipe::Type(concrete)
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Recipe::SelfBound => write!(f, "Recipe::SelfBound"),
      Recipe::Type(name) => write!(f, "Recipe::Type({name})"),
      Recipe::Factory(_) => write!(f, "Recipe::Factory(..)"),
    }
  }
}

/// A registered construction recipe plus its singleton flag.
#[derive(Clone, Debug)]
pub struct Binding {
  pub(crate) recipe: Recipe,
  pub(crate) shared: bool,
}

impl Binding {
  /// The construction recipe.
  pub fn recipe(&self) -> &Recipe {
    &self.recipe
  }

  /// Whether resolutions of this binding are cached and reused.
  pub fn shared(&self) -> bool {
    self.shared
  }
}

/// Explicit parameter overrides passed to [`Container::make`] and
/// [`Container::call`].
///
/// Entries keep their insertion order. During parameter resolution an
/// entry is consumed at most once: a by-name or by-type match removes it
/// from the pool, and untyped parameters shift entries off the front in
/// insertion order regardless of key.
#[derive(Clone, Default)]
pub struct Params {
  entries: Vec<(String, Service)>,
}

impl Params {
  /// An empty parameter bag.
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends an entry, wrapping the value into a [`Service`].
  pub fn with<T: Any + Send + Sync>(self, key: &str, value: T) -> Self {
    self.with_service(key, service(value))
  }

  /// Appends an already type-erased entry.
  pub fn with_service(mut self, key: &str, value: Service) -> Self {
    self.entries.push((key.to_owned(), value));
    self
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Consumes the first entry stored under `key`.
  pub(crate) fn take(&mut self, key: &str) -> Option<Service> {
    let index = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(index).1)
  }

  /// Consumes the first remaining entry regardless of its key.
  pub(crate) fn shift(&mut self) -> Option<Service> {
    if self.entries.is_empty() {
      None
    } else {
      Some(self.entries.remove(0).1)
    }
  }

  /// The remaining values in insertion order, keys discarded.
  pub(crate) fn into_ordered(self) -> Vec<Service> {
    self.entries.into_iter().map(|(_, v)| v).collect()
  }
}

impl fmt::Debug for Params {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.entries.iter().map(|(k, _)| k))
      .finish()
  }
}

/// An RAII frame on the diagnostic build stack.
///
/// Pushes the concrete type name on creation and pops it on drop, so the
/// stack stays accurate on every exit path, including failures.
pub(crate) struct BuildFrame<'a> {
  stack: &'a Mutex<Vec<String>>,
}

impl<'a> BuildFrame<'a> {
  pub(crate) fn push(stack: &'a Mutex<Vec<String>>, concrete: &str) -> Self {
    stack.lock().push(concrete.to_owned());
    Self { stack }
  }
}

impl Drop for BuildFrame<'_> {
  fn drop(&mut self) {
    self.stack.lock().pop();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn params_take_consumes_a_single_entry() {
    let mut params = Params::new().with("a", 1_i32).with("a", 2_i32);
    assert!(params.take("a").is_some());
    assert_eq!(params.len(), 1);
    assert!(params.take("missing").is_none());
  }

  #[test]
  fn params_shift_follows_insertion_order() {
    let mut params = Params::new().with("b", 2_i32).with("a", 1_i32);
    let first = params.shift().unwrap();
    assert_eq!(*downcast::<i32>(&first).unwrap(), 2);
  }

  #[test]
  fn build_frame_pops_on_drop() {
    let stack = Mutex::new(Vec::new());
    {
      let _frame = BuildFrame::push(&stack, "outer");
      let _inner = BuildFrame::push(&stack, "inner");
      assert_eq!(*stack.lock(), vec!["outer".to_string(), "inner".to_string()]);
    }
    assert!(stack.lock().is_empty());
  }
}
