//! The `Container` struct and its public API.

use crate::bound_method::{self, Callable};
use crate::core::{service, Binding, BuildFrame, Params, Recipe, ResolvingCallback, Service};
use crate::error::ContainerError;
use crate::reflect::TypeDef;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// A string-keyed service container.
///
/// The container maps abstract identifiers to construction recipes and
/// builds fully wired object graphs by resolving each declared parameter
/// of a type's constructor, recursively, through itself.
///
/// It is thread-safe: registration and resolution may happen from any
/// thread at any point in the application's lifecycle. Re-entrant
/// resolution (a constructor parameter triggering a nested `make`) is
/// supported because no internal lock is held across user code.
#[derive(Default)]
pub struct Container {
  bindings: DashMap<String, Binding>,
  instances: DashMap<String, Service>,
  aliases: DashMap<String, String>,
  resolved: DashSet<String>,
  types: DashMap<String, Arc<TypeDef>>,
  build_stack: Mutex<Vec<String>>,
  global_resolving: Mutex<Vec<ResolvingCallback>>,
  resolving: Mutex<Vec<(String, ResolvingCallback)>>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- Type registry ---

  /// Registers a type description with the container's reflection
  /// facility. Registered types survive [`flush`](Self::flush), exactly
  /// as compiled types survive a registry reset.
  pub fn register_type(&self, def: TypeDef) {
    trace!(name = def.name(), "registering type");
    self.types.insert(def.name().to_owned(), Arc::new(def));
  }

  pub(crate) fn type_def(&self, name: &str) -> Option<Arc<TypeDef>> {
    self.types.get(name).map(|entry| entry.value().clone())
  }

  // --- Binding registration ---

  /// Registers a binding. Re-binding an identifier evicts its stale
  /// cached instance and any alias recorded under the same name, so a
  /// later resolve can never return a value built under an obsolete
  /// recipe.
  pub fn bind(&self, id: &str, recipe: impl Into<Recipe>, shared: bool) {
    self.drop_stale_instances(id);

    let recipe = recipe.into();
    trace!(id, ?recipe, shared, "registering binding");
    self.bindings.insert(id.to_owned(), Binding { recipe, shared });
  }

  /// Registers a binding only if nothing is known under `id` yet.
  pub fn bind_if(&self, id: &str, recipe: impl Into<Recipe>, shared: bool) {
    if !self.has(id) {
      self.bind(id, recipe, shared);
    }
  }

  /// Registers a shared (singleton-scoped) binding.
  pub fn singleton(&self, id: &str, recipe: impl Into<Recipe>) {
    self.bind(id, recipe, true);
  }

  /// Stores a pre-built value as a shared instance, bypassing the recipe
  /// mechanism. Any alias recorded under `id` is removed so the
  /// identifier is never misread as an alias target. Returns the stored
  /// service.
  pub fn instance<T: Any + Send + Sync>(&self, id: &str, value: T) -> Service {
    self.instance_arc(id, service(value))
  }

  /// [`instance`](Self::instance) for an already type-erased value.
  pub fn instance_arc(&self, id: &str, value: Service) -> Service {
    self.aliases.remove(id);
    trace!(id, "storing shared instance");
    self.instances.insert(id.to_owned(), value.clone());
    value
  }

  // --- Aliases ---

  /// Aliases `abstract_id` under the additional name `alias`.
  ///
  /// Fails immediately on self-aliasing, and on any registration that
  /// would close a multi-hop alias cycle.
  pub fn alias(&self, abstract_id: &str, alias: &str) -> Result<(), ContainerError> {
    if alias == abstract_id {
      return Err(ContainerError::SelfAlias(abstract_id.to_owned()));
    }

    // Following the chain from the target must never lead back to the
    // name being registered.
    let mut seen = HashSet::new();
    let mut current = abstract_id.to_owned();
    while let Some(next) = self.alias_target(&current) {
      if next == alias || !seen.insert(next.clone()) {
        return Err(ContainerError::AliasCycle(alias.to_owned()));
      }
      current = next;
    }

    self.aliases.insert(alias.to_owned(), abstract_id.to_owned());
    Ok(())
  }

  /// Whether `name` is registered as an alias.
  pub fn is_alias(&self, name: &str) -> bool {
    self.aliases.contains_key(name)
  }

  /// Follows the alias chain to its canonical identifier. Names that were
  /// never aliased come back unchanged. The chain is bounded by a visited
  /// set, so a pathological cycle surfaces as `AliasCycle` rather than an
  /// infinite loop.
  pub fn resolve_alias(&self, name: &str) -> Result<String, ContainerError> {
    let mut seen = HashSet::new();
    let mut current = name.to_owned();
    while let Some(next) = self.alias_target(&current) {
      if !seen.insert(current) {
        return Err(ContainerError::AliasCycle(name.to_owned()));
      }
      current = next;
    }
    Ok(current)
  }

  fn alias_target(&self, name: &str) -> Option<String> {
    self.aliases.get(name).map(|entry| entry.value().clone())
  }

  // --- Introspection ---

  /// True if a binding, a cached instance, or an alias exists for `id`.
  pub fn has(&self, id: &str) -> bool {
    self.bindings.contains_key(id) || self.instances.contains_key(id) || self.is_alias(id)
  }

  /// True if `id` has been resolved at least once.
  pub fn resolved(&self, id: &str) -> bool {
    let id = self
      .resolve_alias(id)
      .unwrap_or_else(|_| id.to_owned());
    self.resolved.contains(&id) || self.instances.contains_key(&id)
  }

  /// True if `id` resolves to a cached or cacheable shared value.
  pub fn is_shared(&self, id: &str) -> bool {
    self.instances.contains_key(id)
      || self
        .bindings
        .get(id)
        .map(|binding| binding.shared)
        .unwrap_or(false)
  }

  /// A snapshot of the registered bindings.
  pub fn bindings(&self) -> Vec<(String, Binding)> {
    self
      .bindings
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect()
  }

  // --- Resolution ---

  /// Resolves `id` from the container.
  ///
  /// With an empty `params` a cached shared instance is returned as-is;
  /// passing explicit parameters always produces a fresh, uncached value,
  /// even for a shared identifier, so callers can override dependencies
  /// for one-off construction without polluting the shared cache.
  pub fn make(&self, id: &str, params: Params) -> Result<Service, ContainerError> {
    self.resolve(id, params)
  }

  /// Shorthand for [`make`](Self::make) with no explicit parameters.
  pub fn get(&self, id: &str) -> Result<Service, ContainerError> {
    self.make(id, Params::new())
  }

  /// Resolves `id` and downcasts the result.
  pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Option<Arc<T>>, ContainerError> {
    Ok(crate::core::downcast::<T>(&self.get(id)?))
  }

  fn resolve(&self, id: &str, params: Params) -> Result<Service, ContainerError> {
    let abstract_id = self.resolve_alias(id)?;
    let no_contextual = params.is_empty();

    if no_contextual {
      if let Some(hit) = self.instances.get(&abstract_id) {
        trace!(id = %abstract_id, "returning cached shared instance");
        return Ok(hit.value().clone());
      }
    }

    let recipe = self.concrete_for(&abstract_id);
    let built_type = match &recipe {
      Recipe::SelfBound => Some(abstract_id.clone()),
      Recipe::Type(name) => Some(name.clone()),
      Recipe::Factory(_) => None,
    };

    debug!(id = %abstract_id, ?recipe, "resolving");
    let object = match recipe {
      Recipe::SelfBound => self.build_type(&abstract_id, params)?,
      Recipe::Type(name) => self.build_type(&name, params)?,
      Recipe::Factory(factory) => factory(self, params.into_ordered())?,
    };

    if no_contextual && self.is_shared(&abstract_id) {
      self.instances.insert(abstract_id.clone(), object.clone());
    }

    self.fire_resolving_callbacks(&abstract_id, built_type.as_deref(), &object);

    self.resolved.insert(abstract_id);

    Ok(object)
  }

  fn concrete_for(&self, abstract_id: &str) -> Recipe {
    self
      .bindings
      .get(abstract_id)
      .map(|binding| binding.recipe.clone())
      .unwrap_or(Recipe::SelfBound)
  }

  /// Instantiates a concrete recipe directly, outside the binding table.
  ///
  /// Factory recipes are invoked with the container and the ordered
  /// explicit parameters, bypassing the type registry entirely. A
  /// `SelfBound` recipe carries no type name of its own and cannot be
  /// built here.
  pub fn build(&self, recipe: impl Into<Recipe>, params: Params) -> Result<Service, ContainerError> {
    match recipe.into() {
      Recipe::Factory(factory) => factory(self, params.into_ordered()),
      Recipe::Type(name) => self.build_type(&name, params),
      Recipe::SelfBound => Err(ContainerError::TypeNotFound("<self>".to_owned())),
    }
  }

  fn build_type(&self, concrete: &str, params: Params) -> Result<Service, ContainerError> {
    let def = match self.type_def(concrete) {
      Some(def) => def,
      None => return Err(ContainerError::TypeNotFound(concrete.to_owned())),
    };

    if !def.is_instantiable() {
      return Err(self.not_instantiable(concrete));
    }

    debug!(concrete, "building");
    let _frame = BuildFrame::push(&self.build_stack, concrete);

    let args = bound_method::resolve_dependencies(self, def.params(), params)?;
    def.construct(args)
  }

  fn not_instantiable(&self, concrete: &str) -> ContainerError {
    ContainerError::NotInstantiable {
      concrete: concrete.to_owned(),
      building: self.build_stack.lock().clone(),
    }
  }

  // --- Resolving callbacks ---

  /// Registers a callback fired after every resolution.
  pub fn resolving<F>(&self, callback: F)
  where
    F: Fn(&Service, &Container) + Send + Sync + 'static,
  {
    self.global_resolving.lock().push(Arc::new(callback));
  }

  /// Registers a callback fired when the resolved abstract matches `id`,
  /// or when the built concrete type declares `id` among its
  /// capabilities.
  pub fn resolving_for<F>(&self, id: &str, callback: F)
  where
    F: Fn(&Service, &Container) + Send + Sync + 'static,
  {
    let id = self
      .resolve_alias(id)
      .unwrap_or_else(|_| id.to_owned());
    self.resolving.lock().push((id, Arc::new(callback)));
  }

  /// Fires callbacks in registration order, globals before per-identifier
  /// ones. Snapshots are taken first so callbacks may freely re-enter the
  /// container.
  fn fire_resolving_callbacks(&self, abstract_id: &str, built: Option<&str>, object: &Service) {
    let globals: Vec<ResolvingCallback> = self.global_resolving.lock().iter().cloned().collect();
    for callback in globals {
      callback(object, self);
    }

    let matched: Vec<ResolvingCallback> = {
      let registered = self.resolving.lock();
      registered
        .iter()
        .filter(|(id, _)| id == abstract_id || self.built_satisfies(built, id))
        .map(|(_, callback)| callback.clone())
        .collect()
    };
    for callback in matched {
      callback(object, self);
    }
  }

  fn built_satisfies(&self, built: Option<&str>, id: &str) -> bool {
    built
      .and_then(|concrete| self.type_def(concrete))
      .map(|def| def.satisfies(id))
      .unwrap_or(false)
  }

  // --- Invocation helpers ---

  /// Calls a callable after injecting its declared dependencies.
  pub fn call(&self, callable: impl Into<Callable>, params: Params) -> Result<Service, ContainerError> {
    bound_method::call(self, callable.into(), params)
  }

  /// A zero-argument thunk that resolves `id` when invoked.
  pub fn factory<'a>(&'a self, id: &str) -> impl Fn() -> Result<Service, ContainerError> + 'a {
    let id = id.to_owned();
    move || self.make(&id, Params::new())
  }

  /// A zero-argument thunk that calls `callable` with dependency
  /// injection when invoked.
  pub fn wrap<'a>(
    &'a self,
    callable: impl Into<Callable>,
    params: Params,
  ) -> impl Fn() -> Result<Service, ContainerError> + 'a {
    let callable = callable.into();
    move || bound_method::call(self, callable.clone(), params.clone())
  }

  // --- Convenience accessors ---

  /// Existence check mirroring [`has`](Self::has).
  pub fn contains(&self, id: &str) -> bool {
    self.has(id)
  }

  /// Binds `id` non-shared. The write-side convenience accessor.
  pub fn set(&self, id: &str, recipe: impl Into<Recipe>) {
    self.bind(id, recipe, false);
  }

  /// Binds `id` shared.
  pub fn set_shared(&self, id: &str, recipe: impl Into<Recipe>) {
    self.bind(id, recipe, true);
  }

  /// Removes the binding, cached instance and resolved flag for `id`.
  /// Aliases pointing at `id` are left in place.
  pub fn unset(&self, id: &str) {
    self.bindings.remove(id);
    self.instances.remove(id);
    self.resolved.remove(id);
  }

  // --- Teardown ---

  /// Evicts the cached shared instance for `id`.
  pub fn forget_instance(&self, id: &str) {
    self.instances.remove(id);
  }

  /// Evicts every cached shared instance.
  pub fn forget_instances(&self) {
    self.instances.clear();
  }

  /// Clears all bindings, instances, aliases and resolved flags. The type
  /// registry and registered callbacks survive.
  pub fn flush(&self) {
    self.aliases.clear();
    self.resolved.clear();
    self.bindings.clear();
    self.instances.clear();
  }

  fn drop_stale_instances(&self, id: &str) {
    self.instances.remove(id);
    self.aliases.remove(id);
  }
}
