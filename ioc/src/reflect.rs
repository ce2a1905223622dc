//! The registration-time type registry the builder "reflects" over.
//!
//! Rust has no runtime constructor reflection, so concrete types describe
//! themselves to the container up front: a [`TypeDef`] carries the
//! constructor's parameter list and a closure that assembles the value from
//! the resolved arguments. The container's reflective builder walks these
//! descriptions exactly the way a reflection-based container walks real
//! constructor signatures.

use crate::core::{service, Service};
use crate::error::ContainerError;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A constructor or method body. Receives the resolved arguments in
/// declaration order.
pub type BodyFn = Arc<dyn Fn(Vec<Service>) -> Result<Service, ContainerError> + Send + Sync>;

/// One formal parameter of a constructor or callable.
pub struct Param {
  name: String,
  class: Option<String>,
  default: Option<Service>,
}

impl Param {
  /// An untyped required parameter.
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      class: None,
      default: None,
    }
  }

  /// A parameter declared with a class/interface identifier. Such
  /// parameters are auto-resolved through the container when no explicit
  /// override matches.
  pub fn of(name: &str, class: &str) -> Self {
    Self {
      name: name.to_owned(),
      class: Some(class.to_owned()),
      default: None,
    }
  }

  /// Declares a default value, making the parameter optional.
  pub fn default_value<T: Any + Send + Sync>(self, value: T) -> Self {
    self.default_service(service(value))
  }

  /// Declares an already type-erased default value.
  pub fn default_service(mut self, value: Service) -> Self {
    self.default = Some(value);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn class(&self) -> Option<&str> {
    self.class.as_deref()
  }

  pub(crate) fn default(&self) -> Option<&Service> {
    self.default.as_ref()
  }
}

impl fmt::Debug for Param {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut dbg = f.debug_struct("Param");
    dbg.field("name", &self.name);
    if let Some(class) = &self.class {
      dbg.field("class", class);
    }
    dbg.field("optional", &self.default.is_some());
    dbg.finish()
  }
}

/// A free function or method with a declared parameter list, invocable
/// through [`Container::call`](crate::Container::call) with dependency
/// injection.
pub struct FunctionDef {
  params: Vec<Param>,
  body: BodyFn,
}

impl FunctionDef {
  /// A callable with no declared parameters. Add them with [`param`](Self::param).
  pub fn new<F>(body: F) -> Self
  where
    F: Fn(Vec<Service>) -> Result<Service, ContainerError> + Send + Sync + 'static,
  {
    Self {
      params: Vec::new(),
      body: Arc::new(body),
    }
  }

  /// Appends a formal parameter. Declaration order is resolution order.
  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub(crate) fn invoke(&self, args: Vec<Service>) -> Result<Service, ContainerError> {
    (self.body)(args)
  }
}

/// A concrete type description: its constructor signature, the methods it
/// exposes to [`Container::call`](crate::Container::call), and the
/// capability identifiers it satisfies.
pub struct TypeDef {
  name: String,
  instantiable: bool,
  params: Vec<Param>,
  constructor: Option<BodyFn>,
  methods: HashMap<String, Arc<FunctionDef>>,
  implements: HashSet<String>,
}

impl TypeDef {
  /// An instantiable concrete type. A constructor must be supplied with
  /// [`constructor`](Self::constructor) before the type can be built.
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      instantiable: true,
      params: Vec::new(),
      constructor: None,
      methods: HashMap::new(),
      implements: HashSet::new(),
    }
  }

  /// An abstract type or interface marker. Building it directly fails
  /// with `NotInstantiable`; bind a concrete recipe under its identifier
  /// instead.
  pub fn interface(name: &str) -> Self {
    Self {
      instantiable: false,
      ..Self::new(name)
    }
  }

  /// Records a capability identifier this type satisfies. Used by
  /// per-identifier resolving callbacks to match objects built under a
  /// different abstract.
  pub fn implements(mut self, id: &str) -> Self {
    self.implements.insert(id.to_owned());
    self
  }

  /// Appends a constructor parameter. Declaration order is resolution
  /// order.
  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  /// The constructor body, invoked with the resolved arguments.
  pub fn constructor<F>(mut self, body: F) -> Self
  where
    F: Fn(Vec<Service>) -> Result<Service, ContainerError> + Send + Sync + 'static,
  {
    self.constructor = Some(Arc::new(body));
    self
  }

  /// Declares a method invocable via `call` as `"name::method"` or
  /// `"name@method"`. A method named `invoke` is the type's default
  /// invocation method.
  pub fn method(mut self, name: &str, def: FunctionDef) -> Self {
    self.methods.insert(name.to_owned(), Arc::new(def));
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// True when the type can actually be constructed.
  pub fn is_instantiable(&self) -> bool {
    self.instantiable && self.constructor.is_some()
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub(crate) fn construct(&self, args: Vec<Service>) -> Result<Service, ContainerError> {
    match &self.constructor {
      Some(body) => body(args),
      None => Err(ContainerError::NotInstantiable {
        concrete: self.name.clone(),
        building: Vec::new(),
      }),
    }
  }

  pub(crate) fn find_method(&self, name: &str) -> Option<Arc<FunctionDef>> {
    self.methods.get(name).cloned()
  }

  pub(crate) fn satisfies(&self, id: &str) -> bool {
    self.name == id || self.implements.contains(id)
  }
}

impl fmt::Debug for TypeDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeDef")
      .field("name", &self.name)
      .field("instantiable", &self.is_instantiable())
      .field("params", &self.params)
      .field("methods", &self.methods.keys().collect::<Vec<_>>())
      .finish()
  }
}
