//! Error types raised during binding and resolution.

use thiserror::Error;

/// Errors produced by the container.
///
/// All resolution failures propagate synchronously to the caller of
/// [`make`](crate::Container::make), [`call`](crate::Container::call) or
/// [`build`](crate::Container::build). A failed build leaves no partial
/// object behind and pops its build-stack frame before propagating, so
/// diagnostics stay accurate for sibling builds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
  /// The concrete type name is not present in the type registry.
  #[error("Target class [{0}] does not exist.")]
  TypeNotFound(String),

  /// The concrete type is registered but cannot be constructed (an
  /// interface marker, or a type with no registered constructor). The
  /// message carries the chain of types under construction when the
  /// failure occurred.
  #[error("{}", not_instantiable_message(.concrete, .building))]
  NotInstantiable {
    concrete: String,
    building: Vec<String>,
  },

  /// No precedence tier produced a value for a required parameter.
  #[error("Unable to resolve dependency [{0}].")]
  UnresolvedDependency(String),

  /// A callable expression could not be decomposed into a type and a
  /// method, and the named type declares no default `invoke` method.
  #[error("Method not provided.")]
  MethodNotProvided,

  /// A callable names a method the type does not declare.
  #[error("Method [{method}] does not exist on [{type_name}].")]
  MethodNotFound { type_name: String, method: String },

  /// `alias(id, id)` was attempted. Raised immediately, nothing is
  /// registered.
  #[error("[{0}] is aliased to itself.")]
  SelfAlias(String),

  /// Registering the alias would close a multi-hop cycle, or a cycle was
  /// hit while following the alias chain.
  #[error("Alias [{0}] is part of an alias cycle.")]
  AliasCycle(String),
}

impl ContainerError {
  /// True for failures of the build step itself, as opposed to argument
  /// resolution failures. Only build failures allow a class-typed
  /// parameter to fall back to its declared default.
  pub(crate) fn is_build_failure(&self) -> bool {
    matches!(
      self,
      ContainerError::TypeNotFound(_) | ContainerError::NotInstantiable { .. }
    )
  }
}

fn not_instantiable_message(concrete: &str, building: &[String]) -> String {
  if building.is_empty() {
    format!("Target [{concrete}] is not instantiable.")
  } else {
    format!(
      "Target [{concrete}] is not instantiable while building [{}].",
      building.join(", ")
    )
  }
}
