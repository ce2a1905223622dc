//! Callable normalization and the parameter precedence chain.
//!
//! Every formal parameter of a constructor or invoked callable is resolved
//! through the same fixed precedence, first match wins:
//!
//! 1. explicit entry keyed by the parameter's own name;
//! 2. explicit entry keyed by the parameter's declared class identifier;
//! 3. class-typed auto-resolution through the container, falling back to
//!    the declared default only when the build itself failed;
//! 4. for untyped parameters, the first unconsumed explicit entry in
//!    insertion order;
//! 5. the declared default value;
//! 6. otherwise the parameter is unresolvable.

use crate::container::Container;
use crate::core::{Params, Service};
use crate::error::ContainerError;
use crate::reflect::{FunctionDef, Param};
use std::sync::Arc;
use tracing::trace;

/// The default invocation method looked up for bare type-name callables
/// and for `Type::` / `Type@` expressions with an empty method part.
const INVOKE_METHOD: &str = "invoke";

/// Something [`Container::call`] can invoke with dependency injection.
#[derive(Clone)]
pub enum Callable {
  /// A free function or closure with a declared signature.
  Function(Arc<FunctionDef>),
  /// A method bound to a registered type.
  Method { type_name: String, method: String },
  /// A string expression: `Type::method`, `Type@method`, or a bare
  /// invocable type name.
  Expr(String),
}

impl From<FunctionDef> for Callable {
  fn from(def: FunctionDef) -> Self {
    Callable::Function(Arc::new(def))
  }
}

impl From<Arc<FunctionDef>> for Callable {
  fn from(def: Arc<FunctionDef>) -> Self {
    Callable::Function(def)
  }
}

impl From<&str> for Callable {
  fn from(expr: &str) -> Self {
    Callable::Expr(expr.to_owned())
  }
}

impl From<String> for Callable {
  fn from(expr: String) -> Self {
    Callable::Expr(expr)
  }
}

impl From<(&str, &str)> for Callable {
  fn from((type_name, method): (&str, &str)) -> Self {
    Callable::Method {
      type_name: type_name.to_owned(),
      method: method.to_owned(),
    }
  }
}

/// Invokes `callable` after resolving its declared parameters.
pub(crate) fn call(
  container: &Container,
  callable: Callable,
  params: Params,
) -> Result<Service, ContainerError> {
  let function = reflect_callable(container, callable)?;
  let args = resolve_dependencies(container, function.params(), params)?;
  function.invoke(args)
}

/// Normalizes a callable into its reflectable function definition.
fn reflect_callable(
  container: &Container,
  callable: Callable,
) -> Result<Arc<FunctionDef>, ContainerError> {
  match callable {
    Callable::Function(def) => Ok(def),
    Callable::Method { type_name, method } => method_on(container, &type_name, &method),
    Callable::Expr(expr) => {
      let (type_name, method) = parse_expr(container, &expr)?;
      method_on(container, &type_name, &method)
    }
  }
}

/// Decomposes a string callback into a `(type, method)` pair.
///
/// `Type::method` and `Type@method` split on their separator; a bare name
/// or an empty method part falls back to the type's default `invoke`
/// method when it declares one.
fn parse_expr(container: &Container, expr: &str) -> Result<(String, String), ContainerError> {
  let (type_name, method) = if let Some((t, m)) = expr.split_once("::") {
    (t, m)
  } else if let Some((t, m)) = expr.split_once('@') {
    (t, m)
  } else {
    (expr, "")
  };

  if !method.is_empty() {
    return Ok((type_name.to_owned(), method.to_owned()));
  }

  let has_invoke = container
    .type_def(type_name)
    .map(|def| def.find_method(INVOKE_METHOD).is_some())
    .unwrap_or(false);
  if has_invoke {
    Ok((type_name.to_owned(), INVOKE_METHOD.to_owned()))
  } else {
    Err(ContainerError::MethodNotProvided)
  }
}

fn method_on(
  container: &Container,
  type_name: &str,
  method: &str,
) -> Result<Arc<FunctionDef>, ContainerError> {
  let def = container
    .type_def(type_name)
    .ok_or_else(|| ContainerError::TypeNotFound(type_name.to_owned()))?;
  def
    .find_method(method)
    .ok_or_else(|| ContainerError::MethodNotFound {
      type_name: type_name.to_owned(),
      method: method.to_owned(),
    })
}

/// Resolves every formal parameter in declaration order, consuming
/// explicit overrides from `params` as the precedence chain dictates.
pub(crate) fn resolve_dependencies(
  container: &Container,
  spec: &[Param],
  mut params: Params,
) -> Result<Vec<Service>, ContainerError> {
  let mut deps = Vec::with_capacity(spec.len());

  for param in spec {
    deps.push(resolve_parameter(container, param, &mut params)?);
  }

  Ok(deps)
}

fn resolve_parameter(
  container: &Container,
  param: &Param,
  params: &mut Params,
) -> Result<Service, ContainerError> {
  if let Some(value) = params.take(param.name()) {
    trace!(param = param.name(), "matched explicit parameter by name");
    return Ok(value);
  }

  if let Some(class) = param.class() {
    if let Some(value) = params.take(class) {
      trace!(param = param.name(), class, "matched explicit parameter by type");
      return Ok(value);
    }
    return match container.make(class, Params::new()) {
      Ok(value) => Ok(value),
      // A failed build may still be satisfied by the declared default;
      // argument resolution failures always propagate.
      Err(err) if err.is_build_failure() => match param.default() {
        Some(default) => Ok(default.clone()),
        None => Err(err),
      },
      Err(err) => Err(err),
    };
  }

  if let Some(value) = params.shift() {
    trace!(param = param.name(), "matched positional explicit parameter");
    return Ok(value);
  }

  if let Some(default) = param.default() {
    return Ok(default.clone());
  }

  Err(ContainerError::UnresolvedDependency(param.name().to_owned()))
}
