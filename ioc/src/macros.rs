//! Public macros for ergonomic parameter bags.

/// Builds a [`Params`](crate::Params) bag from `key => value` pairs.
///
/// Values are wrapped into services automatically; entries keep their
/// insertion order, which matters for positional fallback during
/// parameter resolution.
///
/// # Examples
///
/// ```
/// use tessera_ioc::{params, Params};
///
/// let empty = params!();
/// assert!(empty.is_empty());
///
/// let overrides = params! {
///   "retries" => 3_u32,
///   "label" => String::from("primary"),
/// };
/// assert_eq!(overrides.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
  () => {
    $crate::Params::new()
  };
  ($($key:expr => $value:expr),+ $(,)?) => {{
    let mut bag = $crate::Params::new();
    $( bag = bag.with($key, $value); )+
    bag
  }};
}
