//! # Tessera IoC
//!
//! A thread-safe, string-keyed service container for Rust.
//!
//! Tessera maps abstract identifiers (interface names, type names,
//! arbitrary string keys) to construction recipes and builds fully wired
//! object graphs by resolving each declared constructor parameter,
//! recursively, through the container. Registration is dynamic: bindings,
//! aliases and type descriptions can be added at any point in the
//! application's lifecycle.
//!
//! ## Core Concepts
//!
//! - **Container**: the central registry of bindings, cached shared
//!   instances and aliases.
//! - **Type registry**: because Rust has no constructor reflection, each
//!   concrete type registers a [`TypeDef`] describing its parameter list
//!   and a constructor closure; the container autowires against these
//!   descriptions.
//! - **Recipes**: an identifier resolves to itself, to a named concrete
//!   type, or to a factory closure.
//! - **Shared bindings**: `singleton` / `instance` registrations are
//!   cached and reused; everything else is rebuilt per request.
//! - **Invocation**: [`Container::call`] injects dependencies into free
//!   functions and registered methods, including string callables of the
//!   form `"Type::method"` or `"Type@method"`.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tessera_ioc::{downcast, service, Container, Param, TypeDef};
//!
//! struct Config {
//!   dsn: String,
//! }
//!
//! struct Database {
//!   dsn: String,
//!   retries: u32,
//! }
//!
//! let container = Container::new();
//!
//! // Describe the types the container may build.
//! container.register_type(
//!   TypeDef::new("config").constructor(|_| {
//!     Ok(service(Config {
//!       dsn: "sqlite::memory:".to_string(),
//!     }))
//!   }),
//! );
//! container.register_type(
//!   TypeDef::new("database")
//!     .param(Param::of("config", "config"))
//!     .param(Param::new("retries").default_value(3_u32))
//!     .constructor(|mut args| {
//!       let config = downcast::<Config>(&args.remove(0)).unwrap();
//!       let retries = *downcast::<u32>(&args.remove(0)).unwrap();
//!       Ok(service(Database {
//!         dsn: config.dsn.clone(),
//!         retries,
//!       }))
//!     }),
//! );
//!
//! // Bind "db" to the concrete "database" type, singleton-scoped.
//! container.singleton("db", "database");
//!
//! let db = downcast::<Database>(&container.get("db").unwrap()).unwrap();
//! assert_eq!(db.dsn, "sqlite::memory:");
//! assert_eq!(db.retries, 3);
//!
//! // Shared bindings return the identical cached instance.
//! let again = downcast::<Database>(&container.get("db").unwrap()).unwrap();
//! assert!(Arc::ptr_eq(&db, &again));
//! ```

mod bound_method;
mod container;
mod core;
mod error;
mod global;
mod macros;
mod reflect;

pub use bound_method::Callable;
pub use container::Container;
pub use crate::core::{
  downcast, service, Binding, FactoryFn, Params, Recipe, ResolvingCallback, Service,
};
pub use error::ContainerError;
pub use global::{global, set_global};
pub use reflect::{BodyFn, FunctionDef, Param, TypeDef};
