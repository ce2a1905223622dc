use std::sync::Arc;
use tessera_ioc::{downcast, Container, Recipe};

// A connection pool that should exist exactly once per application.
struct ConnectionPool {
  dsn: String,
}

fn main() {
  let container = Container::new();

  // --- Registration ---

  // A shared binding: the factory runs once, the result is cached.
  container.singleton(
    "db_pool",
    Recipe::provider(|_| ConnectionPool {
      dsn: "postgres://localhost:5432/app".to_string(),
    }),
  );

  // A pre-built value installed directly as a shared instance, bypassing
  // the recipe mechanism entirely.
  container.instance("app_name", String::from("demo"));

  // --- Resolution ---

  let first = container.get("db_pool").unwrap();
  let second = container.get("db_pool").unwrap();

  let pool = downcast::<ConnectionPool>(&first).unwrap();
  println!("pool dsn: {}", pool.dsn);
  println!("same instance: {}", Arc::ptr_eq(&first, &second));

  let name = container.get_as::<String>("app_name").unwrap().unwrap();
  println!("app name: {}", name);
}
