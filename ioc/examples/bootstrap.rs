use std::sync::Arc;
use tessera_ioc::{downcast, global, service, set_global, Container, FunctionDef, Param, TypeDef};

// Application bootstrap in the facade style: the container is installed
// as the ambient instance once, and collaborators reach it through
// `global()` instead of receiving a handle.

struct Settings {
  environment: String,
}

fn bootstrap() {
  let container = Arc::new(Container::new());

  container.register_type(
    TypeDef::new("settings").constructor(|_| {
      Ok(service(Settings {
        environment: "production".to_string(),
      }))
    }),
  );
  container.singleton("settings", "settings");

  // A task runnable through the container with injected dependencies.
  container.register_type(
    TypeDef::new("report_job").method(
      "run",
      FunctionDef::new(|mut args| {
        let settings = downcast::<Settings>(&args.remove(0)).unwrap();
        Ok(service(format!("report generated for {}", settings.environment)))
      })
      .param(Param::of("settings", "settings")),
    ),
  );

  set_global(Some(container));
}

fn main() {
  bootstrap();

  // Facade-style call sites resolve through the ambient instance.
  let settings = downcast::<Settings>(&global().get("settings").unwrap()).unwrap();
  println!("environment: {}", settings.environment);

  let output = global()
    .call("report_job::run", tessera_ioc::Params::new())
    .unwrap();
  println!("{}", downcast::<String>(&output).unwrap());
}
