use std::sync::Arc;
use tessera_ioc::{downcast, params, service, Container, Param, TypeDef};

// 1. The abstraction: an interface identifier with no constructor.
// 2. A concrete implementation declaring the capability it satisfies.
// 3. A service whose constructor depends on the abstraction.

struct FileStore {
  root: String,
}

struct Catalog {
  store: Arc<FileStore>,
  page_size: u32,
}

fn main() {
  let container = Container::new();

  // --- Type descriptions ---

  container.register_type(TypeDef::interface("storage"));

  container.register_type(
    TypeDef::new("file_store")
      .implements("storage")
      .param(Param::new("root").default_value(String::from("/var/data")))
      .constructor(|mut args| {
        let root = downcast::<String>(&args.remove(0)).unwrap();
        Ok(service(FileStore {
          root: (*root).clone(),
        }))
      }),
  );

  container.register_type(
    TypeDef::new("catalog")
      .param(Param::of("store", "storage"))
      .param(Param::new("page_size").default_value(50_u32))
      .constructor(|mut args| {
        let store = downcast::<FileStore>(&args.remove(0)).unwrap();
        let page_size = *downcast::<u32>(&args.remove(0)).unwrap();
        Ok(service(Catalog { store, page_size }))
      }),
  );

  // --- Wiring ---

  // The interface gets a concrete binding; the catalog autowires it.
  container.bind("storage", "file_store", false);

  let catalog = downcast::<Catalog>(&container.get("catalog").unwrap()).unwrap();
  println!("catalog root: {}", catalog.store.root);
  println!("catalog page size: {}", catalog.page_size);

  // Explicit parameters override any tier below them, without touching
  // shared state.
  let custom = container
    .make("catalog", params! { "page_size" => 10_u32 })
    .unwrap();
  let custom = downcast::<Catalog>(&custom).unwrap();
  println!("custom page size: {}", custom.page_size);
}
