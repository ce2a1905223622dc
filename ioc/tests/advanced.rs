use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::thread;
use tessera_ioc::{
  downcast, global, service, set_global, Container, ContainerError, Param, Recipe, TypeDef,
};

// --- Advanced Test Fixtures ---

struct Logger {
  label: String,
}

fn fixture_container() -> Container {
  let container = Container::new();
  container.register_type(
    TypeDef::new("logger")
      .param(Param::new("label").default_value(String::from("app")))
      .constructor(|mut args| {
        let label = downcast::<String>(&args.remove(0)).unwrap();
        Ok(service(Logger {
          label: (*label).clone(),
        }))
      }),
  );
  container
}

// --- Alias Tests ---

#[test]
fn aliases_resolve_through_to_the_canonical_binding() {
  // Arrange
  let container = fixture_container();
  container.singleton("log", "logger");
  container.alias("log", "journal").unwrap();

  // Act: resolving the alias lands on the canonical shared instance.
  let via_alias = container.get("journal").unwrap();
  let canonical = container.get("log").unwrap();

  // Assert
  assert!(Arc::ptr_eq(&via_alias, &canonical));
  assert!(container.has("journal"));
}

#[test]
fn alias_resolution_is_idempotent_across_chains() {
  // Arrange
  let container = fixture_container();
  container.alias("svc", "s1").unwrap();
  container.alias("s1", "s2").unwrap();

  // Act
  let once = container.resolve_alias("s2").unwrap();
  let twice = container.resolve_alias(&once).unwrap();

  // Assert
  assert_eq!(once, "svc");
  assert_eq!(once, twice);
}

#[test]
fn self_alias_fails_fast_and_registers_nothing() {
  // Arrange
  let container = fixture_container();

  // Act
  let err = container.alias("log", "log").unwrap_err();

  // Assert
  assert_eq!(err, ContainerError::SelfAlias("log".to_string()));
  assert!(!container.is_alias("log"));
}

#[test]
fn multi_hop_alias_cycles_are_rejected_at_registration() {
  // Arrange
  let container = fixture_container();
  container.alias("a", "b").unwrap();

  // Act: closing the loop b -> a -> b must fail.
  let err = container.alias("b", "a").unwrap_err();

  // Assert
  assert_eq!(err, ContainerError::AliasCycle("a".to_string()));
  assert!(!container.is_alias("a"));
  // The original alias is untouched.
  assert_eq!(container.resolve_alias("b").unwrap(), "a");
}

#[test]
fn rebinding_drops_the_alias_recorded_under_the_same_name() {
  // Arrange
  let container = fixture_container();
  container.alias("log", "legacy").unwrap();
  assert!(container.is_alias("legacy"));

  // Act: "legacy" now gets its own binding, so it must stop being read
  // as an alias.
  container.bind("legacy", "logger", false);

  // Assert
  assert!(!container.is_alias("legacy"));
  assert!(downcast::<Logger>(&container.get("legacy").unwrap()).is_some());
}

#[test]
fn instance_registration_drops_the_alias_under_its_identifier() {
  // Arrange
  let container = fixture_container();
  container.alias("log", "primary").unwrap();

  // Act
  container.instance("primary", 9_i32);

  // Assert
  assert!(!container.is_alias("primary"));
  assert_eq!(*container.get_as::<i32>("primary").unwrap().unwrap(), 9);
}

// --- Resolving Callback Tests ---

#[test]
fn global_callbacks_fire_before_identifier_callbacks_once_per_build() {
  // Arrange
  let container = fixture_container();
  container.singleton("log", "logger");

  let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
  let seen = order.clone();
  container.resolving(move |_, _| seen.lock().unwrap().push("global"));
  let seen = order.clone();
  container.resolving_for("log", move |_, _| seen.lock().unwrap().push("specific"));

  // Act
  container.get("log").unwrap();

  // Assert: global strictly before specific, exactly once each.
  assert_eq!(*order.lock().unwrap(), vec!["global", "specific"]);

  // A cache hit fires nothing.
  container.get("log").unwrap();
  assert_eq!(order.lock().unwrap().len(), 2);
}

#[test]
fn transient_resolutions_fire_callbacks_every_time() {
  // Arrange
  let container = fixture_container();
  container.bind("log", "logger", false);

  let count = Arc::new(Mutex::new(0_u32));
  let seen = count.clone();
  container.resolving_for("log", move |_, _| *seen.lock().unwrap() += 1);

  // Act
  container.get("log").unwrap();
  container.get("log").unwrap();

  // Assert
  assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
fn identifier_callbacks_match_declared_capabilities() {
  // Arrange: file_store declares that it satisfies the storage
  // capability, so callbacks registered for "storage" fire when it is
  // built under another abstract.
  let container = Container::new();
  container.register_type(
    TypeDef::new("file_store")
      .implements("storage")
      .constructor(|_| Ok(service(String::from("file backend")))),
  );
  container.bind("store", "file_store", false);

  let count = Arc::new(Mutex::new(0_u32));
  let seen = count.clone();
  container.resolving_for("storage", move |_, _| *seen.lock().unwrap() += 1);

  // Act
  container.get("store").unwrap();

  // Assert
  assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn callbacks_receive_the_built_service_and_the_container() {
  // Arrange
  let container = fixture_container();
  container.bind("log", "logger", false);
  container.instance("audit_sink", Mutex::new(Vec::<String>::new()));

  // The callback inspects the object and reaches back into the container.
  container.resolving_for("log", |object, container| {
    let logger = downcast::<Logger>(object).unwrap();
    let sink = container.get_as::<Mutex<Vec<String>>>("audit_sink").unwrap().unwrap();
    sink.lock().unwrap().push(logger.label.clone());
  });

  // Act
  container.get("log").unwrap();

  // Assert
  let sink = container.get_as::<Mutex<Vec<String>>>("audit_sink").unwrap().unwrap();
  assert_eq!(*sink.lock().unwrap(), vec!["app".to_string()]);
}

// --- Diagnostics Tests ---

#[test]
fn not_instantiable_diagnostics_name_the_build_chain() {
  // Arrange: app depends on an interface with no further binding.
  let container = Container::new();
  container.register_type(TypeDef::interface("store"));
  container.register_type(
    TypeDef::new("app")
      .param(Param::of("store", "store"))
      .constructor(|mut args| Ok(args.remove(0))),
  );

  // Act
  let err = container.get("app").unwrap_err();

  // Assert
  assert_eq!(
    err.to_string(),
    "Target [store] is not instantiable while building [app]."
  );
}

#[test]
fn direct_not_instantiable_has_no_chain() {
  // Arrange
  let container = Container::new();
  container.register_type(TypeDef::interface("store"));

  // Act
  let err = container.get("store").unwrap_err();

  // Assert
  assert_eq!(err.to_string(), "Target [store] is not instantiable.");
}

#[test]
fn failed_builds_pop_their_stack_frame() {
  // Arrange
  let container = Container::new();
  container.register_type(TypeDef::interface("store"));
  container.register_type(
    TypeDef::new("app")
      .param(Param::of("store", "store"))
      .constructor(|mut args| Ok(args.remove(0))),
  );

  // Act: a failed build must not leave its frame behind for siblings.
  container.get("app").unwrap_err();
  let err = container.get("store").unwrap_err();

  // Assert: no stale "app" frame in the message.
  assert_eq!(err.to_string(), "Target [store] is not instantiable.");
}

// --- Ambient Instance Tests ---

#[test]
fn ambient_container_is_created_lazily_and_replaceable() {
  // Reset any ambient state left over from other code in this process.
  set_global(None);

  // Lazily created, then stable across accesses.
  let first = global();
  assert!(Arc::ptr_eq(&first, &global()));

  // Explicit replacement installs the new container and returns the old.
  let custom = Arc::new(Container::new());
  custom.instance("marker", 1_u8);
  let previous = set_global(Some(custom.clone()));
  assert!(previous.is_some());
  assert!(Arc::ptr_eq(&previous.unwrap(), &first));
  assert!(Arc::ptr_eq(&global(), &custom));
  assert!(global().has("marker"));

  // Clearing starts over on next access.
  set_global(None);
  assert!(!global().has("marker"));
}

// --- Concurrency Tests ---

#[test]
fn concurrent_registration_and_resolution() {
  // A stress test in the spirit of shared registries: registering new
  // services while resolving others must not deadlock.

  // Arrange
  let container = Arc::new(fixture_container());
  container.singleton("log", "logger");

  // Act
  thread::scope(|s| {
    for i in 0..10_usize {
      let container = container.clone();
      s.spawn(move || {
        container.instance(&format!("thread_service_{}", i), i);

        for _ in 0..50 {
          let log = container.get("log").unwrap();
          assert!(downcast::<Logger>(&log).is_some());
        }

        let mine = container
          .get_as::<usize>(&format!("thread_service_{}", i))
          .unwrap()
          .unwrap();
        assert_eq!(*mine, i);
      });
    }
  });

  // Assert
  let check = container.get_as::<usize>("thread_service_5").unwrap().unwrap();
  assert_eq!(*check, 5);
}

#[test]
fn recursive_resolution_from_other_threads_stays_consistent() {
  // Arrange: a chain app -> logger resolved concurrently.
  let container = Arc::new(fixture_container());
  container.register_type(
    TypeDef::new("app")
      .param(Param::of("logger", "logger"))
      .constructor(|mut args| Ok(args.remove(0))),
  );
  container.singleton("logger", Recipe::SelfBound);

  // Act
  thread::scope(|s| {
    for _ in 0..8 {
      let container = container.clone();
      s.spawn(move || {
        let app = container.get("app").unwrap();
        assert!(downcast::<Logger>(&app).is_some());
      });
    }
  });

  // Assert: the shared logger settled on a single cached instance.
  let first = container.get("logger").unwrap();
  let second = container.get("logger").unwrap();
  assert!(Arc::ptr_eq(&first, &second));
}
