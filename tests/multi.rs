use fnboot::{Lifetime, Resolver, ServiceCollection};
use std::sync::{Arc, Mutex};

#[test]
fn test_multi_binding_preserves_registration_order() {
    trait Validator: Send + Sync {
        fn name(&self) -> &str;
    }

    struct SchemaValidator;
    impl Validator for SchemaValidator {
        fn name(&self) -> &str {
            "schema"
        }
    }

    struct SizeValidator;
    impl Validator for SizeValidator {
        fn name(&self) -> &str {
            "size"
        }
    }

    struct AuthValidator;
    impl Validator for AuthValidator {
        fn name(&self) -> &str {
            "auth"
        }
    }

    let mut sc = ServiceCollection::new();

    sc.add_trait_implementation(Arc::new(SchemaValidator) as Arc<dyn Validator>, Lifetime::Singleton);
    sc.add_trait_implementation(Arc::new(SizeValidator) as Arc<dyn Validator>, Lifetime::Singleton);
    sc.add_trait_implementation(Arc::new(AuthValidator) as Arc<dyn Validator>, Lifetime::Singleton);

    let sp = sc.build();
    let validators = sp.get_all_trait::<dyn Validator>().unwrap();

    assert_eq!(validators.len(), 3);
    assert_eq!(validators[0].name(), "schema");
    assert_eq!(validators[1].name(), "size");
    assert_eq!(validators[2].name(), "auth");

    // Singletons come back as the same instances on a second call.
    let again = sp.get_all_trait::<dyn Validator>().unwrap();
    for (a, b) in validators.iter().zip(again.iter()) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn test_multi_binding_mixed_lifetimes() {
    trait Handler: Send + Sync {
        fn id(&self) -> i32;
    }

    struct FixedHandler;
    impl Handler for FixedHandler {
        fn id(&self) -> i32 {
            1
        }
    }

    struct CountingHandler {
        count: i32,
    }
    impl Handler for CountingHandler {
        fn id(&self) -> i32 {
            self.count
        }
    }

    let counter = Arc::new(Mutex::new(100));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();

    sc.add_trait_implementation(Arc::new(FixedHandler) as Arc<dyn Handler>, Lifetime::Singleton);
    sc.add_trait_factory::<dyn Handler, _>(Lifetime::Transient, move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        Arc::new(CountingHandler { count: *c }) as Arc<dyn Handler>
    });

    let sp = sc.build();

    let handlers1 = sp.get_all_trait::<dyn Handler>().unwrap();
    assert_eq!(handlers1.len(), 2);
    assert_eq!(handlers1[0].id(), 1);
    assert_eq!(handlers1[1].id(), 101);

    let handlers2 = sp.get_all_trait::<dyn Handler>().unwrap();
    assert_eq!(handlers2[0].id(), 1);
    assert_eq!(handlers2[1].id(), 102); // transient re-ran

    assert!(Arc::ptr_eq(&handlers1[0], &handlers2[0]));
    assert!(!Arc::ptr_eq(&handlers1[1], &handlers2[1]));
}

#[test]
fn test_multi_binding_in_scopes() {
    trait Middleware: Send + Sync {
        fn name(&self) -> &str;
    }

    struct AuthMiddleware {
        scope_id: String,
    }
    impl Middleware for AuthMiddleware {
        fn name(&self) -> &str {
            &self.scope_id
        }
    }

    struct LoggingMiddleware;
    impl Middleware for LoggingMiddleware {
        fn name(&self) -> &str {
            "logging"
        }
    }

    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();

    sc.add_trait_implementation(Arc::new(LoggingMiddleware) as Arc<dyn Middleware>, Lifetime::Singleton);
    sc.add_trait_factory::<dyn Middleware, _>(Lifetime::Scoped, move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        Arc::new(AuthMiddleware {
            scope_id: format!("auth-{}", *c),
        }) as Arc<dyn Middleware>
    });

    let sp = sc.build();

    let scope1 = sp.create_scope();
    let scope2 = sp.create_scope();

    let list1a = scope1.get_all_trait::<dyn Middleware>().unwrap();
    let list1b = scope1.get_all_trait::<dyn Middleware>().unwrap();
    let list2 = scope2.get_all_trait::<dyn Middleware>().unwrap();

    assert_eq!(list1a.len(), 2);

    // Singleton member shared everywhere
    assert!(Arc::ptr_eq(&list1a[0], &list1b[0]));
    assert!(Arc::ptr_eq(&list1a[0], &list2[0]));
    assert_eq!(list1a[0].name(), "logging");

    // Scoped member cached within the scope
    assert!(Arc::ptr_eq(&list1a[1], &list1b[1]));
    assert_eq!(list1a[1].name(), "auth-1");

    // And distinct across scopes
    assert!(!Arc::ptr_eq(&list1a[1], &list2[1]));
    assert_eq!(list2[1].name(), "auth-2");
}

#[test]
fn test_multi_binding_empty() {
    trait NeverRegistered: Send + Sync {}

    let sp = ServiceCollection::new().build();

    let items = sp.get_all_trait::<dyn NeverRegistered>().unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_single_resolution_falls_back_to_last_multi() {
    trait Exporter: Send + Sync {
        fn target(&self) -> i32;
    }

    struct ExporterImpl {
        target: i32,
    }
    impl Exporter for ExporterImpl {
        fn target(&self) -> i32 {
            self.target
        }
    }

    let mut sc = ServiceCollection::new();

    sc.add_trait_implementation(Arc::new(ExporterImpl { target: 10 }) as Arc<dyn Exporter>, Lifetime::Singleton);
    sc.add_trait_implementation(Arc::new(ExporterImpl { target: 20 }) as Arc<dyn Exporter>, Lifetime::Singleton);

    let sp = sc.build();

    // No single binding exists, so the last multi-binding wins.
    let single = sp.get_trait::<dyn Exporter>().unwrap();
    assert_eq!(single.target(), 20);

    let all = sp.get_all_trait::<dyn Exporter>().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].target(), 10);
}

#[test]
fn test_multi_binding_with_dependencies() {
    struct Prefix {
        value: String,
    }

    trait Processor: Send + Sync {
        fn process(&self, input: &str) -> String;
    }

    struct PrefixProcessor {
        prefix: Arc<Prefix>,
    }
    impl Processor for PrefixProcessor {
        fn process(&self, input: &str) -> String {
            format!("{}{}", self.prefix.value, input)
        }
    }

    struct UppercaseProcessor;
    impl Processor for UppercaseProcessor {
        fn process(&self, input: &str) -> String {
            input.to_uppercase()
        }
    }

    let mut sc = ServiceCollection::new();

    sc.add_singleton(Prefix {
        value: ">> ".to_string(),
    });
    sc.add_trait_factory::<dyn Processor, _>(Lifetime::Singleton, |r| {
        Arc::new(PrefixProcessor {
            prefix: r.get_required::<Prefix>(),
        }) as Arc<dyn Processor>
    });
    sc.add_trait_implementation(Arc::new(UppercaseProcessor) as Arc<dyn Processor>, Lifetime::Singleton);

    let sp = sc.build();
    let processors = sp.get_all_trait::<dyn Processor>().unwrap();

    assert_eq!(processors.len(), 2);
    assert_eq!(processors[0].process("hello"), ">> hello");
    assert_eq!(processors[1].process("hello"), "HELLO");
}
