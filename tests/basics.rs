use fnboot::{DiError, Resolver, ServiceCollection};
use std::sync::{Arc, Mutex};

#[test]
fn test_singleton_identity() {
    let mut sc = ServiceCollection::new();
    sc.add_singleton(8080u16);
    sc.add_singleton("fnapp".to_string());

    let sp = sc.build();

    let port1 = sp.get_required::<u16>();
    let port2 = sp.get_required::<u16>();
    let name1 = sp.get_required::<String>();
    let name2 = sp.get_required::<String>();

    assert_eq!(*port1, 8080);
    assert_eq!(*name1, "fnapp");
    assert!(Arc::ptr_eq(&port1, &port2));
    assert!(Arc::ptr_eq(&name1, &name2));
}

#[test]
fn test_factory_with_dependencies() {
    struct StorageSettings {
        account: String,
    }

    struct BlobClient {
        settings: Arc<StorageSettings>,
        container: String,
    }

    let mut sc = ServiceCollection::new();
    sc.add_singleton(StorageSettings {
        account: "devstoreaccount1".to_string(),
    });
    sc.add_singleton_factory::<BlobClient, _>(|r| BlobClient {
        settings: r.get_required::<StorageSettings>(),
        container: "uploads".to_string(),
    });

    let sp = sc.build();
    let client = sp.get_required::<BlobClient>();

    assert_eq!(client.settings.account, "devstoreaccount1");
    assert_eq!(client.container, "uploads");
}

#[test]
fn test_transient_creates_new_instances() {
    let counter = Arc::new(Mutex::new(0));
    let counter_clone = counter.clone();

    let mut sc = ServiceCollection::new();
    sc.add_transient_factory::<String, _>(move |_| {
        let mut c = counter_clone.lock().unwrap();
        *c += 1;
        format!("msg-{}", *c)
    });

    let sp = sc.build();

    let a = sp.get_required::<String>();
    let b = sp.get_required::<String>();
    let c = sp.get_required::<String>();

    assert_eq!(*a, "msg-1");
    assert_eq!(*b, "msg-2");
    assert_eq!(*c, "msg-3");

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));
}

#[test]
fn test_unregistered_type_is_not_found() {
    struct Unregistered;

    let sp = ServiceCollection::new().build();

    match sp.get::<Unregistered>() {
        Err(DiError::NotFound(name)) => assert!(name.contains("Unregistered")),
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_replace_semantics() {
    let mut sc = ServiceCollection::new();

    // Last registration under the same key wins.
    sc.add_singleton(1usize);
    sc.add_singleton(2usize);

    let sp = sc.build();
    assert_eq!(*sp.get_required::<usize>(), 2);
}

#[test]
fn test_recursive_constructor_injection() {
    struct Settings {
        queue: String,
    }

    struct QueueClient {
        settings: Arc<Settings>,
    }

    struct Dispatcher {
        settings: Arc<Settings>,
        queue: Arc<QueueClient>,
    }

    let mut sc = ServiceCollection::new();

    sc.add_singleton(Settings {
        queue: "orders".to_string(),
    });
    sc.add_singleton_factory::<QueueClient, _>(|r| QueueClient {
        settings: r.get_required::<Settings>(),
    });
    sc.add_singleton_factory::<Dispatcher, _>(|r| Dispatcher {
        settings: r.get_required::<Settings>(),
        queue: r.get_required::<QueueClient>(),
    });

    let sp = sc.build();
    let dispatcher = sp.get_required::<Dispatcher>();

    assert_eq!(dispatcher.queue.settings.queue, "orders");
    // The shared dependency resolves to the same singleton everywhere.
    assert!(Arc::ptr_eq(&dispatcher.settings, &dispatcher.queue.settings));
}

#[test]
fn test_contains_and_len() {
    struct Registered;
    struct NotRegistered;

    let mut sc = ServiceCollection::new();
    assert!(sc.is_empty());

    sc.add_singleton(Registered);
    assert!(sc.contains::<Registered>());
    assert!(!sc.contains::<NotRegistered>());
    assert_eq!(sc.len(), 1);
}
