//! Modular service registration: `ServiceModule` implementations and the
//! `add_module`/`add_module_mut` extension methods.

use fnboot::{
    DiError, DiResult, Resolver, ServiceCollection, ServiceCollectionExt,
    ServiceCollectionModuleExt, ServiceModule,
};
use std::sync::Arc;

#[derive(Clone)]
struct AppConfig {
    name: String,
    max_batch: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "test-app".to_string(),
            max_batch: 42,
        }
    }
}

struct StorageClient {
    config: Arc<AppConfig>,
    container: String,
}

impl StorageClient {
    fn describe(&self) -> String {
        format!("{}/{} (batch {})", self.config.name, self.container, self.config.max_batch)
    }
}

struct IngestService {
    storage: Arc<StorageClient>,
}

struct StorageModule;

impl ServiceModule for StorageModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_singleton_factory::<StorageClient, _>(|r| StorageClient {
            config: r.get_required::<AppConfig>(),
            container: "ingest".to_string(),
        });
        Ok(())
    }
}

struct IngestModule;

impl ServiceModule for IngestModule {
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
        services.add_scoped_factory::<IngestService, _>(|r| IngestService {
            storage: r.get_required::<StorageClient>(),
        });
        Ok(())
    }
}

#[test]
fn test_module_registration() {
    let mut services = ServiceCollection::new();
    services.add_singleton(AppConfig::default());
    services.add_module_mut(StorageModule).unwrap();
    services.add_module_mut(IngestModule).unwrap();

    let provider = services.build();
    let scope = provider.create_scope();

    let ingest = scope.get_required::<IngestService>();
    assert_eq!(ingest.storage.describe(), "test-app/ingest (batch 42)");
}

#[test]
fn test_consuming_module_chaining() {
    let mut services = ServiceCollection::new();
    services.add_singleton(AppConfig {
        name: "chained".to_string(),
        max_batch: 7,
    });

    let provider = services
        .add_module(StorageModule)
        .unwrap()
        .add_module(IngestModule)
        .unwrap()
        .build();

    let storage = provider.get_required::<StorageClient>();
    assert_eq!(storage.describe(), "chained/ingest (batch 7)");
}

#[test]
fn test_module_error_propagation() {
    struct FailingModule;

    impl ServiceModule for FailingModule {
        fn register_services(self, _services: &mut ServiceCollection) -> DiResult<()> {
            Err(DiError::NotFound("RequiredUpstreamService"))
        }
    }

    let mut services = ServiceCollection::new();
    let result = services.add_module_mut(FailingModule);

    match result {
        Err(DiError::NotFound(name)) => assert_eq!(name, "RequiredUpstreamService"),
        _ => panic!("expected NotFound error"),
    }
}

#[test]
fn test_later_module_overrides_earlier() {
    struct DefaultsModule;
    struct OverridesModule;

    impl ServiceModule for DefaultsModule {
        fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
            services.add_singleton(AppConfig::default());
            Ok(())
        }
    }

    impl ServiceModule for OverridesModule {
        fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
            services.add_singleton(AppConfig {
                name: "override".to_string(),
                max_batch: 99,
            });
            Ok(())
        }
    }

    let mut services = ServiceCollection::new();
    services.add_module_mut(DefaultsModule).unwrap();
    services.add_module_mut(OverridesModule).unwrap();

    let provider = services.build();
    let config = provider.get_required::<AppConfig>();

    assert_eq!(config.name, "override");
    assert_eq!(config.max_batch, 99);
}

#[test]
fn test_module_scoped_services() {
    let mut services = ServiceCollection::new();
    services.add_singleton(AppConfig::default());
    services.add_module_mut(StorageModule).unwrap();
    services.add_module_mut(IngestModule).unwrap();

    let provider = services.build();

    let scope1 = provider.create_scope();
    let scope2 = provider.create_scope();

    let ingest1a = scope1.get_required::<IngestService>();
    let ingest1b = scope1.get_required::<IngestService>();
    let ingest2 = scope2.get_required::<IngestService>();

    assert!(Arc::ptr_eq(&ingest1a, &ingest1b));
    assert!(!Arc::ptr_eq(&ingest1a, &ingest2));

    // Singleton dependency shared across both scopes.
    assert!(Arc::ptr_eq(&ingest1a.storage, &ingest2.storage));
}

#[test]
fn test_module_trait_registration() {
    trait Notifier: Send + Sync {
        fn channel(&self) -> &str;
    }

    struct EmailNotifier;

    impl Notifier for EmailNotifier {
        fn channel(&self) -> &str {
            "email"
        }
    }

    struct NotifyModule;

    impl ServiceModule for NotifyModule {
        fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
            services.add_singleton_trait(Arc::new(EmailNotifier) as Arc<dyn Notifier>);
            Ok(())
        }
    }

    let mut services = ServiceCollection::new();
    services.add_module_mut(NotifyModule).unwrap();

    let provider = services.build();
    let notifier = provider.get_required_trait::<dyn Notifier>();

    assert_eq!(notifier.channel(), "email");
}

#[test]
fn test_module_with_state() {
    struct ConfigModule {
        config: AppConfig,
    }

    impl ServiceModule for ConfigModule {
        fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
            services.add_singleton(self.config);
            Ok(())
        }
    }

    let mut services = ServiceCollection::new();
    services
        .add_module_mut(ConfigModule {
            config: AppConfig {
                name: "stateful".to_string(),
                max_batch: 3,
            },
        })
        .unwrap();
    services.add_module_mut(StorageModule).unwrap();

    let provider = services.build();
    let storage = provider.get_required::<StorageClient>();

    assert_eq!(storage.config.name, "stateful");
    assert_eq!(storage.config.max_batch, 3);
}
