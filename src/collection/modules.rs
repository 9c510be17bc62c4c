//! Modular service registration.
//!
//! A `ServiceModule` groups related registrations so an app can compose
//! its container from self-contained units (a clients module, a domain
//! services module, and so on) instead of one flat setup function.

use crate::{DiResult, ServiceCollection};

/// A unit of service registrations.
///
/// # Example
///
/// ```rust
/// use fnboot::{ServiceCollection, ServiceModule, ServiceCollectionExt, DiResult, Resolver};
///
/// struct ApiConfig { base_url: String }
/// struct ApiClient { base_url: String }
///
/// struct ClientsModule;
///
/// impl ServiceModule for ClientsModule {
///     fn register_services(self, services: &mut ServiceCollection) -> DiResult<()> {
///         services.add_singleton(ApiConfig { base_url: "https://api".to_string() });
///         services.add_scoped_factory::<ApiClient, _>(|r| {
///             let config = r.get_required::<ApiConfig>();
///             ApiClient { base_url: config.base_url.clone() }
///         });
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let provider = ServiceCollection::new().add_module(ClientsModule)?.build();
/// # Ok(())
/// # }
/// ```
pub trait ServiceModule {
    /// Registers this module's services.
    fn register_services(self, services: &mut ServiceCollection) -> DiResult<()>;
}

/// Consuming, chainable module registration.
pub trait ServiceCollectionExt {
    /// Applies a module and returns the collection for chaining.
    ///
    /// ```rust
    /// use fnboot::{ServiceCollection, ServiceCollectionExt, ServiceModule, DiResult};
    ///
    /// struct StorageModule;
    /// impl ServiceModule for StorageModule {
    ///     fn register_services(self, _: &mut ServiceCollection) -> DiResult<()> { Ok(()) }
    /// }
    ///
    /// struct DomainModule;
    /// impl ServiceModule for DomainModule {
    ///     fn register_services(self, _: &mut ServiceCollection) -> DiResult<()> { Ok(()) }
    /// }
    ///
    /// # fn main() -> DiResult<()> {
    /// let provider = ServiceCollection::new()
    ///     .add_module(StorageModule)?
    ///     .add_module(DomainModule)?
    ///     .build();
    /// # Ok(())
    /// # }
    /// ```
    fn add_module<M: ServiceModule>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_module<M: ServiceModule>(mut self, module: M) -> DiResult<Self> {
        module.register_services(&mut self)?;
        Ok(self)
    }
}

/// In-place module registration matching the `&mut Self` builder style.
pub trait ServiceCollectionModuleExt {
    /// Applies a module to the collection in place.
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self>;
}

impl ServiceCollectionModuleExt for ServiceCollection {
    fn add_module_mut<M: ServiceModule>(&mut self, module: M) -> DiResult<&mut Self> {
        module.register_services(self)?;
        Ok(self)
    }
}
