//! # fnboot
//!
//! Dependency injection and controller bootstrap for axum-based function
//! apps, modeled on Microsoft.Extensions.DependencyInjection.
//!
//! The crate has two halves:
//!
//! - A DI container: [`ServiceCollection`] collects registrations with
//!   three lifetimes (singleton, scoped, transient), [`ServiceProvider`]
//!   resolves them, and [`Scope`] gives each invocation its own cache of
//!   scoped services with disposal hooks run at the end.
//! - A bootstrap layer (behind the default `web` feature): controllers
//!   register routes against an axum `Router`, an [`AppBuilder`] wires
//!   modules and controllers into an app, and a tower layer opens and
//!   disposes a DI scope around every request.
//!
//! ## Quick start
//!
//! ```rust
//! use fnboot::{ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Mailer { from: String }
//! struct Signup { mailer: Arc<Mailer> }
//!
//! let mut services = ServiceCollection::new();
//! services.add_singleton(Mailer { from: "noreply@example.com".to_string() });
//! services.add_scoped_factory::<Signup, _>(|r| Signup {
//!     mailer: r.get_required::<Mailer>(),
//! });
//!
//! let provider = services.build();
//! let scope = provider.create_scope();
//! let signup = scope.get_required::<Signup>();
//! assert_eq!(signup.mailer.from, "noreply@example.com");
//! ```
//!
//! [`AppBuilder`]: web::AppBuilder

mod collection;
mod config;
mod error;
mod internal;
mod key;
mod lifetime;
mod provider;
mod registration;
mod traits;

#[cfg(feature = "web")]
pub mod web;

pub use collection::{
    ServiceCollection, ServiceCollectionExt, ServiceCollectionModuleExt, ServiceModule,
};
pub use config::{Settings, SettingsError};
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::{key_of_type, Key};
pub use lifetime::Lifetime;
pub use provider::{ResolverContext, Scope, ScopedResolver, ServiceProvider};
pub use traits::{AsyncDispose, Dispose, Resolver, ResolverCore};
