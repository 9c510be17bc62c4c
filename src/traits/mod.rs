//! Public traits: resolution and disposal.

mod dispose;
mod resolver;

pub use dispose::{AsyncDispose, Dispose};
pub use resolver::{Resolver, ResolverCore};
