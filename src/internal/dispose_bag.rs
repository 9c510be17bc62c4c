//! Disposal hook storage.

use std::future::Future;
use std::pin::Pin;

/// Boxed future type for async disposal hooks.
pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Holds disposal hooks for a scope or the root provider.
///
/// Hooks run in LIFO order. Async hooks run before sync hooks so that
/// connections can drain before their synchronous owners tear down.
#[derive(Default)]
pub(crate) struct DisposeBag {
    sync: Vec<Box<dyn FnOnce() + Send>>,
    asyncs: Vec<Box<dyn FnOnce() -> BoxFutureUnit + Send>>,
}

impl DisposeBag {
    pub(crate) fn push_sync(&mut self, f: Box<dyn FnOnce() + Send>) {
        self.sync.push(f);
    }

    pub(crate) fn push_async<Fut, F>(&mut self, f: F)
    where
        Fut: Future<Output = ()> + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
    {
        self.asyncs.push(Box::new(move || Box::pin(f())));
    }

    pub(crate) fn run_all_sync_reverse(&mut self) {
        while let Some(f) = self.sync.pop() {
            f();
        }
    }

    pub(crate) async fn run_all_async_reverse(&mut self) {
        while let Some(f) = self.asyncs.pop() {
            f().await;
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }
}
