//! Circular dependency detection.
//!
//! Resolution keeps a per-thread stack of the keys currently being
//! constructed. Seeing a key twice means the factory chain has looped;
//! the full path is carried out through a panic payload and converted
//! back into a `DiError` at the resolution entry point.

use std::cell::RefCell;
use std::panic;

const MAX_DEPTH: usize = 1024;

thread_local! {
    static RESOLUTION_TLS: RefCell<ResolutionTls> = RefCell::new(ResolutionTls::default());
}

#[derive(Default)]
struct ResolutionTls {
    stack: Vec<&'static str>,
    frozen: bool,
    depth: usize,
}

/// Panic payload carrying the circular dependency path.
///
/// Example path: `["ServiceA", "ServiceB", "ServiceA"]`.
#[derive(Debug)]
pub struct CircularPanic {
    /// The complete path showing the cycle.
    pub path: Box<[&'static str]>,
}

impl CircularPanic {
    fn new(path: Vec<&'static str>) -> Self {
        CircularPanic { path: path.into_boxed_slice() }
    }
}

/// Pushes a key onto the thread-local resolution stack; pops on drop.
pub(crate) struct StackGuard {
    name: &'static str,
}

impl StackGuard {
    pub(crate) fn new(name: &'static str) -> Self {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();

            // Cycle check before pushing the new name
            if tls.stack.iter().any(|&n| n == name) {
                let mut path = tls.stack.clone();
                path.push(name);
                tls.frozen = true; // freeze pops during unwind
                panic::panic_any(CircularPanic::new(path));
            }

            if tls.depth >= MAX_DEPTH {
                panic::panic_any(crate::error::DiError::DepthExceeded(tls.depth));
            }

            tls.stack.push(name);
            tls.depth += 1;
        });

        Self { name }
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let mut tls = tls.borrow_mut();
            if !tls.frozen {
                if let Some(last) = tls.stack.pop() {
                    debug_assert_eq!(last, self.name);
                }
                tls.depth = tls.depth.saturating_sub(1);
            }
        });
    }
}

/// Runs a resolution closure under cycle detection, converting a
/// `CircularPanic` back into `DiError::Circular` and a thrown `DiError`
/// (the depth guard) back into its error.
pub(crate) fn with_circular_catch<T, F>(name: &'static str, f: F) -> crate::error::DiResult<T>
where
    F: FnOnce() -> crate::error::DiResult<T>,
{
    use std::panic::AssertUnwindSafe;

    let _guard = StackGuard::new(name);

    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            if let Some(circular) = payload.downcast_ref::<CircularPanic>() {
                // The panic fires inside StackGuard::new before anything is
                // pushed, so the stack is intact here. Unfreeze so the guards
                // still on the call stack pop normally and the thread can
                // resolve again.
                RESOLUTION_TLS.with(|tls| tls.borrow_mut().frozen = false);
                Err(crate::error::DiError::Circular(circular.path.iter().copied().collect()))
            } else if let Some(err) = payload.downcast_ref::<crate::error::DiError>() {
                // Depth guard payloads surface as errors, not panics.
                Err(err.clone())
            } else {
                std::panic::resume_unwind(payload);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiError;

    #[test]
    fn depth_guard_payload_becomes_error() {
        let result: crate::error::DiResult<()> = with_circular_catch("deep::Chain", || {
            panic::panic_any(DiError::DepthExceeded(MAX_DEPTH))
        });

        match result {
            Err(DiError::DepthExceeded(depth)) => assert_eq!(depth, MAX_DEPTH),
            other => panic!("expected DepthExceeded, got {:?}", other),
        }
    }

    #[test]
    fn stack_is_clean_after_conversion() {
        let _: crate::error::DiResult<()> =
            with_circular_catch("deep::Chain", || panic::panic_any(DiError::DepthExceeded(7)));

        // The guard popped normally, so an unrelated resolution on the same
        // thread starts from an empty stack.
        let ok = with_circular_catch("other::Service", || Ok(42));
        assert_eq!(ok.unwrap(), 42);
    }
}
