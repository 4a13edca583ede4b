//! Adapters that turn completion-callback APIs into futures.
//!
//! Host primitives report completion by invoking a boxed callback exactly once.
//! Three conventions exist and they are not distinguishable by type, so each
//! gets its own named adapter:
//!
//! - [`from_result_callback`]: error-first `(err, result)`
//! - [`from_value_callback`]: result only, never fails
//! - [`from_error_callback`]: a single argument where `Some` means failure
//!   (delete-style calls)
//!
//! Every adapter settles with a "dropped" error when the callee drops the
//! callback without calling it.

use std::future::Future;

use thiserror::Error;
use tokio::sync::oneshot;

/// Error-first completion callback: `Some(err)` fails, otherwise `result` is used.
pub type ResultCallback<T, E> = Box<dyn FnOnce(Option<E>, T) + Send + 'static>;

/// Result-only completion callback.
pub type ValueCallback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// Single-argument callback where any `Some` value signals failure.
pub type ErrorCallback<E> = Box<dyn FnOnce(Option<E>) + Send + 'static>;

/// The callee dropped its callback without invoking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("callback dropped without being invoked")]
pub struct Dropped;

/// Failure of a callback-adapted call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError<E> {
    #[error("{0}")]
    Failed(E),

    #[error("callback dropped without being invoked")]
    Dropped,
}

/// Adapts an error-first callback API.
///
/// # Example
/// ```rust
/// use hostkit::from_result_callback;
///
/// let res = futures::executor::block_on(from_result_callback::<_, u32, String>(|cb| cb(None, 7)));
/// assert_eq!(res, Ok(7));
/// ```
pub fn from_result_callback<F, T, E>(f: F) -> impl Future<Output = Result<T, CallbackError<E>>>
where
    F: FnOnce(ResultCallback<T, E>),
    T: Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    f(Box::new(move |err: Option<E>, result: T| {
        let outcome = match err {
            Some(e) => Err(e),
            None => Ok(result),
        };
        let _ = tx.send(outcome);
    }));
    async move {
        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CallbackError::Failed(e)),
            Err(_) => Err(CallbackError::Dropped),
        }
    }
}

/// Adapts a result-only callback API. Resolves with whatever the callee passes.
pub fn from_value_callback<F, T>(f: F) -> impl Future<Output = Result<T, Dropped>>
where
    F: FnOnce(ValueCallback<T>),
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    f(Box::new(move |result: T| {
        let _ = tx.send(result);
    }));
    async move { rx.await.map_err(|_| Dropped) }
}

/// Adapts a callback whose single argument is an error when present.
pub fn from_error_callback<F, E>(f: F) -> impl Future<Output = Result<(), CallbackError<E>>>
where
    F: FnOnce(ErrorCallback<E>),
    E: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    f(Box::new(move |result: Option<E>| {
        let _ = tx.send(result);
    }));
    async move {
        match rx.await {
            Ok(None) => Ok(()),
            Ok(Some(e)) => Err(CallbackError::Failed(e)),
            Err(_) => Err(CallbackError::Dropped),
        }
    }
}
