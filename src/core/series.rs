use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};

/// Runs `worker` over `items` one at a time, never overlapping.
///
/// Each worker future is awaited before the next item is touched. When `delay`
/// is non-zero the sequence additionally pauses for `delay` after every
/// successful result, which throttles bulk work against the host store or a
/// remote endpoint.
///
/// Results are returned in invocation order. The first error stops the
/// sequence: remaining items are never passed to `worker`.
pub async fn series<I, F, Fut, T, E>(items: I, mut worker: F, delay: Duration) -> Result<Vec<T>, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items)
        .then(move |item| {
            let fut = worker(item);
            async move {
                let res = fut.await;
                if res.is_ok() && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                res
            }
        })
        .try_collect()
        .await
}
