use std::future::Future;

/// Calls `f(arg)` until it succeeds, allowing up to `retries` extra attempts.
///
/// Attempts follow each other immediately, there is no backoff. When every
/// attempt fails the error of the final attempt is returned.
pub async fn retry<F, Fut, A, T, E>(retries: u32, mut f: F, arg: A) -> Result<T, E>
where
    F: FnMut(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    A: Clone,
{
    let mut remaining = retries;
    loop {
        match f(arg.clone()).await {
            Ok(value) => return Ok(value),
            Err(e) if remaining == 0 => return Err(e),
            Err(_) => {
                log::trace!("retry: attempt failed, {} left", remaining);
                remaining -= 1;
            }
        }
    }
}

/// Polls `f(arg)` until it **fails**, at most `retries + 1` times.
///
/// # Polarity
///
/// This is the inverse of [`retry`]: an `Ok` result means "condition not
/// reached yet, poll again" and an `Err` means "done". It is meant for
/// poll-until-condition loops where the check reports the awaited condition by
/// failing, e.g. waiting for a host to stop answering.
///
/// The call never fails. Once the attempts are exhausted it simply returns.
pub async fn repeat<F, Fut, A, T, E>(retries: u32, mut f: F, arg: A)
where
    F: FnMut(A) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    A: Clone,
{
    let mut remaining = retries;
    loop {
        if f(arg.clone()).await.is_err() || remaining == 0 {
            return;
        }
        remaining -= 1;
    }
}
