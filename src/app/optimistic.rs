//! Apply-then-confirm state changes.
//!
//! A [`Mutation`] is applied to local state before the confirming request is
//! awaited. If the request fails the mutation is reverted and the error is
//! handed back; if it succeeds the caller gets the response to reconcile with.
//! The state lock is never held while the request is in flight.

use std::future::Future;
use tokio::sync::Mutex;

use crate::http::ApiError;

pub trait Mutation<S> {
    /// Applies the change; returns false when the state already matched.
    fn apply(&self, state: &mut S) -> bool;

    /// Undoes an applied change.
    fn revert(&self, state: &mut S);
}

pub async fn run_optimistic<S, M, F, T>(
    state: &Mutex<S>,
    mutation: &M,
    request: F,
) -> Result<T, ApiError>
where
    M: Mutation<S>,
    F: Future<Output = Result<T, ApiError>>,
{
    let applied = {
        let mut guard = state.lock().await;
        mutation.apply(&mut guard)
    };

    match request.await {
        Ok(response) => Ok(response),
        Err(err) => {
            if applied {
                let mut guard = state.lock().await;
                mutation.revert(&mut guard);
            }
            tracing::warn!(error = %err, rolled_back = applied, "optimistic update rejected");
            Err(err)
        }
    }
}
