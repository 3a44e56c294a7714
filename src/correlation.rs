// Copyright (c) 2026, The Amqp-Worker Authors
// MIT License
// All rights reserved.

//! # Correlation Identifier Propagation
//!
//! Every message processed by the worker carries a correlation id linking
//! the chain request -> reply -> error report. Instead of threading the id
//! through every call, the consume loop enters a task-local scope around
//! the processing of one delivery; [`publish`](crate::publisher::publish)
//! and application code read it back with [`current`].
//!
//! The scope is restored on every exit path, including panics and early
//! returns, so a failure mid-processing can never leak a stale id into the
//! next delivery. Because the slot is task-local, concurrent consumers in
//! the same process do not observe each other's ids.

use std::future::Future;

tokio::task_local! {
    static CORRELATION_ID: Option<String>;
}

/// Runs `f` with the given correlation id as the current one.
///
/// Scopes nest; the previous value is restored when the future completes.
pub async fn scope<F>(id: Option<String>, f: F) -> F::Output
where
    F: Future,
{
    CORRELATION_ID.scope(id, f).await
}

/// Returns the correlation id of the message currently being processed,
/// or `None` outside any scope.
pub fn current() -> Option<String> {
    CORRELATION_ID.try_with(|id| id.clone()).ok().flatten()
}
