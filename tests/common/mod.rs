#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use taskwatch::TaskError;
use taskwatch::task::TaskFuture;

pub use taskwatch_test_utils::builders;
pub use taskwatch_test_utils::{LogCapture, init_tracing, with_timeout};

/// Shared invocation counter for task bodies and watch functions.
#[derive(Clone, Default)]
pub struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Increment and return the 1-based number of this call.
    pub fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Body that counts, sleeps for `busy` and succeeds.
    pub fn succeeding(&self, busy: Duration) -> impl Fn() -> TaskFuture + Send + Sync + 'static {
        let calls = self.clone();
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                calls.bump();
                tokio::time::sleep(busy).await;
                Ok::<(), TaskError>(())
            }) as TaskFuture
        }
    }

    /// Body that counts, sleeps for `busy` and fails with `message`.
    pub fn failing(
        &self,
        busy: Duration,
        message: &'static str,
    ) -> impl Fn() -> TaskFuture + Send + Sync + 'static {
        let calls = self.clone();
        move || {
            let calls = calls.clone();
            Box::pin(async move {
                calls.bump();
                tokio::time::sleep(busy).await;
                Err::<(), TaskError>(anyhow!(message).into())
            }) as TaskFuture
        }
    }
}
