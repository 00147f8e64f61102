use crate::Result;
use core::time::Duration;
use ohno::IntoAppError;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Longest pause a single rate-limit response can impose.
pub const MAX_PAUSE: Duration = Duration::from_secs(60 * 60);

/// Bounds the number of in-flight requests and pauses all of them while a rate limit is in effect.
///
/// Call [`Throttler::acquire`] before each request and hold the permit until the response is
/// read. When a response reports a rate limit, call [`Throttler::pause_for`]; every later
/// `acquire` then waits until the pause has elapsed. Overlapping pauses never shorten each other.
#[derive(Debug)]
pub struct Throttler {
    permits: Arc<Semaphore>,
    resume_at: Mutex<Option<Instant>>,
}

impl Throttler {
    pub fn new(max_concurrent: usize) -> Arc<Self> {
        Arc::new(Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            resume_at: Mutex::new(None),
        })
    }

    /// Waits for any active pause to elapse, then takes a concurrency slot.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        while let Some(remaining) = self.remaining_pause() {
            tokio::time::sleep(remaining).await;
        }

        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .into_app_err("request throttler has been closed")
    }

    /// Time left before the current pause ends, if any.
    pub fn remaining_pause(&self) -> Option<Duration> {
        let guard = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        guard.and_then(|resume_at| {
            let now = Instant::now();
            (resume_at > now).then(|| resume_at - now)
        })
    }

    /// Pauses new requests for `duration`, capped at [`MAX_PAUSE`].
    ///
    /// Returns `false` if a pause ending at the same time or later is already active.
    pub fn pause_for(&self, duration: Duration) -> bool {
        let resume_at = Instant::now() + duration.min(MAX_PAUSE);
        let mut guard = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some_and(|existing| existing >= resume_at) {
            return false;
        }

        *guard = Some(resume_at);
        true
    }
}
