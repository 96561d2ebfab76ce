//! Request tokens shared by the fetchers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hands out increasing tokens. Only the holder of the latest token may
/// publish its outcome; everything else is stale.
#[derive(Debug, Default)]
pub(crate) struct RequestTokens {
    latest: Mutex<u64>,
}

impl RequestTokens {
    /// Issues the next token. `begin` runs while no other request can be
    /// issued or settled.
    pub fn issue<R>(&self, begin: impl FnOnce(u64) -> R) -> (u64, R) {
        let mut latest = self.lock();
        *latest += 1;
        let token = *latest;
        (token, begin(token))
    }

    /// Runs `publish` if `token` is still the latest. Otherwise returns the
    /// latest token and drops `publish` unrun.
    pub fn settle(&self, token: u64, publish: impl FnOnce()) -> Result<(), u64> {
        let latest = self.lock();
        if *latest != token {
            return Err(*latest);
        }
        publish();
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `on_cancel` when dropped before [`CancelGuard::disarm`], i.e. when the
/// future holding it was dropped mid-request.
pub(crate) struct CancelGuard<F: FnOnce()> {
    on_cancel: Option<F>,
}

impl<F: FnOnce()> CancelGuard<F> {
    pub fn new(on_cancel: F) -> Self {
        Self {
            on_cancel: Some(on_cancel),
        }
    }

    pub fn disarm(mut self) {
        self.on_cancel = None;
    }
}

impl<F: FnOnce()> Drop for CancelGuard<F> {
    fn drop(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}
