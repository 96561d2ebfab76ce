use std::sync::Arc;

use futures::future;
use shared::{
    domain::ExternalId,
    protocol::{ExpenseItem, OperatorDetail},
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    error::normalize,
    request::{CancelGuard, RequestTokens},
    types::{DetailBundle, DetailState, RequestOutcome},
    DirectoryApi,
};

pub type OperatorDetailState = DetailState<OperatorDetail, ExpenseItem>;

/// Loads one operator together with its expense history.
pub struct DetailFetcher {
    api: Arc<dyn DirectoryApi>,
    state: watch::Sender<OperatorDetailState>,
    requests: RequestTokens,
}

impl DetailFetcher {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        let (state, _) = watch::channel(DetailState::default());
        Self {
            api,
            state,
            requests: RequestTokens::default(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OperatorDetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> OperatorDetailState {
        self.state.borrow().clone()
    }

    /// Both requests run concurrently and are joined; either failing fails the
    /// whole load and nothing from the other one is kept.
    ///
    /// Dropping the returned future mid-request settles the outcome back to
    /// `Idle`; the key stays set.
    pub async fn fetch_all(&self, external_id: impl Into<ExternalId>) {
        let key = external_id.into();
        let (token, ()) = self.requests.issue(|_| {
            self.state.send_modify(|state| {
                state.key = Some(key.clone());
                state.outcome = RequestOutcome::Loading;
            });
        });
        debug!(token, external_id = %key, "detail: fetching operator and expenses");

        let cancelled = CancelGuard::new(|| {
            let _ = self.requests.settle(token, || {
                debug!(token, "detail: fetch cancelled");
                self.state
                    .send_modify(|state| state.outcome = RequestOutcome::Idle);
            });
        });
        let (head, expenses) =
            future::join(self.api.operator(&key), self.api.operator_expenses(&key)).await;
        cancelled.disarm();

        let outcome = match (head, expenses) {
            (Ok(head), Ok(expenses)) => RequestOutcome::Success(DetailBundle {
                head,
                dependents: expenses.items,
            }),
            (Err(err), _) | (_, Err(err)) => {
                warn!(token, external_id = %key, error = %err, "detail: fetch failed");
                RequestOutcome::Failure(normalize(&err))
            }
        };

        let published = self
            .requests
            .settle(token, || self.state.send_modify(|state| state.outcome = outcome));
        if let Err(latest) = published {
            debug!(token, latest, "detail: discarding stale response");
        }
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
