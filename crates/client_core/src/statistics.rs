use std::sync::Arc;

use shared::protocol::Statistics;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    error::normalize,
    request::{CancelGuard, RequestTokens},
    types::RequestOutcome,
    DirectoryApi,
};

pub type StatisticsState = RequestOutcome<Statistics>;

/// Dashboard totals. Fetched once on construction and again on `fetch`.
pub struct StatisticsFetcher {
    api: Arc<dyn DirectoryApi>,
    state: watch::Sender<StatisticsState>,
    requests: RequestTokens,
}

impl StatisticsFetcher {
    /// Must be called from within a tokio runtime.
    pub fn new(api: Arc<dyn DirectoryApi>) -> Arc<Self> {
        let (state, _) = watch::channel(RequestOutcome::Idle);
        let fetcher = Arc::new(Self {
            api,
            state,
            requests: RequestTokens::default(),
        });
        fetcher.refresh();
        fetcher
    }

    pub fn subscribe(&self) -> watch::Receiver<StatisticsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StatisticsState {
        self.state.borrow().clone()
    }

    pub fn refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let fetcher = Arc::clone(self);
        tokio::spawn(async move { fetcher.fetch().await })
    }

    /// Dropping the returned future mid-request settles the outcome back to
    /// `Idle`.
    pub async fn fetch(&self) {
        let (token, ()) = self.requests.issue(|_| {
            self.state.send_replace(RequestOutcome::Loading);
        });
        debug!(token, "statistics: fetching");

        let cancelled = CancelGuard::new(|| {
            let _ = self.requests.settle(token, || {
                debug!(token, "statistics: fetch cancelled");
                self.state.send_replace(RequestOutcome::Idle);
            });
        });
        let result = self.api.statistics().await;
        cancelled.disarm();

        let outcome = match result {
            Ok(stats) => RequestOutcome::Success(stats),
            Err(err) => {
                warn!(token, error = %err, "statistics: fetch failed");
                RequestOutcome::Failure(normalize(&err))
            }
        };
        let published = self.requests.settle(token, || {
            self.state.send_replace(outcome);
        });
        if let Err(latest) = published {
            debug!(token, latest, "statistics: discarding stale response");
        }
    }
}
