//! Paginated, searchable list controller.
//!
//! Page and limit changes refetch immediately; search text goes through a
//! debounce window first. Every fetch takes a request token and only the
//! response carrying the latest token is published, so a slow earlier request
//! can never overwrite a newer page.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use futures::future::BoxFuture;
use shared::protocol::{ListQuery, OperatorSummary, DEFAULT_LIMIT, MAX_LIMIT};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    config::ClientSettings,
    debounce::Debouncer,
    error::{normalize, TransportError},
    request::{CancelGuard, RequestTokens},
    types::{ListResult, ListState, RequestOutcome},
    DirectoryApi,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

pub type PageFetcher<T> = Arc<
    dyn Fn(ListQuery) -> BoxFuture<'static, Result<ListResult<T>, TransportError>> + Send + Sync,
>;

pub type OperatorsController = ListController<OperatorSummary>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page_size: u32,
    pub debounce: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIMIT,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl From<&ClientSettings> for ListOptions {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            page_size: settings.page_size,
            debounce: settings.debounce(),
        }
    }
}

pub struct ListController<T> {
    fetch_page: PageFetcher<T>,
    state: watch::Sender<ListState<T>>,
    requests: RequestTokens,
    debouncer: Debouncer,
}

impl ListController<OperatorSummary> {
    /// Controller over `GET /api/operators`. Spawns the initial fetch.
    pub fn operators(api: Arc<dyn DirectoryApi>, options: ListOptions) -> Arc<Self> {
        let fetch_page: PageFetcher<OperatorSummary> = Arc::new(move |query| {
            let api = Arc::clone(&api);
            Box::pin(async move {
                let page = api.list_operators(&query).await?;
                Ok(ListResult {
                    items: page.data,
                    total: page.total,
                })
            })
        });
        Self::new(fetch_page, options)
    }
}

impl<T> ListController<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Must be called from within a tokio runtime: the first page is fetched
    /// right away on a spawned task.
    pub fn new(fetch_page: PageFetcher<T>, options: ListOptions) -> Arc<Self> {
        let (state, _) = watch::channel(ListState::new(clamp_limit(options.page_size)));
        let controller = Arc::new(Self {
            fetch_page,
            state,
            requests: RequestTokens::default(),
            debouncer: Debouncer::new(options.debounce),
        });
        controller.spawn_fetch();
        controller
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    /// Stores the text, goes back to the first page and schedules a fetch once
    /// the debounce window passes without another call.
    pub fn set_search_text(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| {
            state.query.search_text = text;
            state.query.page = 1;
        });

        let controller = Arc::downgrade(self);
        self.debouncer.schedule(fetch_if_alive(controller));
    }

    /// Returns the spawned fetch, or `None` when the page did not change.
    pub fn set_page(self: &Arc<Self>, page: u32) -> Option<JoinHandle<()>> {
        let page = if page == 0 {
            warn!("list: page 0 requested, using 1");
            1
        } else {
            page
        };
        let changed = self.state.send_if_modified(|state| {
            if state.query.page == page {
                return false;
            }
            state.query.page = page;
            true
        });
        changed.then(|| self.spawn_fetch())
    }

    /// Returns the spawned fetch, or `None` when the limit did not change.
    pub fn set_limit(self: &Arc<Self>, limit: u32) -> Option<JoinHandle<()>> {
        let clamped = clamp_limit(limit);
        if clamped != limit {
            warn!(requested = limit, used = clamped, "list: limit out of range");
        }
        let changed = self.state.send_if_modified(|state| {
            if state.query.limit == clamped {
                return false;
            }
            state.query.limit = clamped;
            true
        });
        changed.then(|| self.spawn_fetch())
    }

    /// Manual retry, e.g. after a failure.
    pub fn refresh(self: &Arc<Self>) -> JoinHandle<()> {
        self.spawn_fetch()
    }

    /// Dropping the returned future mid-request settles the outcome back to
    /// `Idle`, keeping the previous page.
    pub async fn fetch(&self) {
        let (token, query) = self.requests.issue(|token| {
            let query = self.state.borrow().query.to_list_query();
            self.state.send_modify(|state| {
                state.outcome = RequestOutcome::Loading;
                state.request_id = token;
            });
            query
        });
        debug!(
            token,
            page = query.page,
            limit = query.limit,
            q = ?query.q,
            "list: fetching page"
        );

        let cancelled = CancelGuard::new(|| {
            let _ = self.requests.settle(token, || {
                debug!(token, "list: fetch cancelled");
                self.state
                    .send_modify(|state| state.outcome = RequestOutcome::Idle);
            });
        });
        let result = (self.fetch_page)(query).await;
        cancelled.disarm();

        let published = self.requests.settle(token, || match result {
            Ok(result) => {
                debug!(
                    token,
                    items = result.items.len(),
                    total = result.total,
                    "list: page loaded"
                );
                self.state.send_modify(|state| {
                    state.result = result;
                    state.outcome = RequestOutcome::Success(());
                });
            }
            Err(err) => {
                let message = normalize(&err);
                warn!(token, error = %err, "list: fetch failed");
                self.state.send_modify(|state| {
                    state.result = ListResult::default();
                    state.outcome = RequestOutcome::Failure(message);
                });
            }
        });
        if let Err(latest) = published {
            debug!(token, latest, "list: discarding stale response");
        }
    }

    fn spawn_fetch(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.fetch().await })
    }
}

async fn fetch_if_alive<T>(controller: Weak<ListController<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    if let Some(controller) = controller.upgrade() {
        controller.fetch().await;
    }
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIMIT)
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
