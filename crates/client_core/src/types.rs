//! Observable state published by the controllers.

use shared::{
    domain::ExternalId,
    protocol::{ListQuery, DEFAULT_LIMIT, DEFAULT_PAGE},
};

/// Tagged state of the latest request a controller issued. `loading` and
/// `error` are read from here rather than kept as separate flags.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome<T = ()> {
    Idle,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> Default for RequestOutcome<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> RequestOutcome<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub limit: u32,
    pub search_text: String,
}

impl QueryState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit,
            search_text: String::new(),
        }
    }

    pub fn to_list_query(&self) -> ListQuery {
        ListQuery::new(self.page, self.limit, &self.search_text)
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// Everything a list screen renders. `result` keeps the last published page
/// while a newer request is loading.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub query: QueryState,
    pub result: ListResult<T>,
    pub outcome: RequestOutcome,
    /// Token of the most recently issued request; 0 before the first fetch.
    pub request_id: u64,
}

impl<T> ListState<T> {
    pub fn new(limit: u32) -> Self {
        Self {
            query: QueryState::new(limit),
            result: ListResult::default(),
            outcome: RequestOutcome::Idle,
            request_id: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.result.items
    }

    pub fn total(&self) -> u64 {
        self.result.total
    }

    pub fn loading(&self) -> bool {
        self.outcome.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailBundle<H, D> {
    pub head: H,
    pub dependents: Vec<D>,
}

/// Head record and dependents only exist together, inside a successful outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState<H, D> {
    pub key: Option<ExternalId>,
    pub outcome: RequestOutcome<DetailBundle<H, D>>,
}

impl<H, D> Default for DetailState<H, D> {
    fn default() -> Self {
        Self {
            key: None,
            outcome: RequestOutcome::Idle,
        }
    }
}

impl<H, D> DetailState<H, D> {
    pub fn head(&self) -> Option<&H> {
        self.outcome.value().map(|bundle| &bundle.head)
    }

    pub fn dependents(&self) -> &[D] {
        self.outcome
            .value()
            .map(|bundle| bundle.dependents.as_slice())
            .unwrap_or_default()
    }

    pub fn loading(&self) -> bool {
        self.outcome.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }
}
