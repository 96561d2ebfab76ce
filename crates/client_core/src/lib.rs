use async_trait::async_trait;
use shared::{
    domain::ExternalId,
    protocol::{ExpensesResponse, ListQuery, OperatorDetail, OperatorPage, Statistics},
};

pub mod config;
pub mod debounce;
pub mod detail;
pub mod error;
pub mod list;
mod request;
pub mod routes;
pub mod statistics;
pub mod transport;
pub mod types;

pub use config::{load_settings, ClientSettings};
pub use detail::DetailFetcher;
pub use error::{classify, normalize, TransportError};
pub use list::{ListController, ListOptions, OperatorsController};
pub use routes::{resolve, Route, RouteName};
pub use statistics::StatisticsFetcher;
pub use transport::HttpDirectoryClient;
pub use types::{DetailBundle, DetailState, ListResult, ListState, QueryState, RequestOutcome};

/// Request/response capability the controllers fetch through. Implementations
/// are shared read-only between controllers and must tolerate concurrent calls.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn statistics(&self) -> Result<Statistics, TransportError>;
    async fn list_operators(&self, query: &ListQuery) -> Result<OperatorPage, TransportError>;
    async fn operator(&self, external_id: &ExternalId) -> Result<OperatorDetail, TransportError>;
    async fn operator_expenses(
        &self,
        external_id: &ExternalId,
    ) -> Result<ExpensesResponse, TransportError>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
