//! In-memory directory used by the controller tests.

use std::{collections::VecDeque, time::Duration};

use async_trait::async_trait;
use shared::{
    domain::{ExternalId, Quarter, RegistryId},
    protocol::{
        ExpenseItem, ExpensesResponse, ListQuery, OperatorDetail, OperatorPage, OperatorSummary,
        Statistics,
    },
};
use tokio::sync::Mutex;

use crate::{error::TransportError, DirectoryApi};

/// Canned reply plus how long the fake "network" takes to deliver it.
pub struct Scripted<T> {
    pub delay: Duration,
    pub reply: Result<T, TransportError>,
}

impl<T> Scripted<T> {
    pub fn ok(reply: T) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Ok(reply),
        }
    }

    pub fn err(err: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            reply: Err(err),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Replies are consumed in order; once a queue is empty the fallback is used.
#[derive(Default)]
pub struct FakeDirectory {
    pub list_replies: Mutex<VecDeque<Scripted<OperatorPage>>>,
    pub list_calls: Mutex<Vec<ListQuery>>,
    pub detail_replies: Mutex<VecDeque<Scripted<OperatorDetail>>>,
    pub expense_replies: Mutex<VecDeque<Scripted<ExpensesResponse>>>,
    pub detail_calls: Mutex<Vec<ExternalId>>,
    pub stats_replies: Mutex<VecDeque<Scripted<Statistics>>>,
    pub stats_calls: Mutex<u32>,
}

impl FakeDirectory {
    pub async fn push_list(&self, reply: Scripted<OperatorPage>) {
        self.list_replies.lock().await.push_back(reply);
    }

    pub async fn push_detail(
        &self,
        head: Scripted<OperatorDetail>,
        expenses: Scripted<ExpensesResponse>,
    ) {
        self.detail_replies.lock().await.push_back(head);
        self.expense_replies.lock().await.push_back(expenses);
    }

    pub async fn push_stats(&self, reply: Scripted<Statistics>) {
        self.stats_replies.lock().await.push_back(reply);
    }

    pub async fn list_calls(&self) -> Vec<ListQuery> {
        self.list_calls.lock().await.clone()
    }
}

async fn deliver<T>(
    queue: &Mutex<VecDeque<Scripted<T>>>,
    fallback: impl FnOnce() -> T,
) -> Result<T, TransportError> {
    let scripted = queue.lock().await.pop_front();
    match scripted {
        Some(scripted) => {
            if !scripted.delay.is_zero() {
                tokio::time::sleep(scripted.delay).await;
            }
            scripted.reply
        }
        None => Ok(fallback()),
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn statistics(&self) -> Result<Statistics, TransportError> {
        *self.stats_calls.lock().await += 1;
        deliver(&self.stats_replies, sample_statistics).await
    }

    async fn list_operators(&self, query: &ListQuery) -> Result<OperatorPage, TransportError> {
        self.list_calls.lock().await.push(query.clone());
        deliver(&self.list_replies, || page_of(0, 0)).await
    }

    async fn operator(&self, external_id: &ExternalId) -> Result<OperatorDetail, TransportError> {
        self.detail_calls.lock().await.push(external_id.clone());
        let key = external_id.clone();
        deliver(&self.detail_replies, move || detail_for(key.as_str())).await
    }

    async fn operator_expenses(
        &self,
        _external_id: &ExternalId,
    ) -> Result<ExpensesResponse, TransportError> {
        deliver(&self.expense_replies, || expenses(0)).await
    }
}

pub fn operator(n: i64) -> OperatorSummary {
    OperatorSummary {
        registry_id: RegistryId(n),
        external_id: Some(ExternalId::new(format!("{n:014}"))),
        name: Some(format!("OPERADORA {n}")),
        category: Some("Medicina de Grupo".to_string()),
        region: Some("SP".to_string()),
    }
}

pub fn page_of(count: i64, total: u64) -> OperatorPage {
    OperatorPage {
        data: (1..=count).map(operator).collect(),
        total,
        page: None,
        limit: None,
    }
}

pub fn detail_for(external_id: &str) -> OperatorDetail {
    OperatorDetail {
        summary: OperatorSummary {
            external_id: Some(ExternalId::from(external_id)),
            ..operator(1)
        },
        trade_name: Some("ACME".to_string()),
        city: Some("Campinas".to_string()),
    }
}

pub fn expenses(count: usize) -> ExpensesResponse {
    let quarters = [1u8, 2, 3, 4];
    ExpensesResponse {
        external_id: None,
        items: quarters
            .iter()
            .cycle()
            .take(count)
            .map(|q| ExpenseItem {
                year: 2024,
                quarter: Quarter::try_from(*q).expect("valid quarter"),
                amount: f64::from(*q) * 100.0,
            })
            .collect(),
    }
}

pub fn sample_statistics() -> Statistics {
    Statistics {
        total_expenses: 1000.0,
        average_expenses: 500.0,
        top5_operators: Vec::new(),
        expenses_by_region: [("SP".to_string(), 1000.0)].into_iter().collect(),
    }
}

/// Lets spawned tasks run without moving the paused clock past any timer.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
