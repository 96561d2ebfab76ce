use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ExternalId, Quarter, RegistryId};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size the directory service accepts.
pub const MAX_LIMIT: u32 = 100;

/// Query string of `GET /api/operators`. An empty search is never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl ListQuery {
    pub fn new(page: u32, limit: u32, search_text: &str) -> Self {
        Self {
            page,
            limit,
            q: (!search_text.is_empty()).then(|| search_text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorSummary {
    #[serde(alias = "registro_ans")]
    pub registry_id: RegistryId,
    #[serde(default, alias = "cnpj")]
    pub external_id: Option<ExternalId>,
    #[serde(default, alias = "razao_social")]
    pub name: Option<String>,
    #[serde(default, alias = "modalidade")]
    pub category: Option<String>,
    #[serde(default, alias = "uf")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorDetail {
    #[serde(flatten)]
    pub summary: OperatorSummary,
    #[serde(default, alias = "nome_fantasia")]
    pub trade_name: Option<String>,
    #[serde(default, alias = "cidade")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorPage {
    pub data: Vec<OperatorSummary>,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(alias = "ano")]
    pub year: i32,
    #[serde(alias = "trimestre")]
    pub quarter: Quarter,
    #[serde(alias = "valor")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensesResponse {
    #[serde(default, alias = "cnpj", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<ExternalId>,
    pub items: Vec<ExpenseItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopOperator {
    #[serde(default, alias = "cnpj")]
    pub external_id: Option<ExternalId>,
    #[serde(default, alias = "razao_social")]
    pub name: Option<String>,
    #[serde(alias = "total_despesas")]
    pub total_expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(alias = "total_despesas")]
    pub total_expenses: f64,
    #[serde(alias = "media_despesas")]
    pub average_expenses: f64,
    #[serde(alias = "top5_operadoras")]
    pub top5_operators: Vec<TopOperator>,
    #[serde(alias = "despesas_por_uf")]
    pub expenses_by_region: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_omits_empty_search() {
        let query = ListQuery::new(2, 25, "");
        let encoded = serde_json::to_value(&query).expect("encode");
        assert_eq!(encoded, serde_json::json!({ "page": 2, "limit": 25 }));

        let query = ListQuery::new(1, 10, "acme");
        assert_eq!(query.q.as_deref(), Some("acme"));
    }

    #[test]
    fn operator_detail_accepts_upstream_field_names() {
        let raw = serde_json::json!({
            "registro_ans": 123456,
            "cnpj": "12345678000199",
            "razao_social": "ACME SAUDE LTDA",
            "nome_fantasia": "ACME",
            "modalidade": "Medicina de Grupo",
            "uf": "SP",
            "cidade": "Campinas",
            "logradouro": "Rua A"
        });
        let detail: OperatorDetail = serde_json::from_value(raw).expect("decode");
        assert_eq!(detail.summary.registry_id, RegistryId(123456));
        assert_eq!(detail.summary.region.as_deref(), Some("SP"));
        assert_eq!(detail.trade_name.as_deref(), Some("ACME"));
        assert_eq!(detail.city.as_deref(), Some("Campinas"));
    }

    #[test]
    fn operator_summary_tolerates_missing_optional_fields() {
        let summary: OperatorSummary =
            serde_json::from_str(r#"{ "registry_id": 7, "name": null }"#).expect("decode");
        assert_eq!(summary.registry_id, RegistryId(7));
        assert!(summary.external_id.is_none());
        assert!(summary.name.is_none());
    }

    #[test]
    fn statistics_decode_keeps_region_map() {
        let raw = serde_json::json!({
            "total_expenses": 1500.5,
            "average_expenses": 750.25,
            "top5_operators": [{ "external_id": null, "name": "ACME", "total_expenses": 1000.0 }],
            "expenses_by_region": { "SP": 1000.0, "RJ": 500.5 }
        });
        let stats: Statistics = serde_json::from_value(raw).expect("decode");
        assert_eq!(stats.top5_operators.len(), 1);
        assert_eq!(stats.expenses_by_region.get("RJ"), Some(&500.5));
    }
}
