use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure classes a directory request can end in. None of them is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NetworkUnavailable,
    Timeout,
    Validation,
    NotFound,
    Server,
    Generic,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            422 => Self::Validation,
            404 => Self::NotFound,
            s if s >= 500 => Self::Server,
            _ => Self::Generic,
        }
    }
}

/// JSON body of an error response. Only `detail` and `message` are read; the
/// body is kept as raw JSON because its shape is not under our control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorBody(pub Value);

impl ErrorBody {
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok().map(Self)
    }

    /// Server-supplied explanation: `detail` first, then `message`. Empty
    /// strings count as absent.
    pub fn detail_text(&self) -> Option<String> {
        let object = self.0.as_object()?;
        object
            .get("detail")
            .and_then(render_detail)
            .or_else(|| object.get("message").and_then(render_detail))
    }
}

fn render_detail(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        // Validation failures arrive as `[{"loc": [...], "msg": "...", ...}]`.
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .filter(|msg| !msg.is_empty())
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_wins_over_message() {
        let body = ErrorBody(json!({ "detail": "cnpj inválido", "message": "other" }));
        assert_eq!(body.detail_text().as_deref(), Some("cnpj inválido"));
    }

    #[test]
    fn empty_detail_falls_back_to_message() {
        let body = ErrorBody(json!({ "detail": "", "message": "limite excedido" }));
        assert_eq!(body.detail_text().as_deref(), Some("limite excedido"));
    }

    #[test]
    fn validation_entries_are_joined() {
        let body = ErrorBody(json!({
            "detail": [
                { "loc": ["query", "page"], "msg": "must be >= 1" },
                { "loc": ["query", "limit"], "msg": "must be <= 100" }
            ]
        }));
        assert_eq!(
            body.detail_text().as_deref(),
            Some("must be >= 1; must be <= 100")
        );
    }

    #[test]
    fn unexpected_shapes_yield_nothing() {
        assert_eq!(ErrorBody(json!("plain string")).detail_text(), None);
        assert_eq!(ErrorBody(json!({ "detail": 42 })).detail_text(), None);
        assert_eq!(ErrorBody(json!({ "detail": [1, 2] })).detail_text(), None);
        assert!(ErrorBody::from_slice(b"<html>bad gateway</html>").is_none());
    }

    #[test]
    fn status_classification() {
        assert_eq!(FailureKind::from_status(422), FailureKind::Validation);
        assert_eq!(FailureKind::from_status(404), FailureKind::NotFound);
        assert_eq!(FailureKind::from_status(503), FailureKind::Server);
        assert_eq!(FailureKind::from_status(401), FailureKind::Generic);
    }
}
