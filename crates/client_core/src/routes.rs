//! Screens of the directory UI and the paths that lead to them.

use std::fmt;

use shared::domain::ExternalId;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Operators,
    Operator,
}

impl RouteName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operators => "operators",
            Self::Operator => "operator",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static table: `(name, path pattern)`.
pub const ROUTES: &[(RouteName, &str)] = &[
    (RouteName::Operators, "/"),
    (RouteName::Operator, "/operators/:external_id"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Operators,
    Operator { external_id: ExternalId },
}

impl Route {
    pub fn name(&self) -> RouteName {
        match self {
            Self::Operators => RouteName::Operators,
            Self::Operator { .. } => RouteName::Operator,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Operators => "/".to_string(),
            Self::Operator { external_id } => {
                format!("/operators/{}", encode_segment(external_id.as_str()))
            }
        }
    }
}

/// Matches a browser path (query string and trailing slash ignored).
pub fn resolve(path: &str) -> Option<Route> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => Some(Route::Operators),
        ["operators", raw_id] => {
            let external_id = decode_segment(raw_id);
            (!external_id.is_empty()).then(|| Route::Operator {
                external_id: ExternalId::new(external_id),
            })
        }
        _ => None,
    }
}

fn encode_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

// In a path `+` is a literal plus and `&` is not a separator.
fn decode_segment(raw: &str) -> String {
    let escaped = raw.replace('+', "%2B").replace('&', "%26");
    form_urlencoded::parse(format!("v={escaped}").as_bytes())
        .next()
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
