use super::*;

#[test]
fn root_is_the_operator_list() {
    assert_eq!(resolve("/"), Some(Route::Operators));
    assert_eq!(resolve(""), Some(Route::Operators));
    assert_eq!(resolve("/?page=2"), Some(Route::Operators));
    assert_eq!(Route::Operators.path(), "/");
    assert_eq!(Route::Operators.name().as_str(), "operators");
}

#[test]
fn detail_path_round_trips_identifiers_with_punctuation() {
    let route = Route::Operator {
        external_id: ExternalId::from("12.345.678/0001-99"),
    };
    let path = route.path();
    assert_eq!(path, "/operators/12.345.678%2F0001-99");
    assert_eq!(resolve(&path), Some(route.clone()));
    assert_eq!(route.name(), RouteName::Operator);
}

#[test]
fn detail_path_accepts_trailing_slash_and_query() {
    assert_eq!(
        resolve("/operators/12345678000199/?tab=expenses"),
        Some(Route::Operator {
            external_id: ExternalId::from("12345678000199")
        })
    );
}

#[test]
fn plus_and_spaces_are_kept_apart() {
    let route = Route::Operator {
        external_id: ExternalId::from("a b+c"),
    };
    assert_eq!(route.path(), "/operators/a%20b%2Bc");
    assert_eq!(resolve(&route.path()), Some(route));
    assert_eq!(
        resolve("/operators/a+b"),
        Some(Route::Operator {
            external_id: ExternalId::from("a+b")
        })
    );
}

#[test]
fn unknown_paths_do_not_resolve() {
    assert_eq!(resolve("/operators"), None);
    assert_eq!(resolve("/operators/1/expenses"), None);
    assert_eq!(resolve("/statistics"), None);
}

#[test]
fn table_lists_both_screens() {
    let names: Vec<&str> = ROUTES.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["operators", "operator"]);
}
