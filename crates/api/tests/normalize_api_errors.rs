//! Black-box checks of error normalization as a screen would use it.

use serde_json::json;

use stockloan_api::{ApiError, ApiResult, TransportError, UNREACHABLE_MESSAGE, parse_api_error};

/// Stand-in for a data-fetching hook: the client fails, the hook normalizes.
fn load_loan(outcome: Result<serde_json::Value, TransportError>) -> ApiResult<serde_json::Value> {
    outcome.map_err(|e| parse_api_error(&e))
}

#[test]
fn hook_surfaces_backend_reason() {
    stockloan_observability::init_for_tests();

    let err = load_loan(Err(TransportError::with_response(
        "Request failed with status code 422",
        422,
        json!({"detail": [{"loc": ["body", "shares"], "msg": "shares must be at least 1"}]}),
    )))
    .unwrap_err();

    assert_eq!(err.message, "shares must be at least 1");
    assert_eq!(err.status, Some(422));
    assert_eq!(err.to_string(), "shares must be at least 1");
}

#[test]
fn hook_reports_offline() {
    stockloan_observability::init_for_tests();

    let err: ApiError = load_loan(Err(TransportError::network("Network Error"))).unwrap_err();
    assert_eq!(err.message, UNREACHABLE_MESSAGE);
    assert!(err.is_network());
}

#[test]
fn success_passes_through() {
    let body = json!({"id": "loan-1", "status": "active"});
    assert_eq!(load_loan(Ok(body.clone())).unwrap(), body);
}

#[test]
fn error_is_a_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}

    let err = parse_api_error(&TransportError::with_response("x", 500, json!({"message": "boom"})));
    takes_error(&err);
}
