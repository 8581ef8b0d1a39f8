use super::*;

#[test]
fn endpoint_url_joins_under_api_root() {
    assert_eq!(endpoint_url("http://h/api/", "token/"), "http://h/api/token/");
    assert_eq!(endpoint_url("http://h/api/", "/personas/3/"), "http://h/api/personas/3/");
    assert_eq!(endpoint_url("http://h/api", "content/"), "http://h/api/content/");
}

#[test]
fn request_constructors_set_method_and_body() {
    let req = ApiRequest::post("token/", serde_json::json!({ "username": "ana" }));
    assert_eq!(req.method, Method::POST);
    assert_eq!(req.path, "token/");
    assert_eq!(req.body, Some(serde_json::json!({ "username": "ana" })));
    assert!(!req.retried);

    let req = ApiRequest::delete("content/9/");
    assert_eq!(req.method, Method::DELETE);
    assert!(req.body.is_none());
}

#[test]
fn bearer_roundtrips_through_headers() {
    let mut req = ApiRequest::get("personas/");
    assert_eq!(req.bearer_token(), None);

    req.set_bearer("abc.def").unwrap();
    assert_eq!(req.bearer_token(), Some("abc.def"));
    assert_eq!(req.headers.get(AUTHORIZATION).unwrap(), "Bearer abc.def");

    req.set_bearer("next").unwrap();
    assert_eq!(req.headers.get_all(AUTHORIZATION).iter().count(), 1);
    assert_eq!(req.bearer_token(), Some("next"));
}

#[test]
fn bearer_rejects_control_characters() {
    let mut req = ApiRequest::get("personas/");
    let err = req.set_bearer("bad\ntoken").unwrap_err();
    assert!(matches!(err, ApiError::InvalidHeader(_)));
}

#[test]
fn error_for_status_attaches_server_payload() {
    let resp = ApiResponse::new(StatusCode::BAD_REQUEST, r#"{"error":"Missing fields"}"#);
    let err = resp.error_for_status().unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body["error"], "Missing fields");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn body_value_handles_text_and_empty() {
    assert_eq!(ApiResponse::new(StatusCode::NO_CONTENT, "").body_value(), Value::Null);
    assert_eq!(
        ApiResponse::new(StatusCode::BAD_GATEWAY, "upstream down").body_value(),
        Value::String("upstream down".into())
    );
}

#[test]
fn json_decode_failure_is_decode_error() {
    let resp = ApiResponse::new(StatusCode::OK, "not json");
    let err = resp.json::<Value>().unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}
