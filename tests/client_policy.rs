//! Integration tests for the Alma client's validation, cache-key, and
//! live -> cache -> failure fallback behaviour.

mod common;

use serde_json::json;

use common::{ScriptedTransport, configured};
use leganto::{AdminConfig, AlmaClient, ApiMethod, CallParams, LegantoError, ListCache, MemoryCache};

#[tokio::test]
async fn unconfigured_client_fails_before_validation_and_network() {
    let client = AlmaClient::new(
        AdminConfig::default(),
        ScriptedTransport::new(),
        MemoryCache::new(),
    );

    let err = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap_err();
    match err {
        LegantoError::NotConfigured { settings } => {
            assert_eq!(settings, vec!["apiurl", "apikey"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn missing_course_id_fails_with_zero_http_calls() {
    let transport = ScriptedTransport::new();
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    let err = client
        .call(ApiMethod::GetCourse, CallParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LegantoError::MissingParameter { .. }));
    assert_eq!(client.transport().request_count(), 0);
}

#[tokio::test]
async fn successful_fetch_is_returned_and_cached() {
    let transport = ScriptedTransport::new();
    transport.push_json(&json!({"id": "123", "name": "Biology"}));
    let cache = MemoryCache::new();
    let client = AlmaClient::new(configured(), transport, cache);

    let value = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap();
    assert_eq!(value["name"], "Biology");

    // The live response is now the cache fallback: a 500 on the next call
    // must serve the same value.
    let err_status_value = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap();
    assert_eq!(err_status_value["name"], "Biology");
}

#[tokio::test]
async fn error_status_without_cache_is_remote_unavailable() {
    let transport = ScriptedTransport::new();
    transport.push_status(500, "Internal Server Error");
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    let err = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap_err();
    match err {
        LegantoError::RemoteUnavailable { endpoint, status } => {
            assert_eq!(endpoint, "/almaws/v1/courses/123");
            assert_eq!(status, Some(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_status_with_cache_serves_the_cached_value() {
    let transport = ScriptedTransport::new();
    transport.push_status(500, "boom");
    let cache = MemoryCache::new();
    cache.set("123", &json!({"id": "123", "cached": true}));
    let client = AlmaClient::new(configured(), transport, cache);

    let value = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap();
    assert_eq!(value["cached"], true);
}

#[tokio::test]
async fn transport_failure_falls_back_to_cache_then_fails() {
    let transport = ScriptedTransport::new();
    transport.push_failure("connection refused");
    transport.push_failure("connection refused");
    let cache = MemoryCache::new();
    cache.set("l-1", &json!({"id": "l-1"}));
    let client = AlmaClient::new(configured(), transport, cache);

    // List fetch: cache has the list id, so the fallback serves it.
    let value = client
        .call(ApiMethod::GetList, CallParams::list("c-1", "l-1"))
        .await
        .unwrap();
    assert_eq!(value["id"], "l-1");

    // Citation fetch: keyed by citation id, no entry, hard failure with no
    // received status.
    let err = client
        .call(ApiMethod::GetCitation, CallParams::citation("c-1", "l-1", "x-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LegantoError::RemoteUnavailable { status: None, .. }
    ));
}

#[tokio::test]
async fn undecodable_body_counts_as_a_failed_fetch() {
    let transport = ScriptedTransport::new();
    transport.push_status(200, "<html>not json</html>");
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    let err = client
        .call(ApiMethod::GetCourse, CallParams::course("123"))
        .await
        .unwrap_err();
    assert!(matches!(err, LegantoError::RemoteUnavailable { .. }));
}

#[tokio::test]
async fn search_results_are_never_cached() {
    let transport = ScriptedTransport::new();
    transport.push_json(&json!({"total_record_count": 1, "course": [{"id": "42"}]}));
    transport.push_status(500, "boom");
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    let params = CallParams::search("code~BIOL101");
    client.call(ApiMethod::SearchCourses, params.clone()).await.unwrap();

    // The second, failing search finds nothing to fall back on even though
    // an identical search just succeeded.
    let err = client
        .call(ApiMethod::SearchCourses, params)
        .await
        .unwrap_err();
    assert!(matches!(err, LegantoError::RemoteUnavailable { .. }));
}

#[tokio::test]
async fn prefer_cache_hit_performs_no_network_call() {
    let transport = ScriptedTransport::new();
    let cache = MemoryCache::new();
    cache.set("l-1", &json!({"id": "l-1", "name": "Cached list"}));
    let client = AlmaClient::new(configured(), transport, cache);

    let value = client
        .call(
            ApiMethod::GetList,
            CallParams::list("c-1", "l-1").prefer_cached(),
        )
        .await
        .unwrap();
    assert_eq!(value["name"], "Cached list");
    assert_eq!(client.transport().request_count(), 0);
}

#[tokio::test]
async fn prefer_cache_miss_falls_through_to_a_live_call() {
    let transport = ScriptedTransport::new();
    transport.push_json(&json!({"id": "l-1", "name": "Fresh list"}));
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    let value = client
        .call(
            ApiMethod::GetList,
            CallParams::list("c-1", "l-1").prefer_cached(),
        )
        .await
        .unwrap();
    assert_eq!(value["name"], "Fresh list");
}

#[tokio::test]
async fn requests_carry_auth_headers_path_and_query() {
    let transport = ScriptedTransport::new();
    transport.push_json(&json!({"id": "123"}));
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    client
        .call(
            ApiMethod::GetCourse,
            CallParams::course("123").with_extra("view", "full"),
        )
        .await
        .unwrap();

    // Reach back into the transport the client took ownership of.
    let requests = client_transport_requests(&client);
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.url,
        "https://api-test.example.com/almaws/v1/courses/123"
    );
    assert!(request.headers.contains(&(
        "Accept".to_string(),
        "application/json".to_string()
    )));
    assert!(request.headers.contains(&(
        "Authorization".to_string(),
        "apikey secret-key".to_string()
    )));
    assert!(request
        .query
        .contains(&("view".to_string(), "full".to_string())));
    assert_eq!(request.timeout.as_secs(), 30);
}

#[tokio::test]
async fn search_query_is_passed_as_the_q_parameter() {
    let transport = ScriptedTransport::new();
    transport.push_json(&json!({"total_record_count": 0}));
    let client = AlmaClient::new(configured(), transport, MemoryCache::new());

    client
        .call(ApiMethod::SearchCourses, CallParams::search("code~ABC AND year~2026"))
        .await
        .unwrap();

    let requests = client_transport_requests(&client);
    assert!(requests[0]
        .query
        .contains(&("q".to_string(), "code~ABC AND year~2026".to_string())));
}

fn client_transport_requests(
    client: &AlmaClient<ScriptedTransport, MemoryCache>,
) -> Vec<leganto::api::TransportRequest> {
    client.transport().requests()
}
