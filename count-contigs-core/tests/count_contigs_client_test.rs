use count_contigs_core::client::{ClientConfig, CountContigsClient};
use count_contigs_core::url::Url;
use count_contigs_core::{JsonRpcError, MethodCall, RpcContext};
use mock_service::{MockService, MockState, ResponseMode};
use serde_json::json;
use std::time::{Duration, Instant};

fn insecure_config(service: &MockService) -> ClientConfig {
    ClientConfig {
        allow_insecure_http: true,
        auth_url: Url::parse(&service.auth_url()).unwrap(),
        ..Default::default()
    }
}

async fn setup() -> (MockService, CountContigsClient) {
    let state = MockState::new().with_contigset("ws1", "contigset_42", 7);
    let service = MockService::start(state).await.unwrap();

    let url = Url::parse(&service.rpc_url()).unwrap();
    let client = CountContigsClient::with_config(url, insecure_config(&service)).unwrap();

    (service, client)
}

#[tokio::test]
async fn test_count_contigs_returns_the_single_record() {
    let (_service, client) = setup().await;

    let results = client.count_contigs("ws1", "contigset_42").await.unwrap();

    assert_eq!(results.contig_count, Some(7));
    assert!(results.additional_properties.is_empty());
}

#[tokio::test]
async fn test_count_contigs_request_envelope() {
    let (service, client) = setup().await;

    client.count_contigs("ws1", "contigset_42").await.unwrap();

    let requests = service.state().rpc_requests();
    assert_eq!(requests.len(), 1);

    let body = &requests[0].body;
    assert_eq!(body["version"], "1.1");
    assert_eq!(body["method"], "wjr_count_contigs.count_contigs");
    assert_eq!(body["params"], json!(["ws1", "contigset_42"]));
    assert!(body["id"].is_string());
    assert!(body.get("context").is_none());

    let headers = &requests[0].headers;
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
    assert!(headers.get("authorization").is_none());
    assert!(headers.get("content-length").is_some());
}

#[tokio::test]
async fn test_count_contigs_forwards_context() {
    let (service, client) = setup().await;

    let context = RpcContext {
        call_stack: vec![MethodCall {
            method: "narrative.run".to_string(),
            time: None,
            job_id: None,
        }],
        run_id: Some("run-1".to_string()),
    };

    client
        .count_contigs_with_context("ws1", "contigset_42", Some(&context))
        .await
        .unwrap();

    let body = &service.state().rpc_requests()[0].body;
    assert_eq!(body["context"]["run_id"], "run-1");
    assert_eq!(body["context"]["call_stack"][0]["method"], "narrative.run");
}

#[tokio::test]
async fn test_count_contigs_accepts_params_member() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Body(
        axum_status(200),
        json!({ "params": [{ "contig_count": 7 }] }).to_string(),
    ));

    let results = client.count_contigs("ws1", "contigset_42").await.unwrap();

    assert_eq!(results.contig_count, Some(7));
}

#[tokio::test]
async fn test_count_contigs_returns_record_unchanged() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Result(json!([{
        "contig_count": 3,
        "report_name": "count_report",
        "extra": { "nested": [1, 2] }
    }])));

    let results = client.count_contigs("ws1", "contigset_42").await.unwrap();

    assert_eq!(results.contig_count, Some(3));
    assert_eq!(results.additional_properties["report_name"], "count_report");
    assert_eq!(
        results.additional_properties["extra"],
        json!({ "nested": [1, 2] })
    );
}

#[tokio::test]
async fn test_count_contigs_rejects_empty_result_list() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Result(json!([])));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::ResultShape { expected: 1, .. }));
}

#[tokio::test]
async fn test_count_contigs_rejects_extra_results() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Result(json!([
        { "contig_count": 1 },
        { "contig_count": 2 }
    ])));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::ResultShape { expected: 1, .. }));
}

#[tokio::test]
async fn test_count_contigs_rejects_missing_result() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Body(
        axum_status(200),
        json!({ "version": "1.1" }).to_string(),
    ));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::MissingResult));
}

#[tokio::test]
async fn test_count_contigs_rejects_undecodable_record() {
    let (service, client) = setup().await;
    service
        .state()
        .set_mode(ResponseMode::Result(json!([{ "contig_count": "seven" }])));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::InvalidResult(_)));
}

#[tokio::test]
async fn test_count_contigs_surfaces_server_errors() {
    let (_service, client) = setup().await;

    let err = client.count_contigs("ws1", "missing").await.unwrap_err();

    match err {
        JsonRpcError::Server(error) => {
            assert_eq!(error.name, "ServerError");
            assert_eq!(error.code, -32500);
            assert!(error.message.contains("missing"));
            assert!(error.data.is_some());
        }
        other => panic!("Expected a server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_count_contigs_unknown_server_failure() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Body(
        axum_status(500),
        "Internal Server Error".to_string(),
    ));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    match err {
        JsonRpcError::Server(error) => {
            assert_eq!(error.name, "Unknown");
            assert_eq!(error.data, Some(json!("Internal Server Error")));
        }
        other => panic!("Expected a server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_count_contigs_unexpected_http_status() {
    let (service, client) = setup().await;
    service
        .state()
        .set_mode(ResponseMode::Body(axum_status(503), "maintenance".to_string()));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    match err {
        JsonRpcError::HttpStatus { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected an HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_count_contigs_rejects_mismatched_id() {
    let (service, client) = setup().await;
    service.state().set_mode(ResponseMode::Body(
        axum_status(200),
        json!({ "id": "not-the-one", "result": [{ "contig_count": 7 }] }).to_string(),
    ));

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::IdMismatch { .. }));
}

#[tokio::test]
async fn test_insecure_http_is_rejected_by_default() {
    let (service, _) = setup().await;
    let url = Url::parse(&service.rpc_url()).unwrap();

    let client = CountContigsClient::new(url).unwrap();
    assert!(!client.config().allow_insecure_http);

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::InsecureHttp(_)));
    assert!(service.state().rpc_requests().is_empty());
}

#[tokio::test]
async fn test_set_config_toggles_insecure_http() {
    let (service, mut client) = setup().await;

    let mut config = client.config().clone();
    config.allow_insecure_http = false;
    client.set_config(config.clone()).unwrap();

    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();
    assert!(matches!(err, JsonRpcError::InsecureHttp(_)));

    config.allow_insecure_http = true;
    client.set_config(config).unwrap();

    let results = client.count_contigs("ws1", "contigset_42").await.unwrap();
    assert_eq!(results.contig_count, Some(7));
    assert_eq!(service.state().rpc_requests().len(), 1);
}

#[tokio::test]
async fn test_read_timeout_surfaces_as_io_error() {
    let (service, mut client) = setup().await;
    service
        .state()
        .set_mode(ResponseMode::Delay(Duration::from_secs(5)));

    let mut config = client.config().clone();
    config.read_timeout = Some(Duration::from_millis(200));
    client.set_config(config).unwrap();

    let started = Instant::now();
    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::Io(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_streaming_mode_sends_chunked_body() {
    let (service, mut client) = setup().await;

    let mut config = client.config().clone();
    config.streaming_mode = true;
    client.set_config(config).unwrap();

    let results = client.count_contigs("ws1", "contigset_42").await.unwrap();
    assert_eq!(results.contig_count, Some(7));

    let requests = service.state().rpc_requests();
    let headers = &requests[0].headers;
    assert!(headers.get("content-length").is_none());
    assert_eq!(headers.get("transfer-encoding").unwrap(), "chunked");
    assert_eq!(requests[0].body["params"], json!(["ws1", "contigset_42"]));
}

#[tokio::test]
async fn test_connection_refused_is_io_error() {
    let (service, _) = setup().await;
    let url = Url::parse(&service.rpc_url()).unwrap();
    let config = insecure_config(&service);
    drop(service);

    // Give the aborted server task a moment to release the port.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = CountContigsClient::with_config(url, config).unwrap();
    let err = client.count_contigs("ws1", "contigset_42").await.unwrap_err();

    assert!(matches!(err, JsonRpcError::Io(_)));
}

fn axum_status(code: u16) -> mock_service::StatusCode {
    mock_service::StatusCode::from_u16(code).unwrap()
}
